use closet_quota_gateway::{
    admission::{spawn_reaper, AdmissionGate},
    colors::{ColorCache, TheColorApi},
    config::Config,
    models::AppState,
    quota::{QuotaLedger, PRODUCT_SEARCH, VISUAL_RECOGNITION},
    routes::routes,
    search::{RemoteAnalyzer, UnavailableAnalyzer, VisualAnalyzer},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let gate = AdmissionGate::new(config.gate_max_requests, config.gate_window);
    let ledger = QuotaLedger::new(config.quota_default_limit)
        .with_limit(VISUAL_RECOGNITION, config.quota_visual_limit)
        .with_limit(PRODUCT_SEARCH, config.quota_search_limit);
    let colors = ColorCache::new(
        Arc::new(TheColorApi::new(config.color_api_base.clone())),
        config.color_lookup_timeout,
    );
    let analyzer: Arc<dyn VisualAnalyzer> = match &config.visual_analyzer_url {
        Some(url) => Arc::new(RemoteAnalyzer::new(url.clone(), config.visual_analyzer_timeout)),
        None => {
            tracing::warn!("VISUAL_ANALYZER_URL not set, search queries use item metadata only");
            Arc::new(UnavailableAnalyzer)
        }
    };
    let state = AppState::new(gate, ledger, colors, analyzer);

    // Counters are process-local; each instance enforces its own budget.
    let _reaper = spawn_reaper(state.gate.clone(), config.gate_sweep_interval);

    tracing::info!(
        addr = %config.bind_addr,
        max_requests = config.gate_max_requests,
        window_secs = config.gate_window.as_secs(),
        "quota gateway listening"
    );
    warp::serve(routes(state)).run(config.bind_addr).await;
}
