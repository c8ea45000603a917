use crate::colors::ColorCache;
use crate::handlers::{
    color_mapping, handle_rejection, reset_usage_stats, search_query, usage_stats, UsageQuery,
};
use crate::middleware::with_admission;
use crate::models::AppState;
use crate::quota::QuotaLedger;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// All routes, each behind the admission gate.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "OK");

    let stats = warp::path!("api" / "shopping" / "usage-stats")
        .and(warp::get())
        .and(warp::query::<UsageQuery>())
        .and(with_ledger(state.ledger.clone()))
        .and_then(usage_stats);

    let reset = warp::path!("api" / "shopping" / "usage-stats" / "reset")
        .and(warp::post())
        .and(with_ledger(state.ledger.clone()))
        .and_then(reset_usage_stats);

    let search = warp::path!("api" / "shopping" / "search-query")
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(search_query);

    let colors = warp::path!("api" / "shopping" / "colors" / String)
        .and(warp::get())
        .and(with_colors(state.colors.clone()))
        .and_then(color_mapping);

    with_admission(state.gate.clone())
        .and(health.or(stats).or(reset).or(search).or(colors))
        .with(warp::trace::request())
        .recover(handle_rejection)
}

fn with_ledger(
    ledger: Arc<QuotaLedger>,
) -> impl Filter<Extract = (Arc<QuotaLedger>,), Error = Infallible> + Clone {
    warp::any().map(move || ledger.clone())
}

fn with_colors(
    colors: Arc<ColorCache>,
) -> impl Filter<Extract = (Arc<ColorCache>,), Error = Infallible> + Clone {
    warp::any().map(move || colors.clone())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
