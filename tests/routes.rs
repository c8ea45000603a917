use async_trait::async_trait;
use closet_quota_gateway::{
    admission::AdmissionGate,
    colors::{ColorCache, ColorNameSource},
    models::AppState,
    quota::{QuotaLedger, VISUAL_RECOGNITION},
    routes::routes,
    search::VisualAnalyzer,
    AnalysisError, ColorLookupError,
};
use std::sync::Arc;
use std::time::Duration;

struct Unreachable;

#[async_trait]
impl ColorNameSource for Unreachable {
    async fn color_name(&self, _key: &str) -> Result<String, ColorLookupError> {
        Err(ColorLookupError::Status(503))
    }
}

struct Keywords;

#[async_trait]
impl VisualAnalyzer for Keywords {
    async fn extract_keywords(&self, _image_url: &str) -> Result<String, AnalysisError> {
        Ok("quilted bomber jacket".to_string())
    }
}

fn state(max_requests: u32) -> AppState {
    AppState::new(
        AdmissionGate::new(max_requests, Duration::from_secs(60)),
        QuotaLedger::new(10).with_limit(VISUAL_RECOGNITION, 1),
        ColorCache::new(Arc::new(Unreachable), Duration::from_secs(5)),
        Arc::new(Keywords),
    )
}

#[tokio::test]
async fn test_health_check() {
    let api = routes(state(10));
    let resp = warp::test::request()
        .path("/health")
        .header("x-forwarded-for", "192.0.2.1")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body(), "OK");
}

#[tokio::test]
async fn test_rate_limiting() {
    let api = routes(state(2));

    for _ in 0..2 {
        let resp = warp::test::request()
            .path("/health")
            .header("x-forwarded-for", "192.0.2.2")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), 200);
    }

    let resp = warp::test::request()
        .path("/health")
        .header("x-forwarded-for", "192.0.2.2")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 429);
    assert_eq!(resp.headers()["retry-after"], "60");
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["retryAfterSeconds"], 60);

    // Another client is unaffected.
    let resp = warp::test::request()
        .path("/health")
        .header("x-forwarded-for", "192.0.2.3")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_unknown_route_still_counts_against_gate() {
    let api = routes(state(1));

    let resp = warp::test::request()
        .path("/nope")
        .header("x-forwarded-for", "192.0.2.4")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 404);

    let resp = warp::test::request()
        .path("/health")
        .header("x-forwarded-for", "192.0.2.4")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 429);
}

#[tokio::test]
async fn test_usage_stats_endpoint() {
    let state = state(10);
    state.ledger.try_consume(VISUAL_RECOGNITION, 1).await;
    let api = routes(state.clone());

    let resp = warp::test::request()
        .path("/api/shopping/usage-stats")
        .header("x-forwarded-for", "192.0.2.5")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["used"], 1);
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["limit"], 1);
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["remaining"], 0);
    assert_eq!(json["period"].as_str().unwrap().len(), 7);

    let resp = warp::test::request()
        .path("/api/shopping/usage-stats?reset=true")
        .header("x-forwarded-for", "192.0.2.5")
        .reply(&api)
        .await;
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["wasReset"], true);
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["used"], 0);
}

#[tokio::test]
async fn test_reset_endpoint_requires_post() {
    let state = state(10);
    state.ledger.try_consume(VISUAL_RECOGNITION, 1).await;
    let api = routes(state.clone());

    let resp = warp::test::request()
        .path("/api/shopping/usage-stats/reset")
        .header("x-forwarded-for", "192.0.2.6")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 405);
    assert_eq!(state.ledger.usage().await.resources[VISUAL_RECOGNITION].used, 1);

    let resp = warp::test::request()
        .method("POST")
        .path("/api/shopping/usage-stats/reset")
        .header("x-forwarded-for", "192.0.2.6")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(state.ledger.usage().await.resources[VISUAL_RECOGNITION].used, 0);
}

#[tokio::test]
async fn test_unrecognised_reset_value_is_ignored() {
    let state = state(10);
    state.ledger.try_consume(VISUAL_RECOGNITION, 1).await;
    let api = routes(state.clone());

    let resp = warp::test::request()
        .path("/api/shopping/usage-stats?reset=yes")
        .header("x-forwarded-for", "192.0.2.7")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["wasReset"], false);
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["used"], 1);
}

#[tokio::test]
async fn test_search_query_spends_visual_quota_then_falls_back() {
    let state = state(10);
    let api = routes(state.clone());
    let item = serde_json::json!({
        "colorHex": "#E53935",
        "category": "jacket",
        "imageUrl": "/uploads/jacket.png",
    });

    let resp = warp::test::request()
        .method("POST")
        .path("/api/shopping/search-query")
        .header("x-forwarded-for", "192.0.2.8")
        .json(&item)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["method"], "ai-visual-analysis");
    assert_eq!(json["query"], "red quilted bomber jacket");
    assert_eq!(json["visualQuotaRemaining"], 0);

    let resp = warp::test::request()
        .method("POST")
        .path("/api/shopping/search-query")
        .header("x-forwarded-for", "192.0.2.8")
        .json(&item)
        .reply(&api)
        .await;
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["method"], "metadata");
    assert_eq!(json["fallbackReason"], "quota-exceeded");
    assert_eq!(json["query"], "red mens jacket");
    assert_eq!(state.ledger.usage().await.resources[VISUAL_RECOGNITION].used, 1);
}

#[tokio::test]
async fn test_search_query_rejects_malformed_body() {
    let api = routes(state(10));

    let resp = warp::test::request()
        .method("POST")
        .path("/api/shopping/search-query")
        .header("x-forwarded-for", "192.0.2.9")
        .header("content-type", "application/json")
        .body("{\"colorHex\": ")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_search_query_is_behind_gate() {
    let api = routes(state(1));
    let item = serde_json::json!({ "category": "beanie" });

    let resp = warp::test::request()
        .method("POST")
        .path("/api/shopping/search-query")
        .header("x-forwarded-for", "192.0.2.10")
        .json(&item)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["query"], "unisex beanie knit hat");
    assert_eq!(json["fallbackReason"], "no-image");

    let resp = warp::test::request()
        .method("POST")
        .path("/api/shopping/search-query")
        .header("x-forwarded-for", "192.0.2.10")
        .json(&item)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 429);
}

#[tokio::test]
async fn test_color_mapping_uses_local_fallback_when_service_down() {
    let state = state(2);
    let api = routes(state.clone());

    let resp = warp::test::request()
        .path("/api/shopping/colors/E53935")
        .header("x-forwarded-for", "192.0.2.11")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["hex"], "E53935");
    assert_eq!(json["key"], "e53935");
    assert_eq!(json["colorName"], "red");
    assert_eq!(json["cached"], false);
    assert!(state.colors.is_empty().await);

    let _ = warp::test::request()
        .path("/api/shopping/colors/E53935")
        .header("x-forwarded-for", "192.0.2.11")
        .reply(&api)
        .await;
    let resp = warp::test::request()
        .path("/api/shopping/colors/E53935")
        .header("x-forwarded-for", "192.0.2.11")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), 429);
}
