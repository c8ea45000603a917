use crate::errors::GatewayError;
use crate::handlers::{handle_rejection, reset_usage_stats, usage_stats, UsageQuery};
use crate::quota::{QuotaLedger, VISUAL_RECOGNITION};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Reply;

#[tokio::test]
async fn test_handle_not_found_rejection() {
    let rejection = warp::reject::not_found();
    let response = handle_rejection(rejection).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_handle_rate_limit_rejection() {
    let rejection = warp::reject::custom(GatewayError::RateLimitExceeded { retry_after_secs: 42 });
    let response = handle_rejection(rejection).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "42");

    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["retryAfterSeconds"], 42);
    assert_eq!(json["error"], "Too many requests");
}

#[tokio::test]
async fn test_handle_unknown_rejection() {
    let rejection = warp::reject::custom(GatewayError::InvalidConfig {
        name: "GATE_MAX_REQUESTS".to_string(),
        reason: "nope".to_string(),
    });
    let response = handle_rejection(rejection).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_usage_stats_reports_and_resets() {
    let ledger = Arc::new(QuotaLedger::new(10).with_limit(VISUAL_RECOGNITION, 3));
    ledger.try_consume(VISUAL_RECOGNITION, 2).await;

    let reply = usage_stats(UsageQuery::default(), ledger.clone()).await.unwrap();
    let body = hyper::body::to_bytes(reply.into_response().into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["used"], 2);
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["remaining"], 1);
    assert_eq!(json["wasReset"], false);

    let reply = reset_usage_stats(ledger.clone()).await.unwrap();
    let body = hyper::body::to_bytes(reply.into_response().into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["resources"][VISUAL_RECOGNITION]["used"], 0);
    assert_eq!(json["wasReset"], true);
}

#[test]
fn test_only_literal_true_requests_reset() {
    let query = |v: &str| UsageQuery {
        reset: Some(v.to_string()),
    };
    assert!(query("true").wants_reset());
    assert!(!query("yes").wants_reset());
    assert!(!query("TRUE").wants_reset());
    assert!(!UsageQuery::default().wants_reset());
}

#[tokio::test]
async fn test_handle_invalid_query_rejection() {
    let rejection = warp::test::request()
        .path("/?limit=abc")
        .filter(&warp::query::<std::collections::HashMap<String, u32>>())
        .await
        .unwrap_err();
    let response = handle_rejection(rejection).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
