use crate::colors::{normalize_key, ColorCache};
use crate::errors::GatewayError;
use crate::models::{AppState, ResourceUsage};
use crate::quota::QuotaLedger;
use crate::search::ItemDescriptor;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Reply;

#[cfg(test)]
mod tests;

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    #[serde(default)]
    pub reset: Option<String>,
}

impl UsageQuery {
    /// Only `reset=true` resets; any other value is ignored.
    pub fn wants_reset(&self) -> bool {
        self.reset.as_deref() == Some("true")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub color_hex: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub force_metadata: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ColorMapping {
    hex: String,
    key: String,
    color_name: String,
    cached: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsageStats<'a> {
    period: &'a str,
    resources: &'a BTreeMap<String, ResourceUsage>,
    was_reset: bool,
}

pub async fn usage_stats(
    query: UsageQuery,
    ledger: Arc<QuotaLedger>,
) -> Result<impl warp::Reply, Infallible> {
    let reset = query.wants_reset();
    if reset {
        ledger.reset().await;
    }
    Ok(usage_reply(&ledger, reset).await)
}

pub async fn reset_usage_stats(ledger: Arc<QuotaLedger>) -> Result<impl warp::Reply, Infallible> {
    ledger.reset().await;
    Ok(usage_reply(&ledger, true).await)
}

async fn usage_reply(ledger: &QuotaLedger, was_reset: bool) -> warp::reply::Json {
    let report = ledger.usage().await;
    warp::reply::json(&UsageStats {
        period: &report.period,
        resources: &report.resources,
        was_reset,
    })
}

pub async fn search_query(
    request: SearchRequest,
    state: AppState,
) -> Result<impl warp::Reply, Infallible> {
    let item = ItemDescriptor {
        color_hex: request.color_hex,
        category: request.category,
        image_url: request.image_url,
    };
    let query = state
        .planner
        .build_query(&item, request.force_metadata, state.analyzer.as_ref())
        .await;
    tracing::info!(method = ?query.method, reason = ?query.fallback_reason, "search query built");
    Ok(warp::reply::json(&query))
}

pub async fn color_mapping(
    hex: String,
    colors: Arc<ColorCache>,
) -> Result<impl warp::Reply, Infallible> {
    let color_name = colors.classify(&hex).await;
    let cached = colors.cached(&hex).await.is_some();
    Ok(warp::reply::json(&ColorMapping {
        key: normalize_key(&hex),
        hex,
        color_name,
        cached,
    }))
}

pub async fn handle_rejection(err: warp::Rejection) -> Result<warp::reply::Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not Found"));
    }

    if let Some(GatewayError::RateLimitExceeded { retry_after_secs }) = err.find::<GatewayError>() {
        let body = warp::reply::json(&serde_json::json!({
            "error": "Too many requests",
            "retryAfterSeconds": retry_after_secs,
        }));
        let reply = warp::reply::with_status(body, StatusCode::TOO_MANY_REQUESTS);
        let reply = warp::reply::with_header(reply, "retry-after", retry_after_secs.to_string());
        return Ok(reply.into_response());
    }

    if err.find::<warp::reject::InvalidQuery>().is_some() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid query string"));
    }

    if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        tracing::debug!(error = %e, "rejected request body");
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid request body"));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }

    tracing::error!(?err, "unhandled rejection");
    Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))
}

fn error_reply(code: StatusCode, message: &str) -> warp::reply::Response {
    let body = warp::reply::json(&serde_json::json!({ "error": message }));
    warp::reply::with_status(body, code).into_response()
}
