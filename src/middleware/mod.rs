use crate::admission::AdmissionGate;
use crate::errors::GatewayError;
use crate::models::Admission;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Instant;
use warp::{Filter, Rejection};


/// First `X-Forwarded-For` hop, else the peer address, else `unknown`.
pub fn client_id(forwarded_for: Option<&str>, remote: Option<SocketAddr>) -> String {
    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .or_else(|| remote.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rejects with `GatewayError::RateLimitExceeded` once the client is over its window budget.
pub fn with_admission(
    gate: Arc<AdmissionGate>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("x-forwarded-for")
        .and(warp::addr::remote())
        .and_then(move |forwarded_for: Option<String>, remote: Option<SocketAddr>| {
            let gate = gate.clone();
            async move {
                let client = client_id(forwarded_for.as_deref(), remote);
                match gate.admit(&client, Instant::now()).await {
                    Admission::Allowed => Ok(()),
                    Admission::Denied { retry_after_secs } => {
                        tracing::warn!(client = %client, retry_after_secs, "too many requests");
                        Err(warp::reject::custom(GatewayError::RateLimitExceeded {
                            retry_after_secs,
                        }))
                    }
                }
            }
        })
        .untuple_one()
}
