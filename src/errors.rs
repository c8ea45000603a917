use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },
    #[error("Invalid configuration for {name}: {reason}")]
    InvalidConfig { name: String, reason: String },
}

impl warp::reject::Reject for GatewayError {}

/// Failure of the external colour naming service. Never surfaced past the colour cache.
#[derive(Debug, Error)]
pub enum ColorLookupError {
    #[error("colour API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("colour API returned status {0}")]
    Status(u16),
    #[error("colour API response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("colour API did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

/// Failure of the opaque AI visual analysis call.
#[derive(Debug, Error)]
#[error("visual analysis failed: {0}")]
pub struct AnalysisError(pub String);
