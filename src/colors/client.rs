use crate::errors::ColorLookupError;
use async_trait::async_trait;
use serde::Deserialize;

/// External service that names a colour given its normalized hex key.
#[async_trait]
pub trait ColorNameSource: Send + Sync {
    async fn color_name(&self, key: &str) -> Result<String, ColorLookupError>;
}

#[derive(Debug, Deserialize)]
struct ColorApiResponse {
    name: Option<ColorApiName>,
}

#[derive(Debug, Deserialize)]
struct ColorApiName {
    value: Option<String>,
}

/// Client for thecolorapi.com style `GET /id?hex=rrggbb` endpoints.
#[derive(Debug, Clone)]
pub struct TheColorApi {
    client: reqwest::Client,
    base_url: String,
}

impl TheColorApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl ColorNameSource for TheColorApi {
    async fn color_name(&self, key: &str) -> Result<String, ColorLookupError> {
        let response = self
            .client
            .get(format!("{}/id", self.base_url))
            .query(&[("hex", key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColorLookupError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: ColorApiResponse = serde_json::from_slice(&body)?;
        let name = parsed
            .name
            .and_then(|name| name.value)
            .unwrap_or_else(|| "Unknown".to_string());
        Ok(name)
    }
}
