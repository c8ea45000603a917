use crate::errors::AnalysisError;
use crate::search::VisualAnalyzer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    image_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    keywords: String,
}

/// Visual analysis service reached over HTTP: `POST {url}` with `{"imageUrl": ..}`,
/// answering `{"keywords": ".."}`.
#[derive(Debug, Clone)]
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RemoteAnalyzer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    async fn call(&self, image_url: &str) -> Result<String, AnalysisError> {
        let response = self
            .client
            .post(&self.url)
            .json(&AnalyzeRequest { image_url })
            .send()
            .await
            .map_err(|e| AnalysisError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError(format!("analyzer returned status {}", status.as_u16())));
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError(e.to_string()))?;
        Ok(body.keywords)
    }
}

#[async_trait]
impl VisualAnalyzer for RemoteAnalyzer {
    async fn extract_keywords(&self, image_url: &str) -> Result<String, AnalysisError> {
        match timeout(self.timeout, self.call(image_url)).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError(format!("no answer within {:?}", self.timeout))),
        }
    }
}

/// Stand-in used when no analysis service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAnalyzer;

#[async_trait]
impl VisualAnalyzer for UnavailableAnalyzer {
    fn is_available(&self) -> bool {
        false
    }

    async fn extract_keywords(&self, _image_url: &str) -> Result<String, AnalysisError> {
        Err(AnalysisError("no visual analyzer configured".to_string()))
    }
}
