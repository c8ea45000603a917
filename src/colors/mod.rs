pub mod canonical;
pub mod client;
pub mod fallback;

use crate::errors::ColorLookupError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;

pub use canonical::canonicalize;
pub use client::{ColorNameSource, TheColorApi};
pub use fallback::fallback_color_name;


/// Strips a leading `#` and lower-cases the key.
pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    key.strip_prefix('#').unwrap_or(key).to_lowercase()
}

/// Memoizes colour names obtained from an external naming service.
///
/// Only names confirmed by the service are stored. When the service fails or
/// times out a locally computed name is returned instead and nothing is cached,
/// so a later successful lookup can still fill in the entry. Entries never expire.
pub struct ColorCache {
    source: Arc<dyn ColorNameSource>,
    timeout: Duration,
    entries: RwLock<HashMap<String, String>>,
}

impl ColorCache {
    pub fn new(source: Arc<dyn ColorNameSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn classify(&self, key: &str) -> String {
        let key = normalize_key(key);

        if let Some(label) = self.entries.read().await.get(&key) {
            return label.clone();
        }

        match self.lookup(&key).await {
            Ok(raw) => {
                let label = canonicalize(&raw);
                tracing::debug!(key = %key, raw = %raw, label = %label, "colour named by service");
                self.entries.write().await.insert(key, label.clone());
                label
            }
            Err(e) => {
                let label = fallback_color_name(&key);
                tracing::warn!(key = %key, error = %e, fallback = label, "colour lookup failed, using local fallback");
                label.to_string()
            }
        }
    }

    /// Classifies every key concurrently. Output order matches input order.
    pub async fn classify_batch<S: AsRef<str>>(&self, keys: &[S]) -> Vec<String> {
        futures::future::join_all(keys.iter().map(|key| self.classify(key.as_ref()))).await
    }

    pub async fn cached(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(&normalize_key(key)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn reset(&self) {
        self.entries.write().await.clear();
    }

    async fn lookup(&self, key: &str) -> Result<String, ColorLookupError> {
        match timeout(self.timeout, self.source.color_name(key)).await {
            Ok(result) => result,
            Err(_) => Err(ColorLookupError::Timeout(self.timeout)),
        }
    }
}
