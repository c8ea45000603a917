use crate::colors::ColorCache;
use crate::errors::AnalysisError;
use crate::quota::{QuotaLedger, VISUAL_RECOGNITION};
use async_trait::async_trait;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub mod analyzer;

pub use analyzer::{RemoteAnalyzer, UnavailableAnalyzer};


/// Labels the colour cache can return that do not name a colour.
const NON_COLOR_LABELS: &[&str] = &["unknown", "mixed"];

/// Opaque AI visual recognition call. Returns space separated keywords.
#[async_trait]
pub trait VisualAnalyzer: Send + Sync {
    /// `false` when no analysis service is wired in; the planner then skips the ledger.
    fn is_available(&self) -> bool {
        true
    }

    async fn extract_keywords(&self, image_url: &str) -> Result<String, AnalysisError>;
}

/// The attributes of a closet item needed to build a shopping query.
#[derive(Debug, Clone, Default)]
pub struct ItemDescriptor {
    pub color_hex: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMethod {
    AiVisualAnalysis,
    Metadata,
}

/// Why the metadata path was used instead of visual analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackReason {
    Forced,
    NoImage,
    AnalyzerUnavailable,
    QuotaExceeded,
    AnalysisFailed,
    NoKeywords,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    pub method: SearchMethod,
    pub fallback_reason: Option<FallbackReason>,
    /// Visual recognition calls left this month, when the ledger was consulted.
    pub visual_quota_remaining: Option<u64>,
}

lazy_static! {
    static ref CATEGORY_TERMS: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("tshirt", &["mens", "unisex", "t-shirt", "tee"]);
        m.insert("longsleeve", &["mens", "long", "sleeve", "shirt"]);
        m.insert("sleeveless", &["mens", "tank", "top", "vest"]);
        m.insert("pants", &["mens", "pants", "trousers"]);
        m.insert("jeans", &["mens", "jeans", "denim"]);
        m.insert("shorts", &["mens", "shorts"]);
        m.insert("skirt", &["womens", "skirt"]);
        m.insert("sweater", &["mens", "sweater", "jumper", "pullover"]);
        m.insert("hoodie", &["mens", "hoodie", "sweatshirt"]);
        m.insert("coat", &["mens", "coat", "overcoat"]);
        m.insert("blazer", &["mens", "blazer", "suit", "jacket"]);
        m.insert("jacket", &["mens", "jacket"]);
        m.insert("raincoat", &["mens", "raincoat", "rain", "jacket"]);
        m.insert("shoes", &["mens", "shoes"]);
        m.insert("boots", &["mens", "boots"]);
        m.insert("sandals", &["mens", "sandals"]);
        m.insert("heels", &["womens", "high", "heels"]);
        m.insert("beanie", &["unisex", "beanie", "knit", "hat"]);
        m.insert("hat", &["unisex", "hat", "cap"]);
        m
    };
}

/// Chooses between the quota-limited AI path and the metadata path.
pub struct SearchPlanner {
    ledger: Arc<QuotaLedger>,
    colors: Arc<ColorCache>,
}

impl SearchPlanner {
    pub fn new(ledger: Arc<QuotaLedger>, colors: Arc<ColorCache>) -> Self {
        Self { ledger, colors }
    }

    pub async fn build_query(
        &self,
        item: &ItemDescriptor,
        force_metadata: bool,
        analyzer: &dyn VisualAnalyzer,
    ) -> SearchQuery {
        let color = match &item.color_hex {
            Some(hex) if !hex.trim().is_empty() => {
                let label = self.colors.classify(hex).await.to_lowercase();
                Some(label).filter(|label| !NON_COLOR_LABELS.contains(&label.as_str()))
            }
            _ => None,
        };

        let image_url = match (&item.image_url, force_metadata) {
            (_, true) => return metadata_query(item, color, FallbackReason::Forced, None),
            (Some(url), false) if !url.trim().is_empty() => url,
            _ => return metadata_query(item, color, FallbackReason::NoImage, None),
        };

        if !analyzer.is_available() {
            return metadata_query(item, color, FallbackReason::AnalyzerUnavailable, None);
        }

        let consumption = self.ledger.try_consume(VISUAL_RECOGNITION, 1).await;
        let remaining = Some(consumption.remaining);
        if !consumption.allowed {
            tracing::info!(limit = consumption.limit, "visual quota exceeded, using metadata search");
            return metadata_query(item, color, FallbackReason::QuotaExceeded, remaining);
        }

        match analyzer.extract_keywords(image_url).await {
            Ok(keywords) if !keywords.trim().is_empty() => {
                let query = join_terms(color.iter().map(String::as_str).chain([keywords.trim()]));
                SearchQuery {
                    query,
                    method: SearchMethod::AiVisualAnalysis,
                    fallback_reason: None,
                    visual_quota_remaining: remaining,
                }
            }
            Ok(_) => metadata_query(item, color, FallbackReason::NoKeywords, remaining),
            Err(e) => {
                tracing::warn!(error = %e, "visual analysis failed, using metadata search");
                metadata_query(item, color, FallbackReason::AnalysisFailed, remaining)
            }
        }
    }
}

/// Search terms for a closet category. Unknown categories are searched as menswear.
pub fn category_terms(category: &str) -> Vec<String> {
    let category = category.trim().to_lowercase();
    match CATEGORY_TERMS.get(category.as_str()) {
        Some(terms) => terms.iter().map(|t| t.to_string()).collect(),
        None => vec!["mens".to_string(), category],
    }
}

fn metadata_query(
    item: &ItemDescriptor,
    color: Option<String>,
    reason: FallbackReason,
    visual_quota_remaining: Option<u64>,
) -> SearchQuery {
    let mut terms: Vec<String> = color.into_iter().collect();
    if let Some(category) = item.category.as_deref().filter(|c| !c.trim().is_empty()) {
        terms.extend(category_terms(category));
    }

    SearchQuery {
        query: join_terms(terms.iter().map(String::as_str)),
        method: SearchMethod::Metadata,
        fallback_reason: Some(reason),
        visual_quota_remaining,
    }
}

fn join_terms<'a>(terms: impl Iterator<Item = &'a str>) -> String {
    terms
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
