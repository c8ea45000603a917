use crate::models::{Consumption, ResourceUsage, UsageCounter, UsageReport};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;


/// AI visual recognition calls.
pub const VISUAL_RECOGNITION: &str = "visual-recognition";
/// Product search calls.
pub const PRODUCT_SEARCH: &str = "product-search";

/// Calendar-month period key, e.g. `2025-06`.
pub fn period_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Monthly consumption budget for costly external resources.
///
/// Counters live in process memory only and start from zero after a restart.
/// Counters of earlier months are pruned once a later month is seen; a call
/// stamped with an earlier month never touches later counters.
pub struct QuotaLedger {
    default_limit: u64,
    limits: HashMap<String, u64>,
    counters: Mutex<HashMap<(String, String), UsageCounter>>,
}

impl QuotaLedger {
    pub fn new(default_limit: u64) -> Self {
        Self {
            default_limit,
            limits: HashMap::new(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_limit(mut self, resource: impl Into<String>, limit: u64) -> Self {
        self.limits.insert(resource.into(), limit);
        self
    }

    pub fn limit_for(&self, resource: &str) -> u64 {
        self.limits
            .get(resource)
            .copied()
            .unwrap_or(self.default_limit)
    }

    pub async fn try_consume(&self, resource: &str, cost: u64) -> Consumption {
        self.try_consume_at(resource, cost, Utc::now()).await
    }

    pub async fn try_consume_at(&self, resource: &str, cost: u64, now: DateTime<Utc>) -> Consumption {
        let period = period_key(now);
        let limit = self.limit_for(resource);
        let mut counters = self.counters.lock().await;
        prune_stale(&mut counters, &period);

        let counter = counters
            .entry((resource.to_string(), period))
            .or_insert(UsageCounter { used: 0, limit });

        match counter.used.checked_add(cost) {
            Some(total) if total <= counter.limit => {
                counter.used = total;
                tracing::debug!(resource, used = counter.used, limit = counter.limit, "quota consumed");
                Consumption {
                    allowed: true,
                    remaining: counter.remaining(),
                    limit: counter.limit,
                }
            }
            _ => {
                tracing::info!(resource, used = counter.used, limit = counter.limit, "monthly quota exhausted");
                Consumption {
                    allowed: false,
                    remaining: counter.remaining(),
                    limit: counter.limit,
                }
            }
        }
    }

    pub async fn usage(&self) -> UsageReport {
        self.usage_at(Utc::now()).await
    }

    /// Usage of every configured resource, plus any ad-hoc resource consumed this period.
    pub async fn usage_at(&self, now: DateTime<Utc>) -> UsageReport {
        let period = period_key(now);
        let counters = self.counters.lock().await;

        let mut resources: BTreeMap<String, ResourceUsage> = self
            .limits
            .iter()
            .map(|(name, limit)| {
                let empty = UsageCounter { used: 0, limit: *limit };
                (name.clone(), empty.into())
            })
            .collect();

        for ((name, counter_period), counter) in counters.iter() {
            if *counter_period == period {
                resources.insert(name.clone(), (*counter).into());
            }
        }

        UsageReport { period, resources }
    }

    /// Forgets all consumption. Operational/test use only.
    pub async fn reset(&self) {
        self.counters.lock().await.clear();
        tracing::info!("quota usage reset");
    }
}

/// Drops counters of months before `period`. `YYYY-MM` keys sort chronologically.
fn prune_stale(counters: &mut HashMap<(String, String), UsageCounter>, period: &str) {
    counters.retain(|(_, counter_period), _| counter_period.as_str() >= period);
}
