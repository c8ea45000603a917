use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::Instant;

use crate::admission::AdmissionGate;
use crate::colors::ColorCache;
use crate::quota::QuotaLedger;
use crate::search::{SearchPlanner, VisualAnalyzer};

/// Per-client fixed window tracked by the admission gate.
#[derive(Debug, Clone, Copy)]
pub struct ClientWindow {
    pub count: u32,
    pub reset_at: Instant,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Consumption of one external resource within one calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounter {
    pub used: u64,
    pub limit: u64,
}

impl UsageCounter {
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Result of `QuotaLedger::try_consume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Consumption {
    pub allowed: bool,
    pub remaining: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceUsage {
    pub used: u64,
    pub limit: u64,
    pub remaining: u64,
}

impl From<UsageCounter> for ResourceUsage {
    fn from(counter: UsageCounter) -> Self {
        Self {
            used: counter.used,
            limit: counter.limit,
            remaining: counter.remaining(),
        }
    }
}

/// Read-only snapshot of the ledger for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    pub period: String,
    pub resources: BTreeMap<String, ResourceUsage>,
}

/// Process-wide state shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AdmissionGate>,
    pub ledger: Arc<QuotaLedger>,
    pub colors: Arc<ColorCache>,
    pub planner: Arc<SearchPlanner>,
    pub analyzer: Arc<dyn VisualAnalyzer>,
}

impl AppState {
    pub fn new(
        gate: AdmissionGate,
        ledger: QuotaLedger,
        colors: ColorCache,
        analyzer: Arc<dyn VisualAnalyzer>,
    ) -> Self {
        let ledger = Arc::new(ledger);
        let colors = Arc::new(colors);
        Self {
            gate: Arc::new(gate),
            planner: Arc::new(SearchPlanner::new(ledger.clone(), colors.clone())),
            ledger,
            colors,
            analyzer,
        }
    }
}
