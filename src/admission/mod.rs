use crate::models::{Admission, ClientWindow};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;


/// Fixed-window request limiter keyed by client identifier.
pub struct AdmissionGate {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, ClientWindow>>,
}

impl AdmissionGate {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub async fn admit(&self, client_id: &str, now: Instant) -> Admission {
        let mut windows = self.windows.lock().await;

        match windows.get_mut(client_id) {
            Some(window) if now < window.reset_at => {
                if window.count < self.max_requests {
                    window.count += 1;
                    Admission::Allowed
                } else {
                    let retry_after_secs = ceil_secs(window.reset_at - now);
                    tracing::debug!(client_id, retry_after_secs, "admission denied");
                    Admission::Denied { retry_after_secs }
                }
            }
            _ => {
                windows.insert(
                    client_id.to_string(),
                    ClientWindow {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Admission::Allowed
            }
        }
    }

    /// Drops every window that expired before `now`. Returns how many were removed.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| window.reset_at >= now);
        before - windows.len()
    }

    pub async fn len(&self) -> usize {
        self.windows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.lock().await.is_empty()
    }

    pub async fn window_for(&self, client_id: &str) -> Option<ClientWindow> {
        self.windows.lock().await.get(client_id).copied()
    }
}

/// Runs `sweep` on a fixed interval until the returned task is aborted.
pub fn spawn_reaper(gate: Arc<AdmissionGate>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = gate.sweep(Instant::now()).await;
            if removed > 0 {
                tracing::trace!(removed, "swept expired client windows");
            }
        }
    })
}

fn ceil_secs(remaining: Duration) -> u64 {
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}
