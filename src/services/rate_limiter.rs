//! Process-wide single-lane rate gate shared by every catalog request.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Serializes outbound calls to an upstream with a fixed minimum spacing.
/// Cloning shares the same gate: every clone waits on the same lock.
#[derive(Clone)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Arc<RwLock<Option<Instant>>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Arc::new(RwLock::new(None)),
        }
    }

    /// Blocks the caller until at least `min_interval` has elapsed since the
    /// previous call returned, then reserves the slot for this call.
    pub async fn wait(&self) {
        let mut last = self.last_call.write().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
