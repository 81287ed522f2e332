//! Failed admin authorization counters, one per client IP.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::store::{ExpiringStore, StoreError, StoreResult};

const KEY_PREFIX: &str = "rate-limit/admin/";

/// Stored value of a counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttemptRecord {
    #[serde(default)]
    pub count: u32,
}

/// Store key for the counter belonging to `ip`.
pub fn attempt_key(ip: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(ip.as_bytes()).collect();
    format!("{KEY_PREFIX}{encoded}")
}

/// Owns every read and write of the attempt counters.
///
/// All public operations fail open: a store error reads as "no prior
/// attempts" and a failed write is logged and dropped. Nothing here can
/// fail the request it runs under.
#[derive(Clone)]
pub struct AttemptTracker {
    store: Arc<dyn ExpiringStore>,
    window: Duration,
}

impl AttemptTracker {
    pub fn new(store: Arc<dyn ExpiringStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current count for `ip`, with store failures reported.
    pub async fn try_count(&self, ip: &str) -> StoreResult<u32> {
        let Some(raw) = self.store.get(&attempt_key(ip)).await? else {
            return Ok(0);
        };
        let record: AttemptRecord =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(record.count)
    }

    /// Current count for `ip`; 0 when absent or when the store fails.
    pub async fn get_count(&self, ip: &str) -> u32 {
        match self.try_count(ip).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Attempt store read failed, assuming no prior attempts");
                metrics::record_store_unavailable("get");
                0
            }
        }
    }

    /// Record one more failure for `ip` and restart its window.
    pub async fn increment(&self, ip: &str) {
        let count = self.get_count(ip).await.saturating_add(1);
        let record = AttemptRecord { count };

        let value = match serde_json::to_vec(&record) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Failed to encode attempt record");
                return;
            }
        };

        match self.store.put(&attempt_key(ip), value, self.window).await {
            Ok(()) => tracing::debug!(ip = %ip, count, "Recorded failed admin attempt"),
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Attempt store write failed, attempt not counted");
                metrics::record_store_unavailable("put");
            }
        }
    }

    /// Forget every recorded failure for `ip`.
    pub async fn reset(&self, ip: &str) {
        if let Err(e) = self.store.delete(&attempt_key(ip)).await {
            tracing::warn!(ip = %ip, error = %e, "Attempt store delete failed");
            metrics::record_store_unavailable("delete");
        }
    }
}
