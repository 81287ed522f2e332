//! Expiring key-value store abstraction.
//!
//! # Data Flow
//! ```text
//! security::attempts (AttemptTracker)
//!     → ExpiringStore trait (get / put with TTL / delete)
//!     → memory.rs (DashMap-backed, lazily expired + periodic sweep)
//! ```
//!
//! # Design Decisions
//! - Injected as `Arc<dyn ExpiringStore>`, never reached through a global
//! - Values are opaque bytes; callers own their encoding
//! - Every operation reports failure explicitly through `StoreError`
//!   so callers decide their own degradation policy

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;

/// Errors surfaced by a store backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded by the caller.
    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A key-value cache whose entries disappear after a per-write TTL.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Fetch the live value for `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value and
    /// restarting its lifetime at `ttl`.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
