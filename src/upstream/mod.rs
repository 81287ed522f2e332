//! Clients for the hosted services behind the funnel.
//!
//! # Data Flow
//! ```text
//! handlers
//!     → data_store.rs (REST table API: signups, page_views)
//!     → mailer.rs (transactional email)
//! ```
//!
//! # Design Decisions
//! - Each client is built once at startup and cloned into handlers
//! - Every call carries the configured upstream timeout
//! - Non-2xx answers become `UpstreamError::Status` with the body kept
//!   for logging and duplicate detection

pub mod data_store;
pub mod mailer;
pub mod types;

pub use data_store::DataStoreClient;
pub use mailer::Mailer;
pub use types::{UpstreamError, UpstreamResult};
