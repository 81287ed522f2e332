//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming admin request:
//!     → rate_limit.rs (per-IP failure gate, may answer 429)
//!     → admin handler
//!         → compare.rs (constant-time bearer check)
//!         → headers.rs (CORS + hardening headers on the reply)
//!     → rate_limit.rs observes the status
//!         → attempts.rs (increment on 401, reset on 200)
//! ```
//!
//! # Design Decisions
//! - The gate fails open: a broken attempt store never denies an admin
//! - The comparator fails closed: no configured secret, no access
//! - Headers are built in one place and reused by every handler

pub mod attempts;
pub mod compare;
pub mod headers;
pub mod rate_limit;

pub use attempts::AttemptTracker;
pub use compare::compare;
pub use headers::{build_security_headers, CorsPolicy};
pub use rate_limit::{admin_gate_middleware, AdminGate, GateDecision};
