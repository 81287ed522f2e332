//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, per-route metrics)
//!     → funnel / admin routers (admin behind the gate)
//!     → response.rs (CORS, hardening headers, JSON envelopes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::Reply;
pub use server::{AppState, HttpServer};
