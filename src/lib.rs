//! Signup funnel edge service library.

pub mod admin;
pub mod analytics;
pub mod config;
pub mod funnel;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;
pub mod upstream;

pub use config::FunnelConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
