//! Brute-force gate in front of the admin API.
//!
//! Every admin request flows through [`admin_gate_middleware`]:
//!
//! ```text
//! CHECK (resolve IP, read counter)
//!     → count >= max_attempts  → BLOCKED (429, handler not called)
//!     → OPTIONS                → PASSTHROUGH (handler, no observation)
//!     → otherwise              → DISPATCH (handler)
//!                                  → OBSERVE: 401 increment, 200 reset
//!                                  → 401: hold the reply for the failure delay
//! ```
//!
//! The failure delay runs here, after the counter is written, and outside
//! the per-route request timeout. A slow reply can therefore never hide a
//! failed attempt from the counter.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::AdminConfig;
use crate::observability::metrics;
use crate::security::attempts::AttemptTracker;
use crate::security::headers::build_security_headers;

/// Stand-in key when the edge did not supply a client IP. Every such
/// request shares one counter.
pub const UNKNOWN_CLIENT: &str = "unknown";

const DEFAULT_IP_HEADER: &str = "cf-connecting-ip";

/// Outcome of the pre-dispatch check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Blocked { count: u32 },
    Proceed { count: u32 },
}

/// Per-IP failure throttle wrapped around protected handlers.
pub struct AdminGate {
    tracker: AttemptTracker,
    max_attempts: u32,
    ip_header: HeaderName,
    failure_delay: Duration,
}

impl AdminGate {
    pub fn new(tracker: AttemptTracker, config: &AdminConfig) -> Self {
        let ip_header = HeaderName::from_bytes(config.client_ip_header.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static(DEFAULT_IP_HEADER));

        Self {
            tracker,
            max_attempts: config.max_attempts,
            ip_header,
            failure_delay: Duration::from_millis(config.failure_delay_ms),
        }
    }

    pub fn tracker(&self) -> &AttemptTracker {
        &self.tracker
    }

    pub fn window(&self) -> Duration {
        self.tracker.window()
    }

    /// Client IP from the trusted edge header.
    pub fn client_ip(&self, headers: &HeaderMap) -> String {
        headers
            .get(&self.ip_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_CLIENT)
            .to_string()
    }

    pub async fn check(&self, ip: &str) -> GateDecision {
        let count = self.tracker.get_count(ip).await;
        if count >= self.max_attempts {
            GateDecision::Blocked { count }
        } else {
            GateDecision::Proceed { count }
        }
    }

    /// Update the counter from the protected handler's status.
    pub async fn observe(&self, ip: &str, status: StatusCode) {
        match status {
            StatusCode::UNAUTHORIZED => {
                metrics::record_admin_auth_failure();
                self.tracker.increment(ip).await;
            }
            StatusCode::OK => self.tracker.reset(ip).await,
            _ => {}
        }
    }

    /// The 429 sent to a blocked client.
    pub fn rejection(&self) -> Response {
        let window_secs = self.window().as_secs();
        let minutes = window_secs.div_ceil(60).max(1);
        let message = if minutes == 1 {
            "Too many attempts. Try again in 1 minute.".to_string()
        } else {
            format!("Too many attempts. Try again in {minutes} minutes.")
        };

        let mut headers = build_security_headers();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(window_secs));

        (
            StatusCode::TOO_MANY_REQUESTS,
            headers,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}

/// Middleware enforcing the admin brute-force throttle.
pub async fn admin_gate_middleware(
    State(gate): State<Arc<AdminGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = gate.client_ip(request.headers());

    if let GateDecision::Blocked { count } = gate.check(&ip).await {
        tracing::warn!(ip = %ip, count, path = %request.uri().path(), "Admin request blocked");
        metrics::record_admin_blocked();
        return gate.rejection();
    }

    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let response = next.run(request).await;
    gate.observe(&ip, response.status()).await;

    if response.status() == StatusCode::UNAUTHORIZED && !gate.failure_delay.is_zero() {
        tokio::time::sleep(gate.failure_delay).await;
    }
    response
}
