//! Admin API: signup review, approval and analytics.
//!
//! Every route sits behind the brute-force gate; each handler performs
//! its own bearer check so the gate can observe 401 versus 200.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use self::handlers::{approve_signups, get_analytics, list_signups};
use crate::http::response::with_cors;
use crate::http::server::AppState;
use crate::security::{admin_gate_middleware, AdminGate, CorsPolicy};

/// The request timeout sits inside the gate, so a slow handler still
/// hands its status back for observation.
#[allow(deprecated)]
pub fn setup_admin_router(state: AppState, gate: Arc<AdminGate>) -> Router {
    let timeout = Duration::from_secs(state.config.timeouts.request_secs);
    Router::new()
        .route(
            "/api/admin/signups",
            with_cors(get(list_signups), CorsPolicy::ADMIN_GET, true),
        )
        .route(
            "/api/admin/approve",
            with_cors(post(approve_signups), CorsPolicy::ADMIN_POST, true),
        )
        .route(
            "/api/admin/analytics",
            with_cors(get(get_analytics), CorsPolicy::ADMIN_GET, true),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn_with_state(gate, admin_gate_middleware))
        .with_state(state)
}
