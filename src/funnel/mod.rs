//! Public funnel endpoints: the signup form and the page view beacon.

pub mod signup;
pub mod track;

use std::time::Duration;

use axum::{routing::post, Router};
use tower_http::timeout::TimeoutLayer;

use self::signup::submit_signup;
use self::track::{track_method_not_allowed, track_page_view};
use crate::http::response::{with_cors, Reply};
use crate::http::server::AppState;
use crate::security::CorsPolicy;

#[allow(deprecated)]
pub fn setup_funnel_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.timeouts.request_secs);
    Router::new()
        .route(
            "/api/signup",
            with_cors(post(submit_signup), CorsPolicy::PUBLIC_POST, false),
        )
        .route(
            "/api/track",
            post(track_page_view)
                .options(|headers: axum::http::HeaderMap| async move {
                    Reply::public(&headers, CorsPolicy::PUBLIC_POST)
                        .empty(axum::http::StatusCode::NO_CONTENT)
                })
                .fallback(track_method_not_allowed),
        )
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
