//! Request identification and per-route accounting.
//!
//! # Responsibilities
//! - Generate a UUID v4 `x-request-id` when the caller sent none
//! - Echo the request ID on the response
//! - Count every request by matched route and final status

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, HeaderName, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::observability::metrics;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request ID assigned at the edge of the router.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Middleware recording `funnel_requests_total`.
pub async fn record_request_metrics(request: Request<Body>, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();

    let response = next.run(request).await;
    let status = response.status();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        route = %route,
        status = status.as_u16(),
        "Request completed"
    );
    metrics::record_request(&route, status.as_u16());
    response
}
