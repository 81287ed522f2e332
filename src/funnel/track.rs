//! Cookie-less page view tracking.
//!
//! The endpoint answers `ok` whatever happens downstream; tracking must
//! never break the page that fired it.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use serde_json::Value;

use crate::http::response::Reply;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::CorsPolicy;
use crate::upstream::types::NewPageView;

pub const MAX_PATH_LEN: usize = 500;
pub const MAX_REFERRER_LEN: usize = 1000;

const MOBILE_MARKERS: [&str; 5] = ["mobile", "android", "iphone", "ipad", "ipod"];
const TABLET_MARKERS: [&str; 2] = ["ipad", "tablet"];
const BOT_MARKERS: [&str; 5] = ["bot", "crawl", "spider", "slurp", "lighthouse"];

/// Device class from a User-Agent, or `None` for crawlers.
pub fn classify_device(user_agent: &str) -> Option<&'static str> {
    let ua = user_agent.to_lowercase();
    if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
        if TABLET_MARKERS.iter().any(|m| ua.contains(m)) {
            Some("tablet")
        } else {
            Some("mobile")
        }
    } else if BOT_MARKERS.iter().any(|m| ua.contains(m)) {
        None
    } else {
        Some("desktop")
    }
}

fn truncated(value: Option<&Value>, max_chars: usize) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(|s| s.chars().take(max_chars).collect())
}

/// POST /api/track
pub async fn track_page_view(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let reply = Reply::public(&headers, CorsPolicy::PUBLIC_POST);
    let ok = || reply.text(StatusCode::OK, "ok");

    let Some(store) = state.data_store.as_ref() else {
        return ok();
    };
    let Ok(event) = serde_json::from_slice::<Value>(&body) else {
        return ok();
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let Some(device) = classify_device(user_agent) else {
        return ok();
    };

    let country = headers
        .get(state.config.tracking.country_header.as_str())
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let view = NewPageView {
        path: truncated(event.get("path"), MAX_PATH_LEN).unwrap_or_else(|| "/".to_string()),
        referrer: truncated(event.get("referrer"), MAX_REFERRER_LEN).filter(|r| !r.is_empty()),
        country,
        device,
    };

    match store.insert_page_view(&view).await {
        Ok(()) => metrics::record_page_view(device),
        Err(e) => tracing::debug!(error = %e, "Page view not recorded"),
    }

    ok()
}

/// Wrong method on the tracker: bare 405.
pub async fn track_method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
