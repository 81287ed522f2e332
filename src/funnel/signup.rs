//! Public signup form endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::http::response::Reply;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::CorsPolicy;
use crate::upstream::types::NewSignup;
use crate::upstream::UpstreamError;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 100;
const MAX_ERROR_DETAIL: usize = 200;

/// Trim and truncate a form value. Non-string scalars are rendered as
/// text; `null`, absent and blank values yield `None`.
pub fn sanitize(value: Option<&Value>, max_chars: usize) -> Option<String> {
    let raw = match value? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let cleaned: String = raw.trim().chars().take(max_chars).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().count() > MAX_EMAIL_LEN {
        return false;
    }
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// JSON truthiness of a checkbox-like field.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// POST /api/signup
pub async fn submit_signup(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let reply = Reply::public(&headers, CorsPolicy::PUBLIC_POST);

    let Ok(form) = serde_json::from_slice::<Value>(&body) else {
        return reply.error(StatusCode::BAD_REQUEST, "Invalid JSON");
    };

    let email = match sanitize(form.get("email"), MAX_EMAIL_LEN) {
        Some(email) if is_valid_email(&email) => email,
        _ => return reply.error(StatusCode::BAD_REQUEST, "Valid work email is required"),
    };
    let name = sanitize(form.get("name"), MAX_NAME_LEN);
    if !is_truthy(form.get("terms_accepted")) {
        return reply.error(StatusCode::BAD_REQUEST, "You must accept the Safety Terms");
    }

    let Some(store) = state.data_store.as_ref() else {
        tracing::error!("Signup received but data store is not configured");
        return reply.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error: missing environment variables",
        );
    };

    let row = NewSignup {
        email: email.to_lowercase(),
        name,
        terms_accepted_at: Utc::now(),
    };

    if let Err(e) = store.insert_signup(&row).await {
        if e.is_duplicate() {
            return reply.error(StatusCode::CONFLICT, "This email already has an account");
        }
        tracing::error!(error = %e, "Failed to save signup");
        metrics::record_upstream_error("data_store");
        let detail: String = match &e {
            UpstreamError::Status { body, .. } => body.chars().take(MAX_ERROR_DETAIL).collect(),
            other => other.to_string().chars().take(MAX_ERROR_DETAIL).collect(),
        };
        return reply.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Could not save signup: {detail}"),
        );
    }
    metrics::record_signup();
    tracing::info!("Signup saved");

    if let Some(mailer) = state.mailer.as_ref() {
        if let Err(e) = mailer.send_welcome(&email).await {
            tracing::error!(error = %e, "Welcome email failed");
            metrics::record_upstream_error("email");
        }
    }

    reply.json(
        StatusCode::CREATED,
        &json!({ "ok": true, "message": "Account created." }),
    )
}
