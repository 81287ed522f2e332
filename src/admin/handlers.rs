use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::admin::auth::require_admin;
use crate::analytics::{self, MAX_ROWS};
use crate::http::response::Reply;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::CorsPolicy;
use crate::upstream::types::SignupPatch;
use crate::upstream::{DataStoreClient, Mailer};

/// Most signups approvable in one request.
pub const MAX_APPROVE_BATCH: usize = 50;

/// Outcome of approving one signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproveResult {
    pub id: String,
    pub approved: bool,
    pub invited: bool,
    pub error: Option<String>,
}

impl ApproveResult {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            approved: false,
            invited: false,
            error: None,
        }
    }

    fn failed(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }
}

/// Hyphenated UUID, any case.
pub fn is_signup_id(value: &str) -> bool {
    value.len() == 36 && uuid::Uuid::try_parse(value).is_ok()
}

fn configured_store<'a>(state: &'a AppState, reply: &Reply) -> Result<&'a DataStoreClient, Response> {
    state.data_store.as_ref().ok_or_else(|| {
        tracing::error!(
            has_url = !state.config.data_store.url.is_empty(),
            has_key = !state.config.data_store.service_role_key.is_empty(),
            "Data store not configured"
        );
        reply.error(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
    })
}

/// GET /api/admin/signups
pub async fn list_signups(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let reply = Reply::admin(&headers, CorsPolicy::ADMIN_GET);
    if let Err(denied) = require_admin(&state, &headers, &reply) {
        return denied;
    }
    let store = match configured_store(&state, &reply) {
        Ok(store) => store,
        Err(res) => return res,
    };

    match store.list_signups().await {
        Ok(signups) => reply.json(StatusCode::OK, &json!({ "signups": signups })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list signups");
            metrics::record_upstream_error("data_store");
            reply.error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch signups")
        }
    }
}

/// Validate the approval body, returning the IDs or the 400 message.
pub fn parse_approve_ids(body: &[u8]) -> Result<Vec<String>, String> {
    let body: Value = serde_json::from_slice(body).map_err(|_| "Invalid JSON".to_string())?;

    let ids = match body.get("ids").and_then(Value::as_array) {
        Some(ids) if !ids.is_empty() => ids,
        _ => return Err("ids must be a non-empty array".to_string()),
    };
    if ids.len() > MAX_APPROVE_BATCH {
        return Err(format!("Max {MAX_APPROVE_BATCH} IDs per batch"));
    }

    ids.iter()
        .enumerate()
        .map(|(i, id)| match id.as_str() {
            Some(id) if is_signup_id(id) => Ok(id.to_string()),
            _ => Err(format!("Invalid ID format at index {i}")),
        })
        .collect()
}

async fn approve_one(store: &DataStoreClient, mailer: Option<&Mailer>, id: &str) -> ApproveResult {
    let result = ApproveResult::new(id);

    let signup = match store.find_signup(id).await {
        Ok(Some(signup)) => signup,
        Ok(None) => return result.failed("Signup not found"),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to fetch signup");
            metrics::record_upstream_error("data_store");
            return result.failed("Failed to fetch signup");
        }
    };

    let now = Utc::now();
    if signup.approved_at.is_none() {
        let patch = SignupPatch {
            approved_at: Some(now),
            ..SignupPatch::default()
        };
        if let Err(e) = store.update_signup(id, &patch).await {
            tracing::error!(id = %id, error = %e, "Failed to set approved_at");
            metrics::record_upstream_error("data_store");
            return result.failed("Failed to update approved_at");
        }
    }

    let mut result = ApproveResult {
        approved: true,
        ..result
    };

    if signup.invite_sent_at.is_some() {
        result.invited = true;
        return result;
    }

    let Some(mailer) = mailer else {
        return result.failed("Approved but email sender not configured");
    };

    match mailer.send_invite(&signup.email).await {
        Ok(()) => {
            let patch = SignupPatch {
                invite_sent_at: Some(now),
                ..SignupPatch::default()
            };
            if let Err(e) = store.update_signup(id, &patch).await {
                tracing::warn!(id = %id, error = %e, "Invite sent but invite_sent_at not recorded");
            }
            result.invited = true;
            result
        }
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Invite email failed");
            metrics::record_upstream_error("email");
            result.failed("Approved but email send failed")
        }
    }
}

/// POST /api/admin/approve
pub async fn approve_signups(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let reply = Reply::admin(&headers, CorsPolicy::ADMIN_POST);
    if let Err(denied) = require_admin(&state, &headers, &reply) {
        return denied;
    }
    let store = match configured_store(&state, &reply) {
        Ok(store) => store,
        Err(res) => return res,
    };

    let ids = match parse_approve_ids(&body) {
        Ok(ids) => ids,
        Err(message) => return reply.error(StatusCode::BAD_REQUEST, message),
    };

    let mut results = Vec::with_capacity(ids.len());
    for id in &ids {
        results.push(approve_one(store, state.mailer.as_ref(), id).await);
    }

    tracing::info!(
        requested = ids.len(),
        approved = results.iter().filter(|r| r.approved).count(),
        invited = results.iter().filter(|r| r.invited).count(),
        "Processed approval batch"
    );
    reply.json(StatusCode::OK, &json!({ "results": results }))
}

/// GET /api/admin/analytics?days=N
pub async fn get_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let reply = Reply::admin(&headers, CorsPolicy::ADMIN_GET);
    if let Err(denied) = require_admin(&state, &headers, &reply) {
        return denied;
    }
    let store = match configured_store(&state, &reply) {
        Ok(store) => store,
        Err(res) => return res,
    };

    let raw_days = query.as_deref().and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "days")
            .map(|(_, v)| v.into_owned())
    });
    let days = analytics::parse_days(raw_days.as_deref());

    let now = Utc::now();
    let since = now - Duration::days(i64::from(days));

    match store.page_views_since(since, MAX_ROWS).await {
        Ok(views) => reply.json(StatusCode::OK, &analytics::aggregate(&views, days, now)),
        Err(e) => {
            tracing::error!(error = %e, days, "Failed to fetch page views");
            metrics::record_upstream_error("data_store");
            reply.error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch analytics")
        }
    }
}
