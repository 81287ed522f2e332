//! Upstream payloads and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Client could not be constructed.
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Connection, timeout, or body transfer failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl UpstreamError {
    /// Whether the data store refused an insert because the row exists.
    pub fn is_duplicate(&self) -> bool {
        match self {
            UpstreamError::Status { status, body } => {
                *status == 409 || body.contains("duplicate") || body.contains("unique")
            }
            _ => false,
        }
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Row written by the public signup form.
#[derive(Debug, Clone, Serialize)]
pub struct NewSignup {
    pub email: String,
    pub name: Option<String>,
    pub terms_accepted_at: DateTime<Utc>,
}

/// The subset of a signup row the approval flow needs.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRow {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub approved_at: Option<String>,
    #[serde(default)]
    pub invite_sent_at: Option<String>,
}

/// Partial update applied to a signup row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_sent_at: Option<DateTime<Utc>>,
}

/// Row written by the page view tracker. Holds no IP or cookie data.
#[derive(Debug, Clone, Serialize)]
pub struct NewPageView {
    pub path: String,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub device: &'static str,
}

/// A stored page view as read back for analytics.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageView {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
