//! Transactional email client.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::EmailConfig;
use crate::upstream::types::{UpstreamError, UpstreamResult};

pub const WELCOME_SUBJECT: &str = "Welcome to Sunset Net";
pub const WELCOME_HTML: &str = "<p>Welcome to Sunset Net.</p>\n\
<p>Your free trial is ready. Log in to get started.</p>\n\
<p>The Sunset Net team</p>";

pub const INVITE_SUBJECT: &str = "You're approved for Sunset Net";
pub const INVITE_HTML: &str = "<p>You've been approved for Sunset Net.</p>\n\
<p>Your account is ready. Log in to get started with your free trial.</p>\n\
<p>Welcome aboard.</p>\n\
<p>The Sunset Net team</p>";

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Email API client.
#[derive(Clone)]
pub struct Mailer {
    http: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl Mailer {
    /// Build a mailer, or `None` when no API key is configured.
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> UpstreamResult<Option<Self>> {
        if config.api_key.is_empty() {
            return Ok(None);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Setup(e.to_string()))?;

        Ok(Some(Self {
            http,
            endpoint: format!("{}/emails", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
        }))
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> UpstreamResult<()> {
        let email = OutgoingEmail {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(UpstreamError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }

    pub async fn send_welcome(&self, to: &str) -> UpstreamResult<()> {
        self.send(to, WELCOME_SUBJECT, WELCOME_HTML).await
    }

    pub async fn send_invite(&self, to: &str) -> UpstreamResult<()> {
        self.send(to, INVITE_SUBJECT, INVITE_HTML).await
    }
}
