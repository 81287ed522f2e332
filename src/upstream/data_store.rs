//! REST client for the hosted data store.
//!
//! Tables are reached at `<base>/rest/v1/<table>` with filters expressed
//! as query parameters (`id=eq.<id>`, `created_at=gte.<ts>`). The service
//! role key goes out both as `apikey` and as a bearer token.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::DataStoreConfig;
use crate::upstream::types::{
    NewPageView, NewSignup, PageView, SignupPatch, SignupRow, UpstreamError, UpstreamResult,
};

const SIGNUP_LIST_COLUMNS: &str =
    "id,email,primary_stack,priority_lab,created_at,approved_at,invite_sent_at";
const SIGNUP_APPROVAL_COLUMNS: &str = "id,email,approved_at,invite_sent_at";
const PAGE_VIEW_COLUMNS: &str = "path,referrer,country,device,created_at";

/// Hosted data store client.
#[derive(Clone)]
pub struct DataStoreClient {
    http: Client,
    base_url: String,
    service_key: String,
}

impl DataStoreClient {
    /// Build a client, or `None` when credentials are not configured.
    pub fn from_config(config: &DataStoreConfig, timeout: Duration) -> UpstreamResult<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Setup(e.to_string()))?;

        Ok(Some(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_role_key.clone(),
        }))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(header::ACCEPT, "application/json")
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn checked(response: Response) -> UpstreamResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn insert<T: Serialize>(&self, table: &str, row: &T, prefer: &str) -> UpstreamResult<()> {
        let response = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", prefer)
            .json(row)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> UpstreamResult<Vec<T>> {
        let response = self
            .authed(self.http.get(self.table_url(table)))
            .query(query)
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn insert_signup(&self, row: &NewSignup) -> UpstreamResult<()> {
        self.insert("signups", row, "return=representation").await
    }

    /// Every signup, newest first, as opaque JSON rows.
    pub async fn list_signups(&self) -> UpstreamResult<Vec<serde_json::Value>> {
        self.select(
            "signups",
            &[
                ("select", SIGNUP_LIST_COLUMNS.to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn find_signup(&self, id: &str) -> UpstreamResult<Option<SignupRow>> {
        let rows: Vec<SignupRow> = self
            .select(
                "signups",
                &[
                    ("id", format!("eq.{id}")),
                    ("select", SIGNUP_APPROVAL_COLUMNS.to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn update_signup(&self, id: &str, patch: &SignupPatch) -> UpstreamResult<()> {
        let response = self
            .authed(self.http.patch(self.table_url("signups")))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(patch)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    pub async fn insert_page_view(&self, view: &NewPageView) -> UpstreamResult<()> {
        self.insert("page_views", view, "return=minimal").await
    }

    /// Page views created at or after `since`, newest first.
    pub async fn page_views_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> UpstreamResult<Vec<PageView>> {
        self.select(
            "page_views",
            &[
                ("select", PAGE_VIEW_COLUMNS.to_string()),
                (
                    "created_at",
                    format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}
