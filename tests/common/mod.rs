//! Shared utilities for integration testing.
//!
//! A programmable mock upstream stands in for both the hosted data store
//! (`/rest/v1/...`) and the email API (`/emails`) on one ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use signup_funnel::config::FunnelConfig;
use signup_funnel::{HttpServer, Shutdown};

pub const ADMIN_SECRET: &str = "test-admin-secret";
pub const SERVICE_KEY: &str = "service-role-key";

/// One request seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub requests: Mutex<Vec<Recorded>>,
    pub signups: Mutex<Vec<Value>>,
    pub page_views: Mutex<Vec<Value>>,
    /// Status for signup inserts; 0 means 201.
    pub insert_status: AtomicU16,
    /// Status for email sends; 0 means 200.
    pub email_status: AtomicU16,
    /// Status for table reads; 0 means 200.
    pub read_status: AtomicU16,
}

impl MockState {
    fn status(slot: &AtomicU16, default: StatusCode) -> StatusCode {
        match slot.load(Ordering::SeqCst) {
            0 => default,
            code => StatusCode::from_u16(code).unwrap(),
        }
    }

    pub fn recorded(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn record(state: &MockState, method: Method, uri: &Uri, headers: HeaderMap, body: &Bytes) {
    state.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
        body: serde_json::from_slice(body).unwrap_or(Value::Null),
    });
}

async fn signups_table(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method.clone(), &uri, headers, &body);

    match method {
        Method::POST => {
            let status = MockState::status(&state.insert_status, StatusCode::CREATED);
            if status.is_success() {
                let mut row: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                row["id"] = json!(uuid::Uuid::new_v4().to_string());
                row["approved_at"] = Value::Null;
                row["invite_sent_at"] = Value::Null;
                state.signups.lock().unwrap().push(row.clone());
                (status, Json(json!([row]))).into_response()
            } else {
                (status, r#"{"message":"duplicate key value violates unique constraint"}"#)
                    .into_response()
            }
        }
        Method::GET => {
            let status = MockState::status(&state.read_status, StatusCode::OK);
            if !status.is_success() {
                return (status, "read failed").into_response();
            }
            let rows = state.signups.lock().unwrap().clone();
            let rows: Vec<Value> = match params.get("id").and_then(|f| f.strip_prefix("eq.")) {
                Some(id) => rows.into_iter().filter(|r| r["id"] == id).collect(),
                None => rows,
            };
            Json(rows).into_response()
        }
        Method::PATCH => {
            let patch: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            if let Some(id) = params.get("id").and_then(|f| f.strip_prefix("eq.")) {
                let mut rows = state.signups.lock().unwrap();
                for row in rows.iter_mut().filter(|r| r["id"] == id) {
                    if let (Some(row), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
                        for (k, v) in patch {
                            row.insert(k.clone(), v.clone());
                        }
                    }
                }
            }
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn page_views_table(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method.clone(), &uri, headers, &body);

    match method {
        Method::POST => {
            let row: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            state.page_views.lock().unwrap().push(row);
            StatusCode::CREATED.into_response()
        }
        Method::GET => {
            let status = MockState::status(&state.read_status, StatusCode::OK);
            if !status.is_success() {
                return (status, "read failed").into_response();
            }
            Json(state.page_views.lock().unwrap().clone()).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn send_email(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, Method::POST, &uri, headers, &body);
    let status = MockState::status(&state.email_status, StatusCode::OK);
    (status, Json(json!({ "id": "email-1" }))).into_response()
}

/// Start the mock data store + email API on an ephemeral port.
pub async fn start_mock_upstream() -> MockUpstream {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/rest/v1/signups", any(signups_table))
        .route("/rest/v1/page_views", any(page_views_table))
        .route("/emails", post(send_email))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, state }
}

/// Config pointing every upstream at `mock`, with no failure delay.
pub fn config_for(mock: &MockUpstream) -> FunnelConfig {
    let mut config = FunnelConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.admin.secret = ADMIN_SECRET.into();
    config.admin.failure_delay_ms = 0;
    config.data_store.url = mock.url();
    config.data_store.service_role_key = SERVICE_KEY.into();
    config.email.api_key = "re_test".into();
    config.email.api_url = mock.url();
    config
}

/// A running funnel server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server(config: FunnelConfig) -> TestServer {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
