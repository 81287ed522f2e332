//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the upstream clients and the admin gate from config
//! - Create the Axum Router with the public and admin route trees
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Run the attempt store sweeper alongside the server
//! - Serve until the shutdown coordinator fires

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::config::FunnelConfig;
use crate::funnel::setup_funnel_router;
use crate::http::request::{propagate_request_id_layer, record_request_metrics, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::security::{AdminGate, AttemptTracker};
use crate::store::{ExpiringStore, MemoryStore};
use crate::upstream::{DataStoreClient, Mailer, UpstreamResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FunnelConfig>,
    /// `None` when data store credentials are missing.
    pub data_store: Option<DataStoreClient>,
    /// `None` when no email API key is configured.
    pub mailer: Option<Mailer>,
}

impl AppState {
    pub fn from_config(config: FunnelConfig) -> UpstreamResult<Self> {
        let timeout = Duration::from_secs(config.timeouts.upstream_secs);
        let data_store = DataStoreClient::from_config(&config.data_store, timeout)?;
        let mailer = Mailer::from_config(&config.email, timeout)?;

        if data_store.is_none() {
            tracing::warn!("Data store credentials missing; signup and admin routes will answer 500");
        }
        if mailer.is_none() {
            tracing::warn!("Email API key missing; welcome and invite emails disabled");
        }
        if config.admin.secret.is_empty() {
            tracing::warn!("Admin secret not set; every admin request will be rejected");
        }

        Ok(Self {
            config: Arc::new(config),
            data_store,
            mailer,
        })
    }
}

/// HTTP server for the signup funnel.
pub struct HttpServer {
    router: Router,
    config: Arc<FunnelConfig>,
    store: MemoryStore,
    gate: Arc<AdminGate>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: FunnelConfig) -> UpstreamResult<Self> {
        let state = AppState::from_config(config)?;
        let store = MemoryStore::new();

        let tracker = AttemptTracker::new(
            Arc::new(store.clone()) as Arc<dyn ExpiringStore>,
            Duration::from_secs(state.config.admin.window_secs),
        );
        let gate = Arc::new(AdminGate::new(tracker, &state.config.admin));

        let config = state.config.clone();
        let router = Self::build_router(&config, state, gate.clone());
        Ok(Self {
            router,
            config,
            store,
            gate,
        })
    }

    /// Build the Axum router with all middleware layers. Request
    /// timeouts live on the funnel and admin routers.
    pub fn build_router(config: &FunnelConfig, state: AppState, gate: Arc<AdminGate>) -> Router {
        Router::new()
            .merge(setup_funnel_router(state.clone()))
            .merge(setup_admin_router(state, gate))
            .layer(middleware::from_fn(record_request_metrics))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The admin gate, for inspecting attempt counters.
    pub fn gate(&self) -> Arc<AdminGate> {
        self.gate.clone()
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_every = Duration::from_secs(self.config.store.sweep_interval_secs);
        tokio::spawn(self.store.clone().run_sweeper(sweep_every, shutdown.subscribe()));

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
