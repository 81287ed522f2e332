//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the funnel.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the signup funnel service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FunnelConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening settings.
    pub security: SecurityConfig,

    /// Admin authentication and brute-force throttle.
    pub admin: AdminConfig,

    /// In-process attempt store settings.
    pub store: StoreConfig,

    /// Hosted data store (REST) credentials.
    pub data_store: DataStoreConfig,

    /// Transactional email provider.
    pub email: EmailConfig,

    /// Page view tracking.
    pub tracking: TrackingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for each call to the data store or email API, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret presented as `Authorization: Bearer <secret>`.
    /// Empty means every admin request is rejected.
    pub secret: String,

    /// Failed attempts allowed per client IP before blocking.
    pub max_attempts: u32,

    /// Lifetime of an attempt counter, refreshed on every failure.
    pub window_secs: u64,

    /// Header set by the edge platform carrying the real client IP.
    pub client_ip_header: String,

    /// Delay applied before answering a failed authorization.
    pub failure_delay_ms: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_attempts: 5,
            window_secs: 300,
            client_ip_header: "CF-Connecting-IP".to_string(),
            failure_delay_ms: 1000,
        }
    }
}

/// Expiring key-value store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How often expired entries are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
        }
    }
}

/// Hosted data store configuration. Both fields must be set for the
/// signup, tracking and admin handlers to reach the store.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DataStoreConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`.
    pub url: String,

    /// Service role key, sent as both `apikey` and bearer token.
    pub service_role_key: String,
}

impl DataStoreConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.service_role_key.is_empty()
    }
}

/// Transactional email configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// API key. Empty disables outbound email.
    pub api_key: String,

    /// Base URL of the email API.
    pub api_url: String,

    /// Sender used for welcome and invite emails.
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.resend.com".to_string(),
            from_address: "Sunset Net <onboarding@resend.dev>".to_string(),
        }
    }
}

/// Page view tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Header set by the edge platform carrying the visitor's country.
    pub country_header: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            country_header: "CF-IPCountry".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
