//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds and timeouts > 0, addresses parse)
//! - Validate that configured header names are legal
//! - Keep the admin failure delay inside the request timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FunnelConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::FunnelConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("invalid header name '{value}' for {field}")]
    InvalidHeader { field: &'static str, value: String },

    #[error("data_store.url must be an http(s) URL, got '{0}'")]
    InvalidDataStoreUrl(String),

    #[error("email.api_url must be an http(s) URL, got '{0}'")]
    InvalidEmailUrl(String),

    /// A failed admin request must finish inside the request timeout,
    /// otherwise the gate never sees the 401.
    #[error("admin.failure_delay_ms ({delay_ms}) must be below timeouts.request_secs ({timeout_ms} ms)")]
    FailureDelayExceedsTimeout { delay_ms: u64, timeout_ms: u64 },
}

pub fn validate_config(config: &FunnelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.admin.max_attempts == 0 {
        errors.push(ValidationError::Zero("admin.max_attempts"));
    }
    if config.admin.window_secs == 0 {
        errors.push(ValidationError::Zero("admin.window_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.store.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero("store.sweep_interval_secs"));
    }

    let timeout_ms = config.timeouts.request_secs.saturating_mul(1000);
    if config.timeouts.request_secs > 0 && config.admin.failure_delay_ms >= timeout_ms {
        errors.push(ValidationError::FailureDelayExceedsTimeout {
            delay_ms: config.admin.failure_delay_ms,
            timeout_ms,
        });
    }

    for (field, value) in [
        ("admin.client_ip_header", &config.admin.client_ip_header),
        ("tracking.country_header", &config.tracking.country_header),
    ] {
        if HeaderName::from_bytes(value.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeader {
                field,
                value: value.clone(),
            });
        }
    }

    if !config.data_store.url.is_empty() && !is_http_url(&config.data_store.url) {
        errors.push(ValidationError::InvalidDataStoreUrl(
            config.data_store.url.clone(),
        ));
    }
    if !is_http_url(&config.email.api_url) {
        errors.push(ValidationError::InvalidEmailUrl(config.email.api_url.clone()));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FunnelConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = FunnelConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.admin.max_attempts = 0;
        config.admin.window_secs = 0;
        config.admin.client_ip_header = "bad header".into();
        config.data_store.url = "ftp://example.com".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::Zero("admin.max_attempts")));
        assert!(errors.contains(&ValidationError::Zero("admin.window_secs")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidDataStoreUrl(_))));
    }

    #[test]
    fn test_failure_delay_must_fit_in_request_timeout() {
        let mut config = FunnelConfig::default();
        config.timeouts.request_secs = 1;
        config.admin.failure_delay_ms = 1500;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::FailureDelayExceedsTimeout {
                delay_ms: 1500,
                timeout_ms: 1000,
            }]
        );

        config.admin.failure_delay_ms = 1000;
        assert!(validate_config(&config).is_err());

        config.admin.failure_delay_ms = 999;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = FunnelConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("observability.metrics_address"));
    }
}
