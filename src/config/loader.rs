//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::FunnelConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<FunnelConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => FunnelConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the deployment environment variables onto `config`.
///
/// Secrets normally arrive this way rather than through the file. Empty
/// values are ignored.
pub fn apply_env_overrides<F>(config: &mut FunnelConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let targets: [(&str, &mut String); 6] = [
        ("ADMIN_SECRET", &mut config.admin.secret),
        ("SUPABASE_URL", &mut config.data_store.url),
        ("SUPABASE_SERVICE_ROLE_KEY", &mut config.data_store.service_role_key),
        ("RESEND_API_KEY", &mut config.email.api_key),
        ("CONFIRMATION_FROM_EMAIL", &mut config.email.from_address),
        ("BIND_ADDRESS", &mut config.listener.bind_address),
    ];

    for (key, slot) in targets {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            tracing::debug!(variable = key, "Applying environment override");
            *slot = value;
        }
    }
}
