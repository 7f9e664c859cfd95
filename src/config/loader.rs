//! Assembling the effective configuration.
//!
//! The pool is static: configuration starts from the built-in defaults and
//! only command-line overrides are layered on top before validation.

use crate::config::schema::{LogFormat, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub disable_health_check: bool,
}

impl ConfigOverrides {
    /// Apply the overrides to `config` in place.
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(bind) = &self.bind_address {
            config.listener.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            // Keep the configured interface, replace only the port.
            let host = config
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            config.listener.bind_address = format!("{}:{}", host, port);
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if self.disable_health_check {
            config.health_check.enabled = false;
        }
    }
}

/// Build the default configuration, apply overrides and validate.
pub fn load_config(overrides: &ConfigOverrides) -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::with_default_backends();
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
