//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, ports valid)
//! - Check every backend forms a usable base URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    MaxConnections,

    #[error("at least one backend is required")]
    NoBackends,

    #[error("backend '{name}' has invalid base url '{url}'")]
    BackendUrl { name: String, url: String },

    #[error("backend '{0}' has port 0")]
    BackendPort(String),

    #[error("health_check.interval_secs must be greater than zero")]
    HealthInterval,

    #[error("health_check.timeout_secs must be greater than zero")]
    HealthTimeout,

    #[error("health_check.path '{0}' must start with '/'")]
    HealthPath(String),
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for backend in &config.backends {
        if backend.port == 0 {
            errors.push(ValidationError::BackendPort(backend.name.clone()));
        }
        let base = format!("{}:{}", backend.host, backend.port);
        let parsed = Url::parse(&base);
        if !matches!(parsed, Ok(ref u) if u.has_host()) {
            errors.push(ValidationError::BackendUrl {
                name: backend.name.clone(),
                url: base,
            });
        }
    }

    let hc = &config.health_check;
    if hc.enabled {
        if hc.interval_secs == 0 {
            errors.push(ValidationError::HealthInterval);
        }
        if hc.timeout_secs == 0 {
            errors.push(ValidationError::HealthTimeout);
        }
        if !hc.path.starts_with('/') {
            errors.push(ValidationError::HealthPath(hc.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
