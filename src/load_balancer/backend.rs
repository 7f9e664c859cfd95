//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track selection state (`in_use`, `hit_count`)
//! - Track liveness reported by the health checker (`active`)

use crate::config::BackendConfig;

/// A single backend server entry in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Scheme and hostname, e.g. `http://localhost`.
    pub host: String,
    pub port: u16,
    /// Informational label.
    pub name: String,
    /// Times this backend has been selected. Never decreases.
    pub hit_count: u64,
    /// Already selected in the current selection cycle.
    pub in_use: bool,
    /// Passed the most recent health check.
    pub active: bool,
}

impl Backend {
    /// Create a fresh, active backend that has not been selected yet.
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            name: name.into(),
            hit_count: 0,
            in_use: false,
            active: true,
        }
    }

    /// Base address requests are forwarded to: `{host}:{port}`.
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address of the health probe for this backend.
    pub fn probe_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Record a selection.
    pub(crate) fn mark_selected(&mut self) {
        self.in_use = true;
        self.hit_count += 1;
    }
}

impl From<&BackendConfig> for Backend {
    fn from(config: &BackendConfig) -> Self {
        Backend::new(config.name.clone(), config.host.clone(), config.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_backend_is_active_and_unused() {
        let b = Backend::new("Host 1", "http://localhost", 9000);
        assert!(b.active);
        assert!(!b.in_use);
        assert_eq!(b.hit_count, 0);
    }

    #[test]
    fn urls_join_host_and_port() {
        let b = Backend::new("Host 1", "http://localhost", 9000);
        assert_eq!(b.base_url(), "http://localhost:9000");
        assert_eq!(b.probe_url("/healthcheck"), "http://localhost:9000/healthcheck");
    }

    #[test]
    fn selection_marks_in_use_and_counts() {
        let mut b = Backend::new("Host 1", "http://localhost", 9000);
        b.mark_selected();
        b.mark_selected();
        assert!(b.in_use);
        assert_eq!(b.hit_count, 2);
    }
}
