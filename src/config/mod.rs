//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (static backend pool)
//!     → loader.rs (apply command-line overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to the server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the pool never changes size
//! - All fields have defaults to allow running with no arguments
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ConfigOverrides};
pub use schema::{BackendConfig, HealthCheckConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig};
