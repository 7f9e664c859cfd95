//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each backend in pool order
//!     → Update the backend's `active` flag in the pool
//! ```
//!
//! # Design Decisions
//! - One sequential sweep per tick, no fan-out
//! - A refused connection only affects that backend
//! - Any other probe failure ends the sweep early; later backends keep
//!   their previous state until the next tick
//! - The pool lock is never held across a probe

pub mod active;

pub use active::{HealthMonitor, ProbeError};
