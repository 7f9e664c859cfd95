//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (lock the shared backend list)
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (fair round-robin with per-cycle window)
//!     → backend.rs (mark selected, count hit)
//!     → Return a snapshot of the chosen backend or an error
//! ```
//!
//! # Design Decisions
//! - Algorithms are stateless; all state lives in the backend entries
//! - The pool is the only owner of the entries and exposes only
//!   synchronized operations
//! - The health checker writes `active`, the selector reads it

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::Backend;
pub use pool::{BackendPool, PoolError};
pub use round_robin::RoundRobin;

/// Why an algorithm could not pick a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("no active server available")]
    NoActiveBackend,
    #[error("backend pool is empty")]
    Empty,
}

/// A backend selection strategy.
///
/// Implementations receive exclusive access to the entries for the duration
/// of one selection and may update their selection state.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick the index of the next backend to use.
    fn next_server(&self, backends: &mut [Backend]) -> Result<usize, SelectError>;

    /// Strategy name for logs.
    fn name(&self) -> &'static str;
}
