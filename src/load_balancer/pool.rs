//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends
//! - Serialize every read and write behind one lock
//! - Apply the load balancing algorithm to select backends

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::config::BackendConfig;
use crate::load_balancer::{
    backend::Backend,
    round_robin::{self, RoundRobin},
    LoadBalancer, SelectError,
};

/// Errors surfaced by pool operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No backend can take the request.
    #[error("no active server available")]
    NoActiveBackend,

    /// The pool was built without entries.
    #[error("backend pool must contain at least one backend")]
    Empty,

    /// A previous holder of the lock panicked.
    #[error("backend pool lock poisoned")]
    Poisoned,

    #[error("backend index {index} out of range for pool of {len}")]
    OutOfRange { index: usize, len: usize },
}

impl From<SelectError> for PoolError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::NoActiveBackend => PoolError::NoActiveBackend,
            SelectError::Empty => PoolError::Empty,
        }
    }
}

/// The shared, fixed-size set of backends.
#[derive(Debug)]
pub struct BackendPool {
    backends: Mutex<Vec<Backend>>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendPool {
    /// Build a pool using the default fair round-robin strategy.
    pub fn new(backends: Vec<Backend>) -> Result<Self, PoolError> {
        Self::with_balancer(backends, Box::new(RoundRobin::new()))
    }

    pub fn with_balancer(
        backends: Vec<Backend>,
        balancer: Box<dyn LoadBalancer>,
    ) -> Result<Self, PoolError> {
        if backends.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self {
            backends: Mutex::new(backends),
            balancer,
        })
    }

    /// Build a pool from configuration, in configured order.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, PoolError> {
        Self::new(configs.iter().map(Backend::from).collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Backend>>, PoolError> {
        self.backends.lock().map_err(|_| PoolError::Poisoned)
    }

    /// Select the next backend and return a copy of it as selected.
    pub fn select_target(&self) -> Result<Backend, PoolError> {
        let mut backends = self.lock()?;
        let index = self.balancer.next_server(&mut backends)?;
        let backend = backends[index].clone();

        tracing::trace!(
            strategy = self.balancer.name(),
            index,
            name = %backend.name,
            hit_count = backend.hit_count,
            "Backend selected"
        );
        Ok(backend)
    }

    /// Record the result of a health check for the backend at `index`.
    pub fn mark_active(&self, index: usize, active: bool) -> Result<(), PoolError> {
        let mut backends = self.lock()?;
        let len = backends.len();
        let backend = backends
            .get_mut(index)
            .ok_or(PoolError::OutOfRange { index, len })?;
        backend.active = active;
        Ok(())
    }

    /// Clear every `in_use` flag.
    pub fn reset_in_use(&self) -> Result<(), PoolError> {
        let mut backends = self.lock()?;
        round_robin::reset_in_use(&mut backends);
        Ok(())
    }

    /// Copy of every entry, in order.
    pub fn snapshot(&self) -> Result<Vec<Backend>, PoolError> {
        Ok(self.lock()?.clone())
    }

    /// Number of entries. Fixed for the lifetime of the pool.
    pub fn len(&self) -> usize {
        self.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
