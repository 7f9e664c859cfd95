//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends
//! - Update backend `active` flags based on results

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::load_balancer::pool::{BackendPool, PoolError};

/// Why a probe failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build health check request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("connection refused: {0}")]
    Refused(#[source] hyper_util::client::legacy::Error),

    #[error("health check request failed: {0}")]
    Transport(#[source] hyper_util::client::legacy::Error),

    #[error("health check timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read health check body: {0}")]
    Body(#[source] axum::Error),

    #[error("health check body not read within {0:?}")]
    BodyTimeout(Duration),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl ProbeError {
    fn from_client(err: hyper_util::client::legacy::Error) -> Self {
        if is_connection_refused(&err) {
            ProbeError::Refused(err)
        } else {
            ProbeError::Transport(err)
        }
    }
}

/// Walk the source chain looking for a refused TCP connect.
fn is_connection_refused(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = e.source();
    }
    false
}

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(pool: Arc<BackendPool>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            pool,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        // First sweep happens one full interval after startup.
        let interval = Duration::from_secs(self.config.interval_secs);
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.check_all().await {
                        tracing::error!(error = %e, "Health check cycle aborted");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one sweep over the pool.
    ///
    /// Returns the number of backends checked. An error means the sweep
    /// stopped early; backends after the failing one were not probed.
    pub async fn check_all(&self) -> Result<usize, ProbeError> {
        let backends = self.pool.snapshot()?;
        let timeout = Duration::from_secs(self.config.timeout_secs);

        for (index, backend) in backends.iter().enumerate() {
            tracing::info!(host = %backend.host, port = backend.port, "Starting health check");

            let active = match self.probe(&backend.probe_url(&self.config.path), timeout).await {
                Ok(active) => active,
                Err(e @ ProbeError::Refused(_)) => {
                    tracing::debug!(host = %backend.host, port = backend.port, error = %e, "Backend refused health check");
                    false
                }
                Err(e @ (ProbeError::Transport(_) | ProbeError::Timeout(_))) => {
                    self.pool.mark_active(index, false)?;
                    return Err(e);
                }
                // Nothing was learned about the backend; leave it as is.
                Err(e) => return Err(e),
            };

            self.pool.mark_active(index, active)?;
            tracing::info!(
                host = %backend.host,
                port = backend.port,
                active,
                "Health check completed"
            );
        }

        Ok(backends.len())
    }

    /// Probe one backend. `Ok(true)` only for a 200 response.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<bool, ProbeError> {
        let request = Request::builder()
            .method("GET")
            .uri(url)
            .header("user-agent", "fair-proxy-health-check")
            .body(Body::empty())?;

        let deadline = Instant::now() + timeout;

        let response = match time::timeout_at(deadline, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ProbeError::from_client(e)),
            Err(_) => return Err(ProbeError::Timeout(timeout)),
        };

        let status = response.status();
        let body = Body::new(response.into_body());
        match time::timeout_at(deadline, axum::body::to_bytes(body, usize::MAX)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(ProbeError::Body(e)),
            Err(_) => return Err(ProbeError::BodyTimeout(timeout)),
        }

        if status != StatusCode::OK {
            tracing::warn!(url, status = %status, "Health check failed: non-OK status");
        }
        Ok(status == StatusCode::OK)
    }
}
