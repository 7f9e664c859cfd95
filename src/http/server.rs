//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler on every path
//! - Wire up middleware (tracing, request ID, in-flight limit)
//! - Bind server to listener
//! - Select a backend and forward the request to it
//! - Run the health monitor next to the server

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::health::HealthMonitor;
use crate::http::request::{DownstreamRequest, RequestIdExt, RequestIdLayer};
use crate::http::response::{relay_body, ProxyError};
use crate::load_balancer::pool::{BackendPool, PoolError};

/// Failures starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid backend pool: {0}")]
    Pool(#[from] PoolError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let pool = Arc::new(BackendPool::from_config(&config.backends)?);

        // Outbound calls carry no timeout of their own.
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            pool: pool.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TraceLayer::new_for_http())
            .layer(RequestIdLayer)
    }

    /// Run the server until `shutdown` fires, then stop the health monitor.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(self.pool.clone(), self.config.health_check.clone());
        let monitor_task = tokio::spawn(monitor.run(shutdown.resubscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Err(e) = monitor_task.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared backend pool.
    pub fn pool(&self) -> Arc<BackendPool> {
        self.pool.clone()
    }
}

/// Main proxy handler.
/// Selects a backend and forwards a bare request to its base address.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().to_string();
    let meta = DownstreamRequest::from_request(&request);

    tracing::debug!(
        request_id = %request_id,
        method = %meta.method,
        accept = %meta.accept,
        user_agent = %meta.user_agent,
        content_type = %meta.content_type,
        version = ?meta.version,
        host = %meta.host,
        path = %request.uri().path(),
        "Proxying request"
    );

    match forward(&state, &meta).await {
        Ok(body) => relay_body(body),
        Err(e) => {
            tracing::warn!(request_id = %request_id, status = %e.status(), error = %e, "Request failed");
            e.into_response()
        }
    }
}

/// Pick a target and relay its body. Path, query, headers and body of the
/// inbound request are not forwarded.
async fn forward(state: &AppState, meta: &DownstreamRequest) -> Result<Bytes, ProxyError> {
    let target = state.pool.select_target()?;

    tracing::info!(host = %target.host, port = target.port, "Starting hit the target");

    let request = Request::builder()
        .method(meta.method.clone())
        .uri(target.base_url())
        .body(Body::empty())?;

    let response = state.client.request(request).await?;
    let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX).await?;

    tracing::info!(host = %target.host, port = target.port, "Hit the target completed");
    Ok(body)
}
