//! Fair round-robin reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 REVERSE PROXY                │
//!     Client Request       │  ┌─────────┐    ┌──────────────┐             │
//!     ─────────────────────┼─▶│  http   │───▶│load_balancer │             │
//!                          │  │ server  │    │ pool + fair  │             │
//!                          │  └────┬────┘    │ round robin  │             │
//!                          │       │         └──────▲───────┘             │
//!                          │       ▼                │ active flags        │
//!     Client Response      │  ┌─────────┐    ┌──────┴───────┐             │
//!     ◀────────────────────┼──│ http    │    │    health    │──── probes ─┼──▶ Backends
//!                          │  │ client  │────┼──────────────┼─────────────┼──▶
//!                          │  └─────────┘    └──────────────┘             │
//!                          └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use fair_proxy::config::{load_config, ConfigOverrides, LogFormat};
use fair_proxy::http::HttpServer;
use fair_proxy::lifecycle::{signals, Shutdown};
use fair_proxy::observability::init_logging;

#[derive(Debug, Parser)]
#[command(name = "fair-proxy")]
#[command(about = "HTTP reverse proxy balancing over a static backend pool", long_about = None)]
struct Cli {
    /// Full bind address, e.g. 127.0.0.1:3000
    #[arg(long)]
    bind: Option<String>,

    /// Listen port (keeps the bind interface)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<CliLogFormat>,

    /// Disable periodic health checks
    #[arg(long)]
    no_health_check: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliLogFormat {
    Pretty,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(f: CliLogFormat) -> Self {
        match f {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        bind_address: cli.bind,
        port: cli.port,
        log_level: cli.log_level,
        log_format: cli.log_format.map(Into::into),
        disable_health_check: cli.no_health_check,
    };

    let config = load_config(&overrides)?;
    init_logging(&config.observability)?;

    tracing::info!("fair-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_check_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );
    for backend in &config.backends {
        tracing::info!(name = %backend.name, host = %backend.host, port = backend.port, "Backend registered");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let _signals = signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
