//! Minimal downstream server for trying the proxy by hand.
//!
//! ```text
//! downstream --port=9000
//! ```
//!
//! Every method and path, health probe included, gets the same fixed body.

use std::net::SocketAddr;

use axum::{routing::any, Router};
use clap::Parser;

const BODY: &str = "hello from downstream server";

#[derive(Debug, Parser)]
#[command(name = "downstream")]
#[command(about = "Fixed-response backend for manual testing", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let app = Router::new()
        .route("/", any(|| async { BODY }))
        .route("/{*path}", any(|| async { BODY }));

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("start to listen on port {}", cli.port);

    axum::serve(listener, app).await?;
    Ok(())
}
