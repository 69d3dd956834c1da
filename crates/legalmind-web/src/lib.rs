//! legalmind-web - HTTP API and browser page for legalmind using Axum

pub mod error;
pub mod page;
pub mod router;
pub mod sse;

pub use router::{create_router, AppState};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Run the web server on 127.0.0.1
pub async fn run(state: AppState, port: u16) -> Result<()> {
    let router = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "Web server listening");
    println!("Web server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Web server terminated")?;

    Ok(())
}
