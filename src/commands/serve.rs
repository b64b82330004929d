//! HTTP API stage.

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;

use crate::config::Config;
use crate::routes;

// ---

/// Bind the Axum server and serve the presentation-facing API.
pub async fn run(pool: PgPool, config: Config, port: u16) -> Result<()> {
    // ---
    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(pool, config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
