//! Order-management API server.
//!
//! Reads `.env` / process env (see `ServerConfig`), connects the configured
//! store, bootstraps the schema and serves until interrupted.

use oms_viewset::{app, open_backend, AppState, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("oms_viewset=info,oms_server=info,tower_http=info")
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let backend = open_backend(&config).await?;
    let router = app(AppState { backend }, config.list, config.body_limit_bytes);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("order-management API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
