//! httpcord Server - Main Entry Point
//!
//! Serves an interaction endpoint with a single `/ping` command.

use anyhow::Result;
use hc_common::InteractionCallbackData;
use tokio::net::TcpListener;
use tracing::{info, warn};

use httpcord_server::config::Config;
use httpcord_server::{Connection, ConnectionContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "httpcord_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?config.transport,
        "Starting httpcord server"
    );

    let mut connection = Connection::new(config.connection_options())?;
    connection.add_interaction_handler(|ctx: ConnectionContext| async move {
        if ctx.interaction().command_name() == Some("ping") {
            ctx.reply(InteractionCallbackData::content("pong"))?;
        }
        Ok(())
    });

    let listener = TcpListener::bind(&config.bind_address).await?;

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    connection
        .serve_with_shutdown(listener, shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
