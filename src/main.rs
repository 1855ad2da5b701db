// circuit-relay - Gemini relay for circuit schematics and electronics Q&A
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use circuit_relay::cli::Args;
use circuit_relay::config::AppConfig;
use circuit_relay::gemini::GeminiClient;
use circuit_relay::server::create_router;
use circuit_relay::utils::logging;
use circuit_relay::vision::DebugImageStore;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_args(&args);

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting circuit-relay v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Output directory for debug images
    let image_store = DebugImageStore::new(&config.output);

    // Phase 4: Gemini client (API key comes with each request)
    let gemini_client = GeminiClient::new(&config.gemini)?;
    info!("Gemini API base: {}", gemini_client.base_url());

    // Phase 5: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(config, Arc::new(gemini_client), image_store)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
