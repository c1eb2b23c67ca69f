use clap::Parser;
use geo_shopper::utils::{logger, validation::Validate};
use geo_shopper::{router, AppState, ServeArgs};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServeArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(args.common.verbose);
    } else {
        logger::init_logger(args.common.verbose);
    }

    tracing::info!("🚀 Starting geo-shopper");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let state = AppState::from_config(&config)?;
    let buffer = Arc::clone(&state.buffer);
    tracing::info!("🌍 {} markets available", state.search.markets().len());

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("📡 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let discarded = buffer.len().await;
    if discarded > 0 {
        tracing::warn!("⚠️ Shutting down with {} unexported buffered row(s)", discarded);
    }
    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("🛑 Shutdown signal received");
}
