use anyhow::Context;

use campusbot::{BotConfig, ChatEngine};
use campusbot_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().map_err(anyhow::Error::msg)?;
    let engine = ChatEngine::from_config(&config).context("failed to build chat engine")?;

    match engine.dataset().load() {
        Ok(count) => tracing::info!("📚 Serving {} dataset entries", count),
        Err(e) => tracing::warn!("Starting with an empty dataset: {}", e),
    }

    let app = build_router(AppState::new(engine), &config.server.frontend_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Campus chat server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
    }
}
