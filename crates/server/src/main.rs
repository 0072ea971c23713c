//! Game server entry point.
use std::sync::Arc;

use anyhow::{Context, Result};
use game_server::{AppState, ServerConfig, logging, router};
use runtime::{
    Broadcaster, Directory, GameRuntime, GameStore, InMemoryStore, LogBroadcaster, NeynarClient,
    StaticDirectory,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    logging::init(config.log_dir.as_deref())?;

    let runtime = Arc::new(build_runtime(&config).await?);
    let app = router(AppState::new(Arc::clone(&runtime)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    match Arc::try_unwrap(runtime) {
        Ok(runtime) => runtime.shutdown().await?,
        Err(_) => tracing::warn!("Runtime still referenced at exit, skipping graceful shutdown"),
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn build_runtime(config: &ServerConfig) -> Result<GameRuntime> {
    let store = build_store(config).await?;

    let log_only: Arc<dyn Broadcaster> = Arc::new(LogBroadcaster);
    let (directory, broadcaster): (Arc<dyn Directory>, Arc<dyn Broadcaster>) = match &config.neynar {
        Some(neynar) => {
            let client = Arc::new(NeynarClient::new(neynar.clone()));
            if neynar.signer_uuid.is_some() {
                (client.clone() as Arc<dyn Directory>, client as Arc<dyn Broadcaster>)
            } else {
                tracing::info!("NEYNAR_SIGNER_UUID not set, announcements are only logged");
                (client as Arc<dyn Directory>, log_only)
            }
        }
        None => {
            tracing::warn!("NEYNAR_API_KEY not set, using an empty directory");
            (Arc::new(StaticDirectory::new()) as Arc<dyn Directory>, log_only)
        }
    };

    Ok(GameRuntime::builder()
        .config(config.runtime.clone())
        .store(store)
        .directory(directory)
        .broadcaster(broadcaster)
        .build())
}

#[cfg(feature = "redis")]
async fn build_store(config: &ServerConfig) -> Result<Arc<dyn GameStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = runtime::RedisStore::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_store(config: &ServerConfig) -> Result<Arc<dyn GameStore>> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL set but built without the `redis` feature, using in-memory store");
    } else {
        tracing::warn!("REDIS_URL not set, using in-memory store");
    }
    Ok(Arc::new(InMemoryStore::new()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
