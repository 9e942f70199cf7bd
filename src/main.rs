use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use todo_api_rust::config::{AppConfig, Environment};
use todo_api_rust::database::{DatabaseManager, MemoryTodoStore, TodoRepository, TodoStore};
use todo_api_rust::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_api_rust=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every /todos request will be rejected");
    }

    let pool = match config.database.url {
        Some(_) => Some(
            DatabaseManager::connect_and_migrate(&config.database)
                .await
                .context("failed to initialise database")?,
        ),
        None if config.environment == Environment::Development => {
            tracing::warn!("DATABASE_URL is not set; using in-memory store (data is lost on exit)");
            None
        }
        None => anyhow::bail!("DATABASE_URL must be set outside development"),
    };

    let store: Arc<dyn TodoStore> = match &pool {
        Some(pool) => Arc::new(TodoRepository::new(pool.clone())),
        None => Arc::new(MemoryTodoStore::new()),
    };

    let bind_addr = config.bind_addr();
    let state = AppState::new(store, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Todo API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        DatabaseManager::close(&pool).await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
