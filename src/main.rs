//! RentChat Server: renter/owner chat for the vehicle rental marketplace.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use rentchat_api::{AppState, build_app};
use rentchat_auth::{IdentityVerifier, JwtDecoder, JwtIdentityVerifier};
use rentchat_core::config::{AppConfig, LogFormat, StoreProvider};
use rentchat_core::error::AppError;
use rentchat_database::memory::{MemoryConversationStore, MemoryDirectory, MemoryMessageStore};
use rentchat_database::repositories::{
    ConversationRepository, MessageRepository, UserRepository, VehicleRepository,
};
use rentchat_database::{
    ConversationStore, DatabasePool, MessageStore, UserDirectory, VehicleCatalog,
};
use rentchat_realtime::ChatEngine;
use rentchat_service::ChatService;

#[tokio::main]
async fn main() {
    let env = std::env::var("RENTCHAT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// The stores every service runs against.
struct Stores {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    vehicles: Arc<dyn VehicleCatalog>,
    pool: Option<DatabasePool>,
}

/// Open the configured store provider, running migrations for PostgreSQL.
async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    match config.database.provider {
        StoreProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            rentchat_database::migration::run_migrations(pool.pool()).await?;

            let pg = pool.pool().clone();
            Ok(Stores {
                conversations: Arc::new(ConversationRepository::new(pg.clone())),
                messages: Arc::new(MessageRepository::new(pg.clone())),
                users: Arc::new(UserRepository::new(pg.clone())),
                vehicles: Arc::new(VehicleRepository::new(pg)),
                pool: Some(pool),
            })
        }
        StoreProvider::Memory => {
            tracing::warn!("Using in-memory stores; nothing survives a restart");
            let directory = Arc::new(MemoryDirectory::new());
            let seed = &config.database.seed;
            directory.seed(seed).await?;
            tracing::info!(
                users = seed.users.len(),
                vehicles = seed.vehicles.len(),
                "Seeded in-memory directory"
            );
            Ok(Stores {
                conversations: Arc::new(MemoryConversationStore::new()),
                messages: Arc::new(MemoryMessageStore::new()),
                users: directory.clone(),
                vehicles: directory,
                pool: None,
            })
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RentChat v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = open_stores(&config).await?;

    // ── Step 2: Identity ─────────────────────────────────────────
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(
        JwtDecoder::new(&config.auth),
        stores.users.clone(),
    ));

    // ── Step 3: Chat service ─────────────────────────────────────
    let chat = Arc::new(ChatService::new(
        stores.conversations.clone(),
        stores.messages.clone(),
        stores.users.clone(),
        stores.vehicles.clone(),
    ));

    // ── Step 4: Realtime engine ──────────────────────────────────
    let engine = ChatEngine::new(config.realtime.clone(), chat, verifier.clone());

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let grace = config.server.shutdown_grace();
    let cors = config.server.cors.clone();
    let state = AppState::new(config, verifier, engine.clone(), stores.conversations.clone());
    let app = build_app(state, &cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("RentChat server listening on {}", addr);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    // ── Step 6: Graceful shutdown ────────────────────────────────
    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        }
        finished = &mut server => {
            tracing::error!("HTTP server stopped unexpectedly");
            finished
                .map_err(|e| AppError::internal(format!("Server task failed: {}", e)))?
                .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
            return Ok(());
        }
    }

    engine.shutdown().await?;
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(result)) => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?
        }
        Ok(Err(e)) => tracing::error!("Server task failed: {}", e),
        Err(_) => tracing::warn!(
            grace_seconds = grace.as_secs(),
            "Graceful shutdown timed out, dropping remaining connections"
        ),
    }

    // ── Step 7: Release stores ───────────────────────────────────
    if let Some(pool) = stores.pool {
        pool.close().await;
    }

    tracing::info!("RentChat server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
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
}
