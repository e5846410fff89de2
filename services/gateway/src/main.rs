use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod chat;
mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod sanitize;
mod state;
mod validation;

use auth::{
    AuthService, JwtConfig, JwtService,
    repositories::{InMemoryUserStore, UserRepository, UserStore},
};
use common::{
    database::{DatabaseConfig, health_check, init_pool},
    storage::{S3ObjectStore, StorageConfig},
};

use crate::{
    chat::{
        ChatResponder,
        gemini::{GeminiClient, GeminiConfig},
    },
    config::ServerConfig,
    repositories::ConversationRepository,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    info!("Starting organization chat gateway");

    let server_config = ServerConfig::from_env();
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    // Credential store: Postgres when configured, process memory otherwise
    let users: Arc<dyn UserStore> = match DatabaseConfig::from_env() {
        Some(db_config) => {
            let pool = init_pool(&db_config).await?;
            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            let repository = UserRepository::new(pool);
            repository.init_schema().await?;
            Arc::new(repository)
        }
        None => {
            warn!("DATABASE_URL not set, registered users are kept in memory and lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    // Conversation storage
    let storage_config = StorageConfig::from_env();
    let object_store = S3ObjectStore::connect(&storage_config).await?;
    object_store.ensure_bucket().await?;
    info!("Using bucket {}", storage_config.bucket_name);

    let gemini = GeminiClient::new(GeminiConfig::from_env()?)?;

    let app_state = AppState {
        auth_service: AuthService::new(users, jwt_service),
        conversation_repository: ConversationRepository::new(Arc::new(object_store)),
        chat_responder: ChatResponder::new(Arc::new(gemini)),
    };

    let app = routes::create_router(app_state).layer(server_config.cors_layer()?);

    let listener = TcpListener::bind(&server_config.bind_addr).await?;
    info!("Gateway listening on {}", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
