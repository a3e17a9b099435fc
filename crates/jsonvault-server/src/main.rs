//! jsonvault Server - Main entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::info;

use jsonvault_server::{
    config::Config,
    features::{
        self,
        json_objects::{
            publisher::RedisJsonObjectEventPublisher, service::JsonObjectService,
            storage::PgJsonObjectStorage,
        },
        users::{
            publisher::RedisUserEventPublisher, service::UserService, storage::PgUserStorage,
        },
        FeatureState,
    },
    logging::{init_logging, LogConfig},
    middleware,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::default()
        .with_file_prefix("jsonvault-server")
        .with_filter_directives("jsonvault_server=debug,tower_http=debug,sqlx=info");

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting jsonvault server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    // Connect the event stream client
    let redis_client = redis::Client::open(config.events.redis_url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;
    info!("Event stream client connected");

    // Wire adapters into the per-resource services
    let state = FeatureState {
        json_objects: Arc::new(JsonObjectService::new(
            Arc::new(PgJsonObjectStorage::new(db_pool.clone())),
            Arc::new(RedisJsonObjectEventPublisher::new(
                redis_conn.clone(),
                config.events.json_objects_stream.clone(),
            )),
        )),
        users: Arc::new(UserService::new(
            Arc::new(PgUserStorage::new(db_pool.clone())),
            Arc::new(RedisUserEventPublisher::new(
                redis_conn,
                config.events.users_stream.clone(),
            )),
        )),
    };

    // Build the application router
    let app = create_router(state, db_pool, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: FeatureState, db: sqlx::PgPool, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(db)
        .merge(features::router(state))
        // Apply layers from innermost to outermost
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(db): State<sqlx::PgPool>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
