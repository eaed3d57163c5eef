mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::{DocumentService, SqliteDocumentStore};
use crate::storage::{BlobStore, LocalBlobStore};

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting document portal...");

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Initialize stores
    let blobs = Arc::new(LocalBlobStore::new(&config.storage.upload_dir));
    tracing::info!(
        "Blob store initialized (type={}, dir={})",
        blobs.storage_type(),
        config.storage.upload_dir
    );
    let store = Arc::new(SqliteDocumentStore::new(db));

    let state = AppState {
        documents: DocumentService::new(blobs, store, config.storage.max_upload_bytes),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.documents.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::health::health))
        .route("/documents", get(handlers::document::list_documents))
        .route("/documents/upload", post(handlers::document::upload_document))
        .route(
            "/documents/:id",
            get(handlers::document::download_document).delete(handlers::document::delete_document),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
