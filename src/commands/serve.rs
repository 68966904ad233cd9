use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::{header, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chain::PlaceholderChain;
use crate::config::{ApiConfig, StoreBackend};
use crate::db::{DbPool, LedgerStore, MemoryStore, PostgresStore};
use crate::handlers::{self, AppContext};

async fn build_store(config: &ApiConfig) -> Result<Arc<dyn LedgerStore>, Box<dyn Error>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let db_pool = DbPool::new(config).await?;
            tracing::info!("Connected to database");
            Ok(Arc::new(PostgresStore::new(&db_pool)))
        }
    }
}

/// Runs the HTTP API until the process is stopped
pub async fn execute(config: &ApiConfig) -> Result<(), Box<dyn Error>> {
    let store = build_store(config).await?;
    let app_state = Arc::new(AppContext::new(store, Arc::new(PlaceholderChain::new())));

    // Configure CORS policy
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::AUTHORIZATION,
        ])
        .expose_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::CONTENT_DISPOSITION,
        ])
        .max_age(Duration::from_secs(3600));

    let app = handlers::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
