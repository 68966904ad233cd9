// Handlers Module
// This module contains the API endpoint handlers and the route table

mod allocations;
mod health;
mod investors;
mod projects;
mod subscriptions;

use axum::routing::{delete, get, post, Router};
use std::sync::Arc;

use crate::chain::{PlaceholderChain, TokenChain};
use crate::db::{LedgerStore, MemoryStore};

pub use allocations::{
    confirm_allocations, delete_allocation, distribute_allocations, import_allocations,
    update_allocation_status,
};
pub use health::health_check;
pub use investors::{create_investor, get_investor, import_investors, list_investors, update_investor};
pub use projects::{export_allocations, get_project_allocations, get_summaries, mint_tokens};
pub use subscriptions::{
    assign_allocations, confirm_subscription, create_subscription, get_subscription,
    list_subscriptions,
};

/// Capabilities shared by every request
pub struct AppContext {
    pub store: Arc<dyn LedgerStore>,
    pub chain: Arc<dyn TokenChain>,
}

impl AppContext {
    pub fn new(store: Arc<dyn LedgerStore>, chain: Arc<dyn TokenChain>) -> Self {
        Self { store, chain }
    }

    /// Process-local store with placeholder chain receipts
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(PlaceholderChain::new()))
    }
}

// Type alias for the application state
pub type AppState = Arc<AppContext>;

/// Route table; callers attach layers and state
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/investors", get(list_investors).post(create_investor))
        .route("/investors/import", post(import_investors))
        .route("/investors/{id}", get(get_investor).patch(update_investor))
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/{id}", get(get_subscription))
        .route("/subscriptions/{id}/confirm", post(confirm_subscription))
        .route("/subscriptions/{id}/allocations", post(assign_allocations))
        .route("/projects/{id}/allocations", get(get_project_allocations))
        .route("/projects/{id}/allocations/export", get(export_allocations))
        .route("/projects/{id}/summaries", get(get_summaries))
        .route("/projects/{id}/mint", post(mint_tokens))
        .route("/allocations/confirm", post(confirm_allocations))
        .route("/allocations/status", post(update_allocation_status))
        .route("/allocations/distribute", post(distribute_allocations))
        .route("/allocations/import", post(import_allocations))
        .route("/allocations/{id}", delete(delete_allocation))
}
