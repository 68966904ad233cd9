// Handlers for subscription intake and allocation assignment

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::models::{Allocation, Subscription};
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::models::{AssignAllocationsRequest, CreateSubscriptionRequest, SubscriptionListQuery};
use crate::services::{allocation_service, subscription_service};

/// GET /subscriptions?project_id=...
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<SubscriptionListQuery>,
) -> LedgerResult<Json<Vec<Subscription>>> {
    let subscriptions = subscription_service::list_subscriptions(&state, params.project_id).await?;
    Ok(Json(subscriptions))
}

/// POST /subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> LedgerResult<(StatusCode, Json<Subscription>)> {
    let subscription = subscription_service::create_subscription(&state, request).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// GET /subscriptions/{id}
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<Subscription>> {
    let subscription = subscription_service::get_subscription(&state, id).await?;
    Ok(Json(subscription))
}

/// POST /subscriptions/{id}/confirm
pub async fn confirm_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<Subscription>> {
    let subscription = subscription_service::confirm_subscription(&state, id).await?;
    Ok(Json(subscription))
}

/// POST /subscriptions/{id}/allocations
pub async fn assign_allocations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignAllocationsRequest>,
) -> LedgerResult<(StatusCode, Json<Vec<Allocation>>)> {
    let entries = allocation_service::validate_entries(&request.allocations)?;
    let allocations = allocation_service::assign_allocations(&state, id, entries).await?;
    Ok((StatusCode::CREATED, Json(allocations)))
}
