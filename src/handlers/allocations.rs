// Handlers for bulk allocation lifecycle operations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::models::Allocation;
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::models::{AllocationIdsRequest, StatusUpdateRequest};
use crate::services::distribution_service::{self, DistributionResponse};
use crate::services::import_service::{self, AllocationImportResponse};
use crate::services::allocation_service;

/// POST /allocations/confirm
pub async fn confirm_allocations(
    State(state): State<AppState>,
    Json(request): Json<AllocationIdsRequest>,
) -> LedgerResult<Json<Vec<Allocation>>> {
    let allocations =
        allocation_service::confirm_allocations(&state, &request.allocation_ids).await?;
    Ok(Json(allocations))
}

/// POST /allocations/status
pub async fn update_allocation_status(
    State(state): State<AppState>,
    Json(request): Json<StatusUpdateRequest>,
) -> LedgerResult<Json<Vec<Allocation>>> {
    let allocations =
        allocation_service::set_allocation_status(&state, &request.allocation_ids, request.status)
            .await?;
    Ok(Json(allocations))
}

/// POST /allocations/distribute
pub async fn distribute_allocations(
    State(state): State<AppState>,
    Json(request): Json<AllocationIdsRequest>,
) -> LedgerResult<Json<DistributionResponse>> {
    let response = distribution_service::distribute(&state, &request.allocation_ids).await?;
    Ok(Json(response))
}

/// POST /allocations/import
/// Body is the CSV text
pub async fn import_allocations(
    State(state): State<AppState>,
    body: String,
) -> LedgerResult<Json<AllocationImportResponse>> {
    let response = import_service::import_allocations(&state, &body).await?;
    Ok(Json(response))
}

/// DELETE /allocations/{id}
pub async fn delete_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> LedgerResult<StatusCode> {
    allocation_service::delete_allocation(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
