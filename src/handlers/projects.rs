// Handlers for project level views, minting and export

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::domain::models::AllocationView;
use crate::domain::summary::TokenTypeSummary;
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::models::{ExportQuery, MintRequest};
use crate::services::minting_service::{self, MintResponse};
use crate::services::{allocation_service, export_service, summary_service};

/// GET /projects/{id}/allocations
pub async fn get_project_allocations(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> LedgerResult<Json<Vec<AllocationView>>> {
    let views = allocation_service::project_allocations(&state, project_id).await?;
    Ok(Json(views))
}

/// GET /projects/{id}/summaries
pub async fn get_summaries(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> LedgerResult<Json<Vec<TokenTypeSummary>>> {
    let summaries = summary_service::project_summaries(&state, project_id).await?;
    Ok(Json(summaries))
}

/// POST /projects/{id}/mint
pub async fn mint_tokens(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<MintRequest>,
) -> LedgerResult<Json<MintResponse>> {
    let response = minting_service::mint(&state, project_id, &request.requests).await?;
    Ok(Json(response))
}

/// GET /projects/{id}/allocations/export?format=csv|xlsx&full=true
pub async fn export_allocations(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(params): Query<ExportQuery>,
) -> LedgerResult<Response> {
    let file =
        export_service::export_allocations(&state, project_id, params.format, params.full).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
