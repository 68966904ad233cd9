// Handlers for the investor registry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::models::Investor;
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::models::{CreateInvestorRequest, UpdateInvestorRequest};
use crate::services::import_service::{self, InvestorImportResponse};
use crate::services::investor_service;

/// GET /investors
pub async fn list_investors(State(state): State<AppState>) -> LedgerResult<Json<Vec<Investor>>> {
    let investors = investor_service::list_investors(&state).await?;
    Ok(Json(investors))
}

/// POST /investors
pub async fn create_investor(
    State(state): State<AppState>,
    Json(request): Json<CreateInvestorRequest>,
) -> LedgerResult<(StatusCode, Json<Investor>)> {
    let investor = investor_service::create_investor(&state, request).await?;
    Ok((StatusCode::CREATED, Json(investor)))
}

/// GET /investors/{id}
pub async fn get_investor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<Investor>> {
    let investor = investor_service::get_investor(&state, id).await?;
    Ok(Json(investor))
}

/// PATCH /investors/{id}
pub async fn update_investor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvestorRequest>,
) -> LedgerResult<Json<Investor>> {
    let investor = investor_service::update_investor(&state, id, request).await?;
    Ok(Json(investor))
}

/// POST /investors/import
/// Body is the CSV text
pub async fn import_investors(
    State(state): State<AppState>,
    body: String,
) -> LedgerResult<Json<InvestorImportResponse>> {
    let response = import_service::import_investors(&state, &body).await?;
    Ok(Json(response))
}
