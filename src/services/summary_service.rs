// Token type summaries for a project

use uuid::Uuid;

use crate::domain::summary::{summarize, TokenTypeSummary};
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::services::allocation_service::project_allocations;

/// Recomputed from the stored allocations on every call
pub async fn project_summaries(state: &AppState, project_id: Uuid) -> LedgerResult<Vec<TokenTypeSummary>> {
    let views = project_allocations(state, project_id).await?;
    Ok(summarize(&views))
}
