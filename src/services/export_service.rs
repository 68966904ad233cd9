// Allocation export downloads

use chrono::Utc;
use uuid::Uuid;

use crate::bulk::{export_filename, write_allocations_csv, ExportFormat};
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::services::allocation_service::project_allocations;

/// A rendered download
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub async fn export_allocations(
    state: &AppState,
    project_id: Uuid,
    format: ExportFormat,
    include_optional: bool,
) -> LedgerResult<ExportFile> {
    let views = project_allocations(state, project_id).await?;
    let bytes = write_allocations_csv(&views, include_optional)?;

    tracing::debug!(
        "Exported {} allocation(s) of project {} as {}",
        views.len(),
        project_id,
        format.extension()
    );

    Ok(ExportFile {
        filename: export_filename(format, Utc::now().date_naive()),
        content_type: "text/csv; charset=utf-8",
        bytes,
    })
}
