use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::chain::ChainError;
use crate::db::DbError;
use crate::domain::lifecycle::TransitionError;
use crate::domain::validation::ValidationIssue;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {}", describe_issues(.0))]
    Validation(Vec<ValidationIssue>),
    #[error("Allocation {allocation_id}: {source}")]
    InvalidTransition {
        allocation_id: Uuid,
        #[source]
        source: TransitionError,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Store(String),
    #[error("Integrity error: {0}")]
    Integrity(String),
    #[error("Chain error: {0}")]
    Chain(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Validation failure for a single field
    pub fn invalid(field: &str, value: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation(vec![ValidationIssue::new(field, value, message)])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::InvalidTransition { .. } | LedgerError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::Store(_) | LedgerError::Integrity(_) | LedgerError::Chain(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn describe_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = match &self {
            LedgerError::Validation(issues) => Json(json!({
                "error": self.to_string(),
                "issues": issues,
            })),
            _ => Json(json!({
                "error": self.to_string()
            })),
        };

        (status, body).into_response()
    }
}

// DbError to LedgerError conversion implementation
impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => LedgerError::NotFound(msg),
            DbError::Conflict(msg) => LedgerError::Conflict(msg),
            DbError::Integrity(msg) => LedgerError::Integrity(msg),
            DbError::ConnectionError(msg) | DbError::QueryError(msg) => LedgerError::Store(msg),
        }
    }
}

impl From<ChainError> for LedgerError {
    fn from(err: ChainError) -> Self {
        LedgerError::Chain(err.to_string())
    }
}
