// Services Module
// Lifecycle operations built on the store and chain capabilities

pub mod allocation_service;
pub mod distribution_service;
pub mod export_service;
pub mod health;
pub mod import_service;
pub mod investor_service;
pub mod minting_service;
pub mod subscription_service;
pub mod summary_service;

use serde::Serialize;

use crate::error::LedgerError;

/// One item of a batch that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub item: String,
    pub error: String,
}

/// Outcome of a batch whose items are processed independently
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, item: impl ToString, error: &LedgerError) {
        self.failed += 1;
        self.failures.push(BatchFailure {
            item: item.to_string(),
            error: error.to_string(),
        });
    }
}
