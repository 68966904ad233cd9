// Bulk CSV uploads for investors and allocations

use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::bulk::{parse_allocation_csv, parse_investor_csv, InvestorRow};
use crate::domain::models::Investor;
use crate::domain::validation::ValidationIssue;
use crate::error::LedgerResult;
use crate::handlers::AppState;
use crate::services::allocation_service::{assign_allocations, NewAllocation};
use crate::services::BatchReport;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvestorImportResponse {
    pub inserted: usize,
    pub updated: usize,
    /// Rows left out of the import
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationImportResponse {
    pub created: usize,
    pub issues: Vec<ValidationIssue>,
    /// One item per subscription group
    pub subscriptions: BatchReport,
}

fn merge_row(mut investor: Investor, row: InvestorRow) -> Investor {
    let now = Utc::now();
    investor.name = row.name;
    if row.company.is_some() {
        investor.company = row.company;
    }
    if row.investor_type.is_some() {
        investor.investor_type = row.investor_type;
    }
    if row.wallet_address.is_some() {
        investor.wallet_address = row.wallet_address;
    }
    if row.notes.is_some() {
        investor.notes = row.notes;
    }
    if let Some(kyc_status) = row.kyc_status {
        if kyc_status != investor.kyc_status {
            investor.kyc_status = kyc_status;
            investor.kyc_updated_at = Some(now);
        }
    }
    investor.updated_at = now;
    investor
}

fn new_investor(row: InvestorRow) -> Investor {
    let now = Utc::now();
    Investor {
        id: Uuid::new_v4(),
        name: row.name,
        email: row.email,
        company: row.company,
        investor_type: row.investor_type,
        wallet_address: row.wallet_address,
        kyc_status: row.kyc_status.unwrap_or_default(),
        kyc_updated_at: row.kyc_status.map(|_| now),
        notes: row.notes,
        created_at: now,
        updated_at: now,
    }
}

/// Imports investors from CSV. Rows with a known email update that
/// investor, the rest are inserted; all valid rows are saved together.
pub async fn import_investors(state: &AppState, input: &str) -> LedgerResult<InvestorImportResponse> {
    let batch = parse_investor_csv(input)?;

    let emails: Vec<String> = batch.rows.iter().map(|row| row.email.clone()).collect();
    let mut existing: HashMap<String, Investor> = if emails.is_empty() {
        HashMap::new()
    } else {
        state
            .store
            .find_investors_by_email(&emails)
            .await?
            .into_iter()
            .map(|investor| (investor.email.to_ascii_lowercase(), investor))
            .collect()
    };

    let mut inserts = Vec::new();
    let mut updates = Vec::new();
    for row in batch.rows {
        match existing.remove(&row.email) {
            Some(investor) => updates.push(merge_row(investor, row)),
            None => inserts.push(new_investor(row)),
        }
    }

    let response = InvestorImportResponse {
        inserted: inserts.len(),
        updated: updates.len(),
        issues: batch.issues,
    };
    if !inserts.is_empty() || !updates.is_empty() {
        state.store.save_investor_batch(inserts, updates).await?;
    }

    tracing::info!(
        "Investor import: {} inserted, {} updated, {} row issue(s)",
        response.inserted,
        response.updated,
        response.issues.len()
    );
    Ok(response)
}

/// Imports allocations from CSV, assigning each subscription's rows in one
/// transaction. A failing subscription is reported and the others proceed.
pub async fn import_allocations(state: &AppState, input: &str) -> LedgerResult<AllocationImportResponse> {
    let batch = parse_allocation_csv(input)?;

    let mut groups: BTreeMap<Uuid, Vec<NewAllocation>> = BTreeMap::new();
    for row in batch.rows {
        groups
            .entry(row.subscription_id)
            .or_default()
            .push(NewAllocation {
                token_type: row.token_type,
                token_amount: row.token_amount,
                notes: row.notes,
            });
    }

    let mut response = AllocationImportResponse {
        issues: batch.issues,
        ..Default::default()
    };
    for (subscription_id, entries) in groups {
        match assign_allocations(state, subscription_id, entries).await {
            Ok(created) => {
                response.created += created.len();
                response.subscriptions.record_success();
            }
            Err(e) => {
                tracing::warn!(
                    "Allocation import for subscription {} failed: {}",
                    subscription_id,
                    e
                );
                response.subscriptions.record_failure(subscription_id, &e);
            }
        }
    }

    tracing::info!(
        "Allocation import: {} created across {} subscription(s), {} failed, {} row issue(s)",
        response.created,
        response.subscriptions.succeeded,
        response.subscriptions.failed,
        response.issues.len()
    );
    Ok(response)
}
