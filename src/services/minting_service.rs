// Minting: per token type selection, chain call and lifecycle write

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::chain::{BatchLine, MintBatch};
use crate::db::{AllocationFilter, AllocationUpdate};
use crate::domain::lifecycle::{ChainStamp, Stage, Transition};
use crate::domain::minting::{eligible_candidates, select_for_minting};
use crate::domain::models::{Allocation, TokenStandard};
use crate::domain::summary::TokenTypeSummary;
use crate::domain::validation::ValidationIssue;
use crate::error::{LedgerError, LedgerResult};
use crate::handlers::AppState;
use crate::models::MintRequestLine;
use crate::services::allocation_service::list_views;
use crate::services::summary_service::project_summaries;
use crate::services::BatchReport;

/// Result of minting one token type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MintOutcome {
    pub token_type: TokenStandard,
    pub requested_amount: Decimal,
    pub minted_amount: Decimal,
    pub allocation_ids: Vec<Uuid>,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MintResponse {
    pub outcomes: Vec<MintOutcome>,
    pub total_minted: Decimal,
    pub report: BatchReport,
    pub summaries: Vec<TokenTypeSummary>,
}

fn parse_requests(requests: &[MintRequestLine]) -> LedgerResult<Vec<(TokenStandard, Decimal)>> {
    if requests.is_empty() {
        return Err(LedgerError::invalid(
            "requests",
            "",
            "at least one mint request is required",
        ));
    }

    let mut issues = Vec::new();
    let mut parsed = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let token_type = TokenStandard::from_str(&request.token_type).map_err(|message| {
            ValidationIssue::new(
                &format!("requests[{}].token_type", index),
                request.token_type.clone(),
                message,
            )
        });
        if request.amount <= Decimal::ZERO {
            issues.push(ValidationIssue::new(
                &format!("requests[{}].amount", index),
                request.amount.to_string(),
                "mint amount must be greater than zero",
            ));
        }
        match token_type {
            Ok(token_type) => parsed.push((token_type, request.amount)),
            Err(issue) => issues.push(issue),
        }
    }

    if issues.is_empty() {
        Ok(parsed)
    } else {
        Err(LedgerError::Validation(issues))
    }
}

/// Mints one token type of a project up to `requested`
pub async fn mint_token_type(
    state: &AppState,
    project_id: Uuid,
    token_type: TokenStandard,
    requested: Decimal,
) -> LedgerResult<MintOutcome> {
    if requested <= Decimal::ZERO {
        return Err(LedgerError::invalid(
            "amount",
            requested.to_string(),
            "mint amount must be greater than zero",
        ));
    }

    let filter = AllocationFilter::project(project_id).with_token_type(token_type);
    let views = list_views(state, &filter).await?;
    let selection = select_for_minting(&eligible_candidates(&views, token_type), requested);
    if selection.is_empty() {
        return Err(LedgerError::invalid(
            "token_type",
            token_type.as_str(),
            "no confirmed allocations are eligible for minting",
        ));
    }

    let selected: Vec<_> = selection
        .allocation_ids
        .iter()
        .filter_map(|id| views.iter().find(|v| v.allocation.id == *id))
        .collect();

    let batch = MintBatch {
        project_id,
        token_type,
        lines: selected
            .iter()
            .map(|view| BatchLine {
                allocation_id: view.allocation.id,
                investor_id: view.allocation.investor_id,
                amount: view.allocation.token_amount,
                wallet_address: view.wallet_address.clone(),
            })
            .collect(),
    };
    let receipt = state.chain.mint(&batch).await?;

    let now = Utc::now();
    let stamp = ChainStamp::new(now, receipt.tx_hash.clone());
    let updates = selected
        .iter()
        .map(|view| {
            let allocation = &view.allocation;
            let next = allocation
                .state
                .apply(Transition::Mint(stamp.clone()))
                .map_err(|source| LedgerError::InvalidTransition {
                    allocation_id: allocation.id,
                    source,
                })?;
            Ok(AllocationUpdate {
                expected: Stage::Confirmed,
                allocation: Allocation {
                    state: next,
                    updated_at: now,
                    ..allocation.clone()
                },
            })
        })
        .collect::<LedgerResult<Vec<_>>>()?;

    if let Err(e) = state.store.apply_allocation_updates(updates).await {
        tracing::error!(
            "Mint {} for project {} was submitted but not recorded: {}",
            receipt.tx_hash,
            project_id,
            e
        );
        return Err(e.into());
    }

    tracing::info!(
        "Minted {} {} across {} allocation(s) for project {} (requested {}): {}",
        selection.total_amount,
        token_type,
        selection.allocation_ids.len(),
        project_id,
        requested,
        receipt.tx_hash
    );

    Ok(MintOutcome {
        token_type,
        requested_amount: requested,
        minted_amount: selection.total_amount,
        allocation_ids: selection.allocation_ids,
        tx_hash: receipt.tx_hash,
    })
}

/// Processes each requested token type in turn. A failing type is recorded
/// in the report and the remaining types still run.
pub async fn mint(
    state: &AppState,
    project_id: Uuid,
    requests: &[MintRequestLine],
) -> LedgerResult<MintResponse> {
    let requests = parse_requests(requests)?;

    let mut outcomes = Vec::new();
    let mut report = BatchReport::default();
    for (token_type, amount) in requests {
        match mint_token_type(state, project_id, token_type, amount).await {
            Ok(outcome) => {
                report.record_success();
                outcomes.push(outcome);
            }
            Err(e) => {
                tracing::warn!("Minting {} for project {} failed: {}", token_type, project_id, e);
                report.record_failure(token_type, &e);
            }
        }
    }

    let total_minted: Decimal = outcomes.iter().map(|o| o.minted_amount).sum();
    // Minted types are already committed; a failed refresh must not hide them
    let summaries = match project_summaries(state, project_id).await {
        Ok(summaries) => summaries,
        Err(e) => {
            tracing::error!(
                "Minted {} for project {} but could not refresh summaries: {}",
                total_minted,
                project_id,
                e
            );
            Vec::new()
        }
    };

    Ok(MintResponse {
        outcomes,
        total_minted,
        report,
        summaries,
    })
}
