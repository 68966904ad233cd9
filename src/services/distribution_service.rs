// Distribution of minted allocations to investor wallets

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::chain::{BatchLine, DistributionBatch};
use crate::db::AllocationUpdate;
use crate::domain::lifecycle::{ChainStamp, Stage, Transition, TransitionError};
use crate::domain::models::Allocation;
use crate::domain::validation::ValidationIssue;
use crate::error::{LedgerError, LedgerResult};
use crate::handlers::AppState;
use crate::services::allocation_service::views_for_ids;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionResponse {
    pub allocation_ids: Vec<Uuid>,
    pub distributed_amount: Decimal,
    pub tx_hash: String,
}

/// Distributes a set of minted allocations in one chain batch.
///
/// Every targeted investor must have a wallet on file and every allocation
/// must be minted; otherwise nothing is sent and nothing is written.
pub async fn distribute(state: &AppState, ids: &[Uuid]) -> LedgerResult<DistributionResponse> {
    let views = views_for_ids(state, ids).await?;

    let missing_wallets: Vec<ValidationIssue> = views
        .iter()
        .filter(|view| !view.has_wallet())
        .map(|view| {
            ValidationIssue::new(
                "wallet_address",
                view.allocation.id.to_string(),
                format!("investor {} has no wallet address", view.investor_email),
            )
        })
        .collect();
    if !missing_wallets.is_empty() {
        return Err(LedgerError::Validation(missing_wallets));
    }

    if let Some(view) = views
        .iter()
        .find(|view| view.allocation.state.stage() != Stage::Minted)
    {
        return Err(LedgerError::InvalidTransition {
            allocation_id: view.allocation.id,
            source: TransitionError {
                from: view.allocation.state.stage(),
                action: "distribute",
            },
        });
    }

    let batch = DistributionBatch {
        lines: views
            .iter()
            .map(|view| BatchLine {
                allocation_id: view.allocation.id,
                investor_id: view.allocation.investor_id,
                amount: view.allocation.token_amount,
                wallet_address: view.wallet_address.clone(),
            })
            .collect(),
    };
    let receipt = state.chain.distribute(&batch).await?;

    let now = Utc::now();
    let stamp = ChainStamp::new(now, receipt.tx_hash.clone());
    let updates = views
        .iter()
        .map(|view| {
            let allocation = &view.allocation;
            let next = allocation
                .state
                .apply(Transition::Distribute(stamp.clone()))
                .map_err(|source| LedgerError::InvalidTransition {
                    allocation_id: allocation.id,
                    source,
                })?;
            Ok(AllocationUpdate {
                expected: Stage::Minted,
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
            "Distribution {} was submitted but not recorded: {}",
            receipt.tx_hash,
            e
        );
        return Err(e.into());
    }

    let distributed_amount: Decimal = views.iter().map(|v| v.allocation.token_amount).sum();
    tracing::info!(
        "Distributed {} allocation(s) totalling {}: {}",
        views.len(),
        distributed_amount,
        receipt.tx_hash
    );

    Ok(DistributionResponse {
        allocation_ids: views.iter().map(|v| v.allocation.id).collect(),
        distributed_amount,
        tx_hash: receipt.tx_hash,
    })
}
