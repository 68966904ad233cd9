// Token type summaries derived from allocation views

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::models::{AllocationView, TokenStandard};

/// Minting progress of one token type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Pending,
    ReadyToMint,
    PartiallyMinted,
    Minted,
}

/// Aggregate over all allocations of one token type within a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenTypeSummary {
    pub token_type: TokenStandard,
    pub allocation_count: usize,
    pub total_amount: Decimal,
    pub confirmed_amount: Decimal,
    pub minted_amount: Decimal,
    pub distributed_amount: Decimal,
    /// Never negative; over-minting reports zero
    pub remaining_to_mint: Decimal,
    pub status: SummaryStatus,
}

/// Derives the status; the order of the checks is significant
pub fn derive_status(confirmed_amount: Decimal, minted_amount: Decimal) -> SummaryStatus {
    let remaining = confirmed_amount - minted_amount;

    if confirmed_amount.is_zero() {
        SummaryStatus::Pending
    } else if minted_amount > Decimal::ZERO && remaining > Decimal::ZERO {
        SummaryStatus::PartiallyMinted
    } else if minted_amount > Decimal::ZERO && remaining <= Decimal::ZERO {
        SummaryStatus::Minted
    } else if confirmed_amount > Decimal::ZERO {
        SummaryStatus::ReadyToMint
    } else {
        SummaryStatus::Pending
    }
}

/// Groups allocations by token type and reduces each group
pub fn summarize(views: &[AllocationView]) -> Vec<TokenTypeSummary> {
    let mut groups: BTreeMap<TokenStandard, Vec<&AllocationView>> = BTreeMap::new();
    for view in views {
        groups
            .entry(view.allocation.token_type)
            .or_default()
            .push(view);
    }

    groups
        .into_iter()
        .map(|(token_type, rows)| summarize_group(token_type, &rows))
        .collect()
}

fn summarize_group(token_type: TokenStandard, rows: &[&AllocationView]) -> TokenTypeSummary {
    let mut total_amount = Decimal::ZERO;
    let mut confirmed_amount = Decimal::ZERO;
    let mut minted_amount = Decimal::ZERO;
    let mut distributed_amount = Decimal::ZERO;

    for view in rows {
        let amount = view.allocation.token_amount;
        let state = &view.allocation.state;

        total_amount += amount;
        if view.subscription_mintable() {
            confirmed_amount += amount;
        }
        if state.is_minted() {
            minted_amount += amount;
        }
        if state.is_distributed() {
            distributed_amount += amount;
        }
    }

    TokenTypeSummary {
        token_type,
        allocation_count: rows.len(),
        total_amount,
        confirmed_amount,
        minted_amount,
        distributed_amount,
        remaining_to_mint: (confirmed_amount - minted_amount).max(Decimal::ZERO),
        status: derive_status(confirmed_amount, minted_amount),
    }
}
