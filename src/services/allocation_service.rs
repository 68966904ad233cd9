// Allocation assignment, confirmation, bulk status changes and deletion

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

use crate::db::{AllocationFilter, AllocationUpdate};
use crate::domain::lifecycle::{AllocationState, Transition, TransitionError};
use crate::domain::models::{Allocation, AllocationView, TokenStandard};
use crate::domain::validation::{non_blank, ValidationIssue};
use crate::error::{LedgerError, LedgerResult};
use crate::handlers::AppState;
use crate::models::{AllocationEntry, TargetStatus};

/// Validated token type and amount for a new allocation
#[derive(Debug, Clone, PartialEq)]
pub struct NewAllocation {
    pub token_type: TokenStandard,
    pub token_amount: Decimal,
    pub notes: Option<String>,
}

/// Checks request entries, collecting every problem before failing
pub fn validate_entries(entries: &[AllocationEntry]) -> LedgerResult<Vec<NewAllocation>> {
    if entries.is_empty() {
        return Err(LedgerError::invalid(
            "allocations",
            "",
            "at least one allocation is required",
        ));
    }

    let mut issues = Vec::new();
    let mut allocations = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let token_type = match TokenStandard::from_str(&entry.token_type) {
            Ok(token_type) => Some(token_type),
            Err(message) => {
                issues.push(ValidationIssue::new(
                    &format!("allocations[{}].token_type", index),
                    entry.token_type.clone(),
                    message,
                ));
                None
            }
        };
        if entry.token_amount <= Decimal::ZERO {
            issues.push(ValidationIssue::new(
                &format!("allocations[{}].token_amount", index),
                entry.token_amount.to_string(),
                "must be greater than zero",
            ));
            continue;
        }
        if let Some(token_type) = token_type {
            allocations.push(NewAllocation {
                token_type,
                token_amount: entry.token_amount,
                notes: non_blank(entry.notes.as_deref()),
            });
        }
    }

    if issues.is_empty() {
        Ok(allocations)
    } else {
        Err(LedgerError::Validation(issues))
    }
}

/// Creates one allocation per entry against a confirmed subscription.
///
/// Entries come from [`validate_entries`] or the CSV parser, which reject
/// empty batches and non-positive amounts. When the subscription carries a
/// positive fiat amount the allocations start out confirmed. The rows and the subscription's `allocated` flag are
/// written together.
pub async fn assign_allocations(
    state: &AppState,
    subscription_id: Uuid,
    entries: Vec<NewAllocation>,
) -> LedgerResult<Vec<Allocation>> {
    let subscription = state
        .store
        .get_subscription(subscription_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("subscription {}", subscription_id)))?;

    if state
        .store
        .get_investor(subscription.investor_id)
        .await?
        .is_none()
    {
        return Err(LedgerError::NotFound(format!(
            "investor {}",
            subscription.investor_id
        )));
    }

    if !subscription.confirmed {
        return Err(LedgerError::invalid(
            "subscription_id",
            subscription_id.to_string(),
            "subscription is not confirmed",
        ));
    }

    let now = Utc::now();
    let initial = if subscription.fiat_amount > Decimal::ZERO {
        AllocationState::Confirmed {
            allocation_date: now,
        }
    } else {
        AllocationState::Pending
    };

    let allocations: Vec<Allocation> = entries
        .into_iter()
        .map(|entry| Allocation {
            id: Uuid::new_v4(),
            subscription_id,
            investor_id: subscription.investor_id,
            project_id: subscription.project_id,
            token_type: entry.token_type,
            token_amount: entry.token_amount,
            state: initial.clone(),
            notes: entry.notes,
            created_at: now,
            updated_at: now,
        })
        .collect();

    let created = state
        .store
        .create_allocations(subscription_id, allocations)
        .await?;
    tracing::info!(
        "Assigned {} allocation(s) to subscription {} ({})",
        created.len(),
        subscription_id,
        initial.stage()
    );
    Ok(created)
}

/// Loads the allocations for `ids` in request order, failing the whole
/// call if any is missing. Repeated ids are collapsed.
async fn load_allocations(state: &AppState, ids: &[Uuid]) -> LedgerResult<Vec<Allocation>> {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if ids.is_empty() {
        return Err(LedgerError::invalid(
            "allocation_ids",
            "",
            "at least one allocation id is required",
        ));
    }

    let found = state.store.get_allocations(&ids).await?;
    let mut by_id: HashMap<Uuid, Allocation> = found.into_iter().map(|a| (a.id, a)).collect();

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !by_id.contains_key(id))
        .map(Uuid::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(LedgerError::NotFound(format!(
            "allocation(s) {}",
            missing.join(", ")
        )));
    }

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Applies the same transition to every allocation. Rows the transition
/// leaves unchanged are not written; any rejected transition fails the
/// whole batch before anything is stored.
async fn transition_all(
    state: &AppState,
    ids: &[Uuid],
    transition: Transition,
    now: DateTime<Utc>,
) -> LedgerResult<Vec<Allocation>> {
    let allocations = load_allocations(state, ids).await?;

    let mut updates = Vec::new();
    let mut results = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        let next = allocation
            .state
            .apply(transition.clone())
            .map_err(|source| LedgerError::InvalidTransition {
                allocation_id: allocation.id,
                source,
            })?;

        if next == allocation.state {
            results.push(allocation);
            continue;
        }

        let expected = allocation.state.stage();
        let updated = Allocation {
            state: next,
            updated_at: now,
            ..allocation
        };
        updates.push(AllocationUpdate {
            expected,
            allocation: updated.clone(),
        });
        results.push(updated);
    }

    if !updates.is_empty() {
        let written = updates.len();
        state.store.apply_allocation_updates(updates).await?;
        tracing::info!(
            "Applied {} to {} of {} allocation(s)",
            transition.action(),
            written,
            results.len()
        );
    }
    Ok(results)
}

/// Investor sign-off: stamps `allocation_date` on pending allocations and
/// leaves already confirmed ones untouched
pub async fn confirm_allocations(state: &AppState, ids: &[Uuid]) -> LedgerResult<Vec<Allocation>> {
    let now = Utc::now();
    transition_all(state, ids, Transition::Confirm(now), now).await
}

/// Moves allocations between pending and confirmed
pub async fn set_allocation_status(
    state: &AppState,
    ids: &[Uuid],
    target: TargetStatus,
) -> LedgerResult<Vec<Allocation>> {
    let now = Utc::now();
    let transition = match target {
        TargetStatus::Pending => Transition::Unconfirm,
        TargetStatus::Confirmed => Transition::Confirm(now),
    };
    transition_all(state, ids, transition, now).await
}

/// Deletes an allocation that has not been minted
pub async fn delete_allocation(state: &AppState, id: Uuid) -> LedgerResult<()> {
    let allocation = load_allocations(state, &[id]).await?.remove(0);
    let stage = allocation.state.stage();

    if !allocation.state.is_deletable() {
        return Err(LedgerError::InvalidTransition {
            allocation_id: id,
            source: TransitionError {
                from: stage,
                action: "delete",
            },
        });
    }

    state.store.delete_allocation(id, stage).await?;
    tracing::info!("Deleted {} allocation {}", stage, id);
    Ok(())
}

/// Joins allocations with their subscription flags and investor details
pub async fn build_views(
    state: &AppState,
    allocations: Vec<Allocation>,
) -> LedgerResult<Vec<AllocationView>> {
    let subscription_ids: Vec<Uuid> = allocations
        .iter()
        .map(|a| a.subscription_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let investor_ids: Vec<Uuid> = allocations
        .iter()
        .map(|a| a.investor_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let subscriptions: HashMap<Uuid, _> = state
        .store
        .get_subscriptions(&subscription_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let investors: HashMap<Uuid, _> = state
        .store
        .get_investors(&investor_ids)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    allocations
        .into_iter()
        .map(|allocation| {
            let subscription = subscriptions.get(&allocation.subscription_id).ok_or_else(|| {
                LedgerError::Integrity(format!(
                    "allocation {} references missing subscription {}",
                    allocation.id, allocation.subscription_id
                ))
            })?;
            let investor = investors.get(&allocation.investor_id).ok_or_else(|| {
                LedgerError::Integrity(format!(
                    "allocation {} references missing investor {}",
                    allocation.id, allocation.investor_id
                ))
            })?;

            Ok(AllocationView {
                subscription_confirmed: subscription.confirmed,
                subscription_allocated: subscription.allocated,
                investor_name: investor.name.clone(),
                investor_email: investor.email.clone(),
                wallet_address: investor.wallet_address.clone(),
                allocation,
            })
        })
        .collect()
}

/// Allocation views matching `filter`, oldest first
pub async fn list_views(state: &AppState, filter: &AllocationFilter) -> LedgerResult<Vec<AllocationView>> {
    let allocations = state.store.list_allocations(filter).await?;
    build_views(state, allocations).await
}

/// Views for the given ids; any missing id fails the call
pub async fn views_for_ids(state: &AppState, ids: &[Uuid]) -> LedgerResult<Vec<AllocationView>> {
    let allocations = load_allocations(state, ids).await?;
    build_views(state, allocations).await
}

pub async fn project_allocations(state: &AppState, project_id: Uuid) -> LedgerResult<Vec<AllocationView>> {
    list_views(state, &AllocationFilter::project(project_id)).await
}
