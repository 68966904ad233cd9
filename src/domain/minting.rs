//! Selection of allocations for a mint request
//!
//! Candidates are walked oldest allocation date first against a budget equal
//! to the requested amount. An allocation that fits is taken whole. One that
//! does not fit is still taken whole when more than half of it is needed,
//! which can mint more than was requested; otherwise the walk stops there.
//! Allocations are never split.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::lifecycle::Stage;
use crate::domain::models::{AllocationView, TokenStandard};

/// Fields of an eligible allocation the selection reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintCandidate {
    pub allocation_id: Uuid,
    pub allocation_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub amount: Decimal,
}

/// Result of running the selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MintSelection {
    pub allocation_ids: Vec<Uuid>,
    pub total_amount: Decimal,
}

impl MintSelection {
    pub fn is_empty(&self) -> bool {
        self.allocation_ids.is_empty()
    }
}

/// Allocations of `token_type` that can be minted right now: the parent
/// subscription is confirmed and allocated, and the allocation itself is
/// confirmed but not minted
pub fn eligible_candidates(views: &[AllocationView], token_type: TokenStandard) -> Vec<MintCandidate> {
    views
        .iter()
        .filter(|view| view.allocation.token_type == token_type)
        .filter(|view| view.subscription_mintable())
        .filter(|view| view.allocation.state.stage() == Stage::Confirmed)
        .filter_map(|view| {
            let allocation = &view.allocation;
            allocation.state.allocation_date().map(|allocation_date| MintCandidate {
                allocation_id: allocation.id,
                allocation_date,
                created_at: allocation.created_at,
                amount: allocation.token_amount,
            })
        })
        .collect()
}

/// Greedy FIFO selection; deterministic for a given candidate set
pub fn select_for_minting(candidates: &[MintCandidate], requested: Decimal) -> MintSelection {
    let mut ordered: Vec<&MintCandidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| {
        a.allocation_date
            .cmp(&b.allocation_date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.allocation_id.cmp(&b.allocation_id))
    });

    let half = Decimal::new(5, 1);
    let mut remaining = requested;
    let mut selection = MintSelection::default();

    for candidate in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }

        if candidate.amount <= remaining {
            remaining -= candidate.amount;
        } else if remaining > candidate.amount * half {
            remaining = Decimal::ZERO;
        } else {
            break;
        }

        selection.allocation_ids.push(candidate.allocation_id);
        selection.total_amount += candidate.amount;
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(id: u128, day: i64, amount: i64) -> MintCandidate {
        let date = Utc.timestamp_opt(day * 86_400, 0).unwrap();
        MintCandidate {
            allocation_id: Uuid::from_u128(id),
            allocation_date: date,
            created_at: date,
            amount: Decimal::from(amount),
        }
    }

    #[test]
    fn test_fifo_stops_when_less_than_half_needed() {
        let candidates = vec![candidate(1, 1, 100), candidate(2, 2, 50)];
        let selection = select_for_minting(&candidates, Decimal::from(120));

        assert_eq!(selection.allocation_ids, vec![Uuid::from_u128(1)]);
        assert_eq!(selection.total_amount, Decimal::from(100));
    }

    #[test]
    fn test_over_allocates_when_more_than_half_needed() {
        let candidates = vec![candidate(1, 1, 100), candidate(2, 2, 50)];
        let selection = select_for_minting(&candidates, Decimal::from(130));

        assert_eq!(
            selection.allocation_ids,
            vec![Uuid::from_u128(1), Uuid::from_u128(2)]
        );
        assert_eq!(selection.total_amount, Decimal::from(150));
    }

    #[test]
    fn test_exactly_half_is_not_enough() {
        let candidates = vec![candidate(1, 1, 50)];
        let selection = select_for_minting(&candidates, Decimal::from(25));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_order_ignores_input_order() {
        let candidates = vec![candidate(2, 2, 50), candidate(1, 1, 100)];
        let selection = select_for_minting(&candidates, Decimal::from(100));
        assert_eq!(selection.allocation_ids, vec![Uuid::from_u128(1)]);
    }

    #[test]
    fn test_stops_at_first_oversized_candidate() {
        // C would fit, but B blocks the walk
        let candidates = vec![
            candidate(1, 1, 10),
            candidate(2, 2, 100),
            candidate(3, 3, 5),
        ];
        let selection = select_for_minting(&candidates, Decimal::from(30));
        assert_eq!(selection.allocation_ids, vec![Uuid::from_u128(1)]);
        assert_eq!(selection.total_amount, Decimal::from(10));
    }

    #[test]
    fn test_selection_is_repeatable() {
        let candidates = vec![
            candidate(3, 1, 40),
            candidate(1, 1, 40),
            candidate(2, 2, 30),
        ];
        let first = select_for_minting(&candidates, Decimal::from(95));
        let second = select_for_minting(&candidates, Decimal::from(95));
        assert_eq!(first, second);
        // Same date: id breaks the tie
        assert_eq!(first.allocation_ids[0], Uuid::from_u128(1));
    }

    #[test]
    fn test_zero_request_selects_nothing() {
        let candidates = vec![candidate(1, 1, 10)];
        assert!(select_for_minting(&candidates, Decimal::ZERO).is_empty());
    }
}
