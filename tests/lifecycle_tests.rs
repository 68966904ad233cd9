mod common;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use common::{
    confirmed_subscription, dec, entry, investor, memory_state, tick, with_chain,
    UnavailableChain, WALLET,
};
use spv_ledger_api::chain::PlaceholderChain;
use spv_ledger_api::db::{AllocationFilter, AllocationUpdate, DbError, LedgerStore, MemoryStore};
use spv_ledger_api::domain::lifecycle::{AllocationState, Stage};
use spv_ledger_api::domain::models::{Allocation, Investor, Subscription, TokenStandard};
use spv_ledger_api::handlers::{AppContext, AppState};
use spv_ledger_api::domain::summary::SummaryStatus;
use spv_ledger_api::error::LedgerError;
use spv_ledger_api::models::{CreateSubscriptionRequest, MintRequestLine, TargetStatus};
use spv_ledger_api::services::{
    allocation_service, distribution_service, minting_service, subscription_service,
    summary_service,
};

#[tokio::test]
async fn test_assignment_auto_confirms_and_marks_subscription_allocated() {
    let state = memory_state();
    let project = Uuid::new_v4();
    let ada = investor(&state, "ada@example.com", Some(WALLET)).await;
    let subscription = confirmed_subscription(&state, ada.id, project, 10_000).await;
    assert!(!subscription.allocated);

    let created = allocation_service::assign_allocations(
        &state,
        subscription.id,
        vec![
            entry(TokenStandard::Erc20, 1_000),
            entry(TokenStandard::Erc721, 1),
        ],
    )
    .await
    .unwrap();

    assert_eq!(created.len(), 2);
    for allocation in &created {
        assert_eq!(allocation.state.stage(), Stage::Confirmed);
        assert_eq!(allocation.investor_id, ada.id);
        assert_eq!(allocation.project_id, project);
    }

    let subscription = subscription_service::get_subscription(&state, subscription.id)
        .await
        .unwrap();
    assert!(subscription.allocated);
    assert_eq!(subscription.currency, "USD");
}

#[tokio::test]
async fn test_zero_fiat_assignment_needs_confirmation() {
    let state = memory_state();
    let ada = investor(&state, "ada@example.com", None).await;
    let subscription = confirmed_subscription(&state, ada.id, Uuid::new_v4(), 0).await;

    let created = allocation_service::assign_allocations(
        &state,
        subscription.id,
        vec![entry(TokenStandard::Erc20, 50)],
    )
    .await
    .unwrap();
    assert_eq!(created[0].state, AllocationState::Pending);

    let ids = vec![created[0].id];
    let confirmed = allocation_service::confirm_allocations(&state, &ids)
        .await
        .unwrap();
    let first_date = confirmed[0].state.allocation_date().unwrap();

    tick().await;
    let again = allocation_service::confirm_allocations(&state, &ids)
        .await
        .unwrap();
    assert_eq!(again[0].state.allocation_date(), Some(first_date));
}

#[tokio::test]
async fn test_assignment_rejected_for_unconfirmed_subscription() {
    let state = memory_state();
    let ada = investor(&state, "ada@example.com", None).await;
    let subscription = subscription_service::create_subscription(
        &state,
        CreateSubscriptionRequest {
            investor_id: ada.id,
            project_id: Uuid::new_v4(),
            currency: "EUR".to_string(),
            fiat_amount: dec(500),
        },
    )
    .await
    .unwrap();

    let err = allocation_service::assign_allocations(
        &state,
        subscription.id,
        vec![entry(TokenStandard::Erc20, 10)],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let views = allocation_service::project_allocations(&state, subscription.project_id)
        .await
        .unwrap();
    assert!(views.is_empty());
}

#[tokio::test]
async fn test_assignment_to_missing_subscription() {
    let state = memory_state();
    let err = allocation_service::assign_allocations(
        &state,
        Uuid::new_v4(),
        vec![entry(TokenStandard::Erc20, 10)],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn test_allocation_batch_is_all_or_nothing() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let ada = Investor {
        id: Uuid::new_v4(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        company: None,
        investor_type: None,
        wallet_address: None,
        kyc_status: Default::default(),
        kyc_updated_at: None,
        notes: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_investor(ada.clone()).await.unwrap();
    let subscription = Subscription {
        id: Uuid::new_v4(),
        investor_id: ada.id,
        project_id: Uuid::new_v4(),
        currency: "USD".to_string(),
        fiat_amount: dec(100),
        confirmed: true,
        allocated: false,
        created_at: now,
        updated_at: now,
    };
    store.insert_subscription(subscription.clone()).await.unwrap();

    let allocation = |amount: i64| Allocation {
        id: Uuid::new_v4(),
        subscription_id: subscription.id,
        investor_id: ada.id,
        project_id: subscription.project_id,
        token_type: TokenStandard::Erc20,
        token_amount: dec(amount),
        state: AllocationState::Pending,
        notes: None,
        created_at: now,
        updated_at: now,
    };
    let existing = allocation(10);
    store
        .create_allocations(subscription.id, vec![existing.clone()])
        .await
        .unwrap();

    // Second batch repeats an existing id and must leave no trace
    let fresh = allocation(20);
    let result = store
        .create_allocations(subscription.id, vec![fresh.clone(), existing])
        .await;
    assert!(result.is_err());
    assert!(store.get_allocations(&[fresh.id]).await.unwrap().is_empty());

    let listed = store
        .list_allocations(&AllocationFilter::project(subscription.project_id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

/// A(100) is confirmed before B(50)
async fn fifo_project(state: &AppState) -> (Uuid, Uuid, Uuid) {
    let project = Uuid::new_v4();
    let ada = investor(state, "ada@example.com", Some(WALLET)).await;
    let bob = investor(state, "bob@example.com", Some(WALLET)).await;

    let first = confirmed_subscription(state, ada.id, project, 1_000).await;
    let a = allocation_service::assign_allocations(state, first.id, vec![entry(TokenStandard::Erc20, 100)])
        .await
        .unwrap();
    tick().await;
    let second = confirmed_subscription(state, bob.id, project, 500).await;
    let b = allocation_service::assign_allocations(state, second.id, vec![entry(TokenStandard::Erc20, 50)])
        .await
        .unwrap();

    (project, a[0].id, b[0].id)
}

fn mint_line(amount: i64) -> Vec<MintRequestLine> {
    vec![MintRequestLine {
        token_type: "ERC-20".to_string(),
        amount: dec(amount),
    }]
}

#[tokio::test]
async fn test_mint_stops_before_oversized_allocation() {
    let state = memory_state();
    let (project, a, b) = fifo_project(&state).await;

    let response = minting_service::mint(&state, project, &mint_line(120))
        .await
        .unwrap();

    assert_eq!(response.report.failed, 0);
    assert_eq!(response.outcomes.len(), 1);
    let outcome = &response.outcomes[0];
    assert_eq!(outcome.allocation_ids, vec![a]);
    assert_eq!(outcome.minted_amount, dec(100));
    assert_eq!(outcome.tx_hash.len(), 66);
    assert_eq!(response.total_minted, dec(100));

    let summary = &response.summaries[0];
    assert_eq!(summary.status, SummaryStatus::PartiallyMinted);
    assert_eq!(summary.remaining_to_mint, dec(50));

    let views = allocation_service::views_for_ids(&state, &[a, b]).await.unwrap();
    assert_eq!(views[0].allocation.state.stage(), Stage::Minted);
    assert_eq!(views[1].allocation.state.stage(), Stage::Confirmed);
}

#[tokio::test]
async fn test_mint_takes_whole_allocation_past_half_budget() {
    let state = memory_state();
    let (project, a, b) = fifo_project(&state).await;

    let response = minting_service::mint(&state, project, &mint_line(130))
        .await
        .unwrap();

    let outcome = &response.outcomes[0];
    assert_eq!(outcome.allocation_ids, vec![a, b]);
    assert_eq!(outcome.minted_amount, dec(150));

    let summaries = summary_service::project_summaries(&state, project).await.unwrap();
    assert_eq!(summaries[0].status, SummaryStatus::Minted);
    assert_eq!(summaries[0].minted_amount, dec(150));
    assert_eq!(summaries[0].remaining_to_mint, Decimal::ZERO);
}

#[tokio::test]
async fn test_mint_reports_failing_token_type_and_continues() {
    let state = memory_state();
    let (project, _, _) = fifo_project(&state).await;

    let lines = vec![
        MintRequestLine {
            token_type: "ERC-1155".to_string(),
            amount: dec(10),
        },
        MintRequestLine {
            token_type: "ERC-20".to_string(),
            amount: dec(150),
        },
    ];
    let response = minting_service::mint(&state, project, &lines).await.unwrap();

    assert_eq!(response.report.succeeded, 1);
    assert_eq!(response.report.failed, 1);
    assert_eq!(response.report.failures[0].item, "ERC-1155");
    assert_eq!(response.total_minted, dec(150));
}

#[tokio::test]
async fn test_unconfirming_minted_allocation_is_rejected() {
    let state = memory_state();
    let (project, a, b) = fifo_project(&state).await;
    minting_service::mint(&state, project, &mint_line(100))
        .await
        .unwrap();

    let err = allocation_service::set_allocation_status(&state, &[b, a], TargetStatus::Pending)
        .await
        .unwrap_err();
    match err {
        LedgerError::InvalidTransition { allocation_id, source } => {
            assert_eq!(allocation_id, a);
            assert_eq!(source.from, Stage::Minted);
        }
        other => panic!("unexpected error {:?}", other),
    }

    // B was not unconfirmed either
    let views = allocation_service::views_for_ids(&state, &[a, b]).await.unwrap();
    assert!(views[0].allocation.state.allocation_date().is_some());
    assert_eq!(views[1].allocation.state.stage(), Stage::Confirmed);

    let pending = allocation_service::set_allocation_status(&state, &[b], TargetStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending[0].state, AllocationState::Pending);
}

#[tokio::test]
async fn test_confirming_minted_allocation_is_rejected() {
    let state = memory_state();
    let (project, a, _) = fifo_project(&state).await;
    minting_service::mint(&state, project, &mint_line(100))
        .await
        .unwrap();

    let err = allocation_service::confirm_allocations(&state, &[a])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_distribution_blocked_by_missing_wallet() {
    let state = memory_state();
    let project = Uuid::new_v4();

    let mut ids = Vec::new();
    for (email, wallet) in [
        ("ada@example.com", Some(WALLET)),
        ("bob@example.com", None),
        ("cy@example.com", Some(WALLET)),
    ] {
        let holder = investor(&state, email, wallet).await;
        let subscription = confirmed_subscription(&state, holder.id, project, 100).await;
        let created = allocation_service::assign_allocations(
            &state,
            subscription.id,
            vec![entry(TokenStandard::Erc20, 10)],
        )
        .await
        .unwrap();
        ids.push(created[0].id);
    }
    minting_service::mint(&state, project, &mint_line(30))
        .await
        .unwrap();

    let err = distribution_service::distribute(&state, &ids).await.unwrap_err();
    match err {
        LedgerError::Validation(issues) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].value, ids[1].to_string());
        }
        other => panic!("unexpected error {:?}", other),
    }

    let views = allocation_service::views_for_ids(&state, &ids).await.unwrap();
    assert!(views.iter().all(|v| v.allocation.state.stage() == Stage::Minted));

    // Without the walletless allocation the batch goes through
    let response = distribution_service::distribute(&state, &[ids[0], ids[2]])
        .await
        .unwrap();
    assert_eq!(response.distributed_amount, dec(20));

    let summaries = summary_service::project_summaries(&state, project).await.unwrap();
    assert_eq!(summaries[0].distributed_amount, dec(20));
}

#[tokio::test]
async fn test_distributing_unminted_allocation_is_rejected() {
    let state = memory_state();
    let (_, a, _) = fifo_project(&state).await;

    let err = distribution_service::distribute(&state, &[a]).await.unwrap_err();
    match err {
        LedgerError::InvalidTransition { source, .. } => {
            assert_eq!(source.from, Stage::Confirmed);
            assert_eq!(source.action, "distribute");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_distribution_of_unknown_allocation() {
    let state = memory_state();
    let err = distribution_service::distribute(&state, &[Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_guards_and_allocated_flag() {
    let state = memory_state();
    let (project, a, b) = fifo_project(&state).await;
    minting_service::mint(&state, project, &mint_line(100))
        .await
        .unwrap();

    let err = allocation_service::delete_allocation(&state, a).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransition { .. }));

    let owner = allocation_service::views_for_ids(&state, &[b]).await.unwrap()[0]
        .allocation
        .subscription_id;
    allocation_service::delete_allocation(&state, b).await.unwrap();

    let subscription = subscription_service::get_subscription(&state, owner)
        .await
        .unwrap();
    assert!(!subscription.allocated);
    assert!(subscription.confirmed);

    let err = allocation_service::delete_allocation(&state, b).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

/// Two pending allocations on one zero-fiat subscription
async fn pending_pair(state: &AppState) -> Vec<Allocation> {
    let ada = investor(state, "ada@example.com", Some(WALLET)).await;
    let subscription = confirmed_subscription(state, ada.id, Uuid::new_v4(), 0).await;
    allocation_service::assign_allocations(
        state,
        subscription.id,
        vec![entry(TokenStandard::Erc20, 10), entry(TokenStandard::Erc20, 20)],
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_stale_update_batch_conflicts_without_partial_write() {
    let state = memory_state();
    let rows = pending_pair(&state).await;
    let now = Utc::now();
    let updates: Vec<AllocationUpdate> = rows
        .iter()
        .map(|row| AllocationUpdate {
            expected: Stage::Pending,
            allocation: Allocation {
                state: AllocationState::Confirmed {
                    allocation_date: now,
                },
                updated_at: now,
                ..row.clone()
            },
        })
        .collect();

    // Another writer confirms the second row first
    allocation_service::confirm_allocations(&state, &[rows[1].id])
        .await
        .unwrap();

    let result = state.store.apply_allocation_updates(updates).await;
    assert!(matches!(result, Err(DbError::Conflict(_))));

    let stored = state.store.get_allocations(&[rows[0].id]).await.unwrap();
    assert_eq!(stored[0].state, AllocationState::Pending);
}

#[tokio::test]
async fn test_delete_of_moved_allocation_conflicts() {
    let state = memory_state();
    let rows = pending_pair(&state).await;

    allocation_service::confirm_allocations(&state, &[rows[0].id])
        .await
        .unwrap();

    let result = state.store.delete_allocation(rows[0].id, Stage::Pending).await;
    assert!(matches!(result, Err(DbError::Conflict(_))));

    let stored = state.store.get_allocations(&[rows[0].id]).await.unwrap();
    assert_eq!(stored[0].state.stage(), Stage::Confirmed);
    let subscription = subscription_service::get_subscription(&state, rows[0].subscription_id)
        .await
        .unwrap();
    assert!(subscription.allocated);
}

#[tokio::test]
async fn test_unavailable_chain_leaves_allocations_confirmed() {
    let state = with_chain(&memory_state(), Arc::new(UnavailableChain));
    let (project, a, b) = fifo_project(&state).await;

    let response = minting_service::mint(&state, project, &mint_line(150))
        .await
        .unwrap();
    assert!(response.outcomes.is_empty());
    assert_eq!(response.report.failed, 1);
    assert_eq!(response.report.failures[0].item, "ERC-20");
    assert!(response.report.failures[0].error.contains("unavailable"));

    let views = allocation_service::views_for_ids(&state, &[a, b]).await.unwrap();
    assert!(views
        .iter()
        .all(|v| v.allocation.state.stage() == Stage::Confirmed));
}

#[tokio::test]
async fn test_unavailable_chain_leaves_allocations_minted() {
    let state = memory_state();
    let (project, a, b) = fifo_project(&state).await;
    minting_service::mint(&state, project, &mint_line(150))
        .await
        .unwrap();

    let offline = with_chain(&state, Arc::new(UnavailableChain));
    let err = distribution_service::distribute(&offline, &[a, b])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Chain(_)));

    let views = allocation_service::views_for_ids(&state, &[a, b]).await.unwrap();
    assert!(views
        .iter()
        .all(|v| v.allocation.state.stage() == Stage::Minted));
}

/// Memory store whose listings start failing once a lifecycle write lands
struct FailAfterWrite {
    inner: MemoryStore,
    written: AtomicBool,
}

#[async_trait]
impl LedgerStore for FailAfterWrite {
    async fn insert_investor(&self, investor: Investor) -> Result<Investor, DbError> {
        self.inner.insert_investor(investor).await
    }

    async fn update_investor(&self, investor: Investor) -> Result<Investor, DbError> {
        self.inner.update_investor(investor).await
    }

    async fn get_investor(&self, id: Uuid) -> Result<Option<Investor>, DbError> {
        self.inner.get_investor(id).await
    }

    async fn get_investors(&self, ids: &[Uuid]) -> Result<Vec<Investor>, DbError> {
        self.inner.get_investors(ids).await
    }

    async fn find_investors_by_email(&self, emails: &[String]) -> Result<Vec<Investor>, DbError> {
        self.inner.find_investors_by_email(emails).await
    }

    async fn list_investors(&self) -> Result<Vec<Investor>, DbError> {
        self.inner.list_investors().await
    }

    async fn save_investor_batch(
        &self,
        inserts: Vec<Investor>,
        updates: Vec<Investor>,
    ) -> Result<(), DbError> {
        self.inner.save_investor_batch(inserts, updates).await
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription, DbError> {
        self.inner.insert_subscription(subscription).await
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DbError> {
        self.inner.get_subscription(id).await
    }

    async fn get_subscriptions(&self, ids: &[Uuid]) -> Result<Vec<Subscription>, DbError> {
        self.inner.get_subscriptions(ids).await
    }

    async fn list_subscriptions(&self, project_id: Option<Uuid>) -> Result<Vec<Subscription>, DbError> {
        self.inner.list_subscriptions(project_id).await
    }

    async fn confirm_subscription(&self, id: Uuid, at: DateTime<Utc>) -> Result<Subscription, DbError> {
        self.inner.confirm_subscription(id, at).await
    }

    async fn create_allocations(
        &self,
        subscription_id: Uuid,
        allocations: Vec<Allocation>,
    ) -> Result<Vec<Allocation>, DbError> {
        self.inner.create_allocations(subscription_id, allocations).await
    }

    async fn get_allocations(&self, ids: &[Uuid]) -> Result<Vec<Allocation>, DbError> {
        self.inner.get_allocations(ids).await
    }

    async fn list_allocations(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, DbError> {
        if self.written.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionError("connection reset".to_string()));
        }
        self.inner.list_allocations(filter).await
    }

    async fn apply_allocation_updates(
        &self,
        updates: Vec<AllocationUpdate>,
    ) -> Result<Vec<Allocation>, DbError> {
        let written = self.inner.apply_allocation_updates(updates).await?;
        self.written.store(true, Ordering::SeqCst);
        Ok(written)
    }

    async fn delete_allocation(&self, id: Uuid, expected: Stage) -> Result<(), DbError> {
        self.inner.delete_allocation(id, expected).await
    }
}

#[tokio::test]
async fn test_mint_survives_failed_summary_refresh() {
    let store = Arc::new(FailAfterWrite {
        inner: MemoryStore::new(),
        written: AtomicBool::new(false),
    });
    let state: AppState = Arc::new(AppContext::new(store.clone(), Arc::new(PlaceholderChain::new())));
    let (project, a, _) = fifo_project(&state).await;

    let response = minting_service::mint(&state, project, &mint_line(100))
        .await
        .unwrap();
    assert_eq!(response.outcomes[0].allocation_ids, vec![a]);
    assert_eq!(response.total_minted, dec(100));
    assert!(response.summaries.is_empty());

    let stored = store.inner.get_allocations(&[a]).await.unwrap();
    assert_eq!(stored[0].state.stage(), Stage::Minted);
}
