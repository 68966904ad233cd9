#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use spv_ledger_api::chain::{ChainError, ChainReceipt, DistributionBatch, MintBatch, TokenChain};
use spv_ledger_api::domain::models::{Investor, Subscription, TokenStandard};
use spv_ledger_api::handlers::{AppContext, AppState};
use spv_ledger_api::models::{CreateInvestorRequest, CreateSubscriptionRequest};
use spv_ledger_api::services::allocation_service::NewAllocation;
use spv_ledger_api::services::{investor_service, subscription_service};

pub const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

pub fn memory_state() -> AppState {
    Arc::new(AppContext::in_memory())
}

/// Same store as `state`, different chain
pub fn with_chain(state: &AppState, chain: Arc<dyn TokenChain>) -> AppState {
    Arc::new(AppContext::new(state.store.clone(), chain))
}

/// Chain whose node never answers
pub struct UnavailableChain;

#[async_trait]
impl TokenChain for UnavailableChain {
    async fn mint(&self, _batch: &MintBatch) -> Result<ChainReceipt, ChainError> {
        Err(ChainError::Unavailable("node offline".to_string()))
    }

    async fn distribute(&self, _batch: &DistributionBatch) -> Result<ChainReceipt, ChainError> {
        Err(ChainError::Unavailable("node offline".to_string()))
    }
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub async fn investor(state: &AppState, email: &str, wallet: Option<&str>) -> Investor {
    investor_service::create_investor(
        state,
        CreateInvestorRequest {
            name: format!("Investor {}", email),
            email: email.to_string(),
            company: None,
            investor_type: Some("individual".to_string()),
            wallet_address: wallet.map(str::to_string),
            kyc_status: None,
            notes: None,
        },
    )
    .await
    .unwrap()
}

/// Creates a subscription and confirms it
pub async fn confirmed_subscription(
    state: &AppState,
    investor_id: Uuid,
    project_id: Uuid,
    fiat_amount: i64,
) -> Subscription {
    let subscription = subscription_service::create_subscription(
        state,
        CreateSubscriptionRequest {
            investor_id,
            project_id,
            currency: "usd".to_string(),
            fiat_amount: dec(fiat_amount),
        },
    )
    .await
    .unwrap();
    subscription_service::confirm_subscription(state, subscription.id)
        .await
        .unwrap()
}

pub fn entry(token_type: TokenStandard, amount: i64) -> NewAllocation {
    NewAllocation {
        token_type,
        token_amount: dec(amount),
        notes: None,
    }
}

/// Keeps consecutive allocation dates apart
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
