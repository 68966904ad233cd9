// Subscription intake

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::models::Subscription;
use crate::domain::validation::{normalize_currency, ValidationIssue};
use crate::error::{LedgerError, LedgerResult};
use crate::handlers::AppState;
use crate::models::CreateSubscriptionRequest;

/// Records a fiat commitment; starts neither confirmed nor allocated
pub async fn create_subscription(
    state: &AppState,
    request: CreateSubscriptionRequest,
) -> LedgerResult<Subscription> {
    let mut issues = Vec::new();

    let currency = normalize_currency(&request.currency);
    if currency.is_none() {
        issues.push(ValidationIssue::new(
            "currency",
            request.currency.clone(),
            "must be a three letter currency code",
        ));
    }
    if request.fiat_amount < Decimal::ZERO {
        issues.push(ValidationIssue::new(
            "fiat_amount",
            request.fiat_amount.to_string(),
            "must not be negative",
        ));
    }
    if !issues.is_empty() {
        return Err(LedgerError::Validation(issues));
    }

    if state.store.get_investor(request.investor_id).await?.is_none() {
        return Err(LedgerError::NotFound(format!(
            "investor {}",
            request.investor_id
        )));
    }

    let now = Utc::now();
    let subscription = Subscription {
        id: Uuid::new_v4(),
        investor_id: request.investor_id,
        project_id: request.project_id,
        currency: currency.unwrap_or_default(),
        fiat_amount: request.fiat_amount,
        confirmed: false,
        allocated: false,
        created_at: now,
        updated_at: now,
    };

    let subscription = state.store.insert_subscription(subscription).await?;
    tracing::info!(
        "Recorded subscription {} of {} {} for project {}",
        subscription.id,
        subscription.fiat_amount,
        subscription.currency,
        subscription.project_id
    );
    Ok(subscription)
}

/// Marks the subscription confirmed; confirming twice is a no-op
pub async fn confirm_subscription(state: &AppState, id: Uuid) -> LedgerResult<Subscription> {
    Ok(state.store.confirm_subscription(id, Utc::now()).await?)
}

pub async fn get_subscription(state: &AppState, id: Uuid) -> LedgerResult<Subscription> {
    state
        .store
        .get_subscription(id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("subscription {}", id)))
}

pub async fn list_subscriptions(
    state: &AppState,
    project_id: Option<Uuid>,
) -> LedgerResult<Vec<Subscription>> {
    Ok(state.store.list_subscriptions(project_id).await?)
}
