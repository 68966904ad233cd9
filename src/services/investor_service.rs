// Investor registry: onboarding records, KYC status and wallets

use chrono::Utc;
use uuid::Uuid;

use crate::domain::models::Investor;
use crate::domain::validation::{is_valid_email, is_valid_wallet_address, non_blank, ValidationIssue};
use crate::error::{LedgerError, LedgerResult};
use crate::handlers::AppState;
use crate::models::{CreateInvestorRequest, UpdateInvestorRequest};

fn check_wallet(wallet: &Option<String>, issues: &mut Vec<ValidationIssue>) {
    if let Some(wallet) = wallet {
        if !is_valid_wallet_address(wallet) {
            issues.push(ValidationIssue::new(
                "wallet_address",
                wallet.clone(),
                "must be 0x followed by 40 hex characters",
            ));
        }
    }
}

/// Registers a new investor
pub async fn create_investor(
    state: &AppState,
    request: CreateInvestorRequest,
) -> LedgerResult<Investor> {
    let mut issues = Vec::new();

    let name = non_blank(Some(request.name.as_str()));
    if name.is_none() {
        issues.push(ValidationIssue::new("name", request.name.clone(), "name is required"));
    }

    let email = request.email.trim().to_ascii_lowercase();
    if !is_valid_email(&email) {
        issues.push(ValidationIssue::new(
            "email",
            request.email.clone(),
            "not a valid email address",
        ));
    }

    let wallet_address = non_blank(request.wallet_address.as_deref());
    check_wallet(&wallet_address, &mut issues);

    if !issues.is_empty() {
        return Err(LedgerError::Validation(issues));
    }

    let existing = state
        .store
        .find_investors_by_email(std::slice::from_ref(&email))
        .await?;
    if !existing.is_empty() {
        return Err(LedgerError::invalid(
            "email",
            email,
            "an investor with this email already exists",
        ));
    }

    let now = Utc::now();
    let kyc_status = request.kyc_status.unwrap_or_default();
    let investor = Investor {
        id: Uuid::new_v4(),
        name: name.unwrap_or_default(),
        email,
        company: non_blank(request.company.as_deref()),
        investor_type: non_blank(request.investor_type.as_deref()),
        wallet_address,
        kyc_status,
        kyc_updated_at: request.kyc_status.map(|_| now),
        notes: non_blank(request.notes.as_deref()),
        created_at: now,
        updated_at: now,
    };

    let investor = state.store.insert_investor(investor).await?;
    tracing::info!("Registered investor {} ({})", investor.id, investor.email);
    Ok(investor)
}

pub async fn get_investor(state: &AppState, id: Uuid) -> LedgerResult<Investor> {
    state
        .store
        .get_investor(id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("investor {}", id)))
}

pub async fn list_investors(state: &AppState) -> LedgerResult<Vec<Investor>> {
    Ok(state.store.list_investors().await?)
}

/// Applies a partial update; `kyc_updated_at` moves only when the KYC
/// status actually changes
pub async fn update_investor(
    state: &AppState,
    id: Uuid,
    request: UpdateInvestorRequest,
) -> LedgerResult<Investor> {
    let mut investor = get_investor(state, id).await?;
    let mut issues = Vec::new();
    let now = Utc::now();

    if let Some(name) = &request.name {
        match non_blank(Some(name.as_str())) {
            Some(name) => investor.name = name,
            None => issues.push(ValidationIssue::new("name", name.clone(), "name is required")),
        }
    }
    if let Some(wallet) = &request.wallet_address {
        let wallet = non_blank(Some(wallet.as_str()));
        check_wallet(&wallet, &mut issues);
        investor.wallet_address = wallet;
    }
    if !issues.is_empty() {
        return Err(LedgerError::Validation(issues));
    }

    if let Some(company) = &request.company {
        investor.company = non_blank(Some(company.as_str()));
    }
    if let Some(investor_type) = &request.investor_type {
        investor.investor_type = non_blank(Some(investor_type.as_str()));
    }
    if let Some(notes) = &request.notes {
        investor.notes = non_blank(Some(notes.as_str()));
    }
    if let Some(kyc_status) = request.kyc_status {
        if kyc_status != investor.kyc_status {
            investor.kyc_status = kyc_status;
            investor.kyc_updated_at = Some(now);
        }
    }
    investor.updated_at = now;

    Ok(state.store.update_investor(investor).await?)
}
