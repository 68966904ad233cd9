// API request models

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::bulk::ExportFormat;
use crate::domain::models::KycStatus;

/// Body of POST /investors
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvestorRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    #[serde(rename = "type")]
    pub investor_type: Option<String>,
    pub wallet_address: Option<String>,
    pub kyc_status: Option<KycStatus>,
    pub notes: Option<String>,
}

/// Body of PATCH /investors/{id}. Absent fields are left alone; an empty
/// string clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvestorRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "type")]
    pub investor_type: Option<String>,
    pub wallet_address: Option<String>,
    pub kyc_status: Option<KycStatus>,
    pub notes: Option<String>,
}

/// Body of POST /subscriptions
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub investor_id: Uuid,
    pub project_id: Uuid,
    pub currency: String,
    pub fiat_amount: Decimal,
}

/// Query parameters for GET /subscriptions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionListQuery {
    pub project_id: Option<Uuid>,
}

/// One token type and amount to allocate
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationEntry {
    pub token_type: String,
    pub token_amount: Decimal,
    pub notes: Option<String>,
}

/// Body of POST /subscriptions/{id}/allocations
#[derive(Debug, Clone, Deserialize)]
pub struct AssignAllocationsRequest {
    pub allocations: Vec<AllocationEntry>,
}

/// Body of the bulk allocation endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationIdsRequest {
    pub allocation_ids: Vec<Uuid>,
}

/// Target of the bulk status tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Pending,
    Confirmed,
}

/// Body of POST /allocations/status
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub allocation_ids: Vec<Uuid>,
    pub status: TargetStatus,
}

/// Amount of one token type to mint
#[derive(Debug, Clone, Deserialize)]
pub struct MintRequestLine {
    pub token_type: String,
    pub amount: Decimal,
}

/// Body of POST /projects/{id}/mint
#[derive(Debug, Clone, Deserialize)]
pub struct MintRequest {
    pub requests: Vec<MintRequestLine>,
}

/// Query parameters for the allocation export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub full: bool,
}
