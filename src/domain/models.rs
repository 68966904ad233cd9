// Domain records shared by the store, the services and the CSV codec

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::lifecycle::AllocationState;

/// Token standards an allocation can be issued under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC-20")]
    Erc20,
    #[serde(rename = "ERC-721")]
    Erc721,
    #[serde(rename = "ERC-1155")]
    Erc1155,
    #[serde(rename = "ERC-1400")]
    Erc1400,
    #[serde(rename = "ERC-3525")]
    Erc3525,
    #[serde(rename = "ERC-4626")]
    Erc4626,
}

impl TokenStandard {
    pub const ALL: [TokenStandard; 6] = [
        TokenStandard::Erc20,
        TokenStandard::Erc721,
        TokenStandard::Erc1155,
        TokenStandard::Erc1400,
        TokenStandard::Erc3525,
        TokenStandard::Erc4626,
    ];

    /// Returns the label stored in the `token_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStandard::Erc20 => "ERC-20",
            TokenStandard::Erc721 => "ERC-721",
            TokenStandard::Erc1155 => "ERC-1155",
            TokenStandard::Erc1400 => "ERC-1400",
            TokenStandard::Erc3525 => "ERC-3525",
            TokenStandard::Erc4626 => "ERC-4626",
        }
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenStandard {
    type Err = String;

    /// Accepts `ERC-20`, `erc20` and `ERC_20` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        TokenStandard::ALL
            .into_iter()
            .find(|standard| standard.as_str().replace('-', "") == normalized)
            .ok_or_else(|| format!("unknown token type '{}'", s.trim()))
    }
}

/// KYC screening state of an investor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    NotStarted,
    Pending,
    Approved,
    Failed,
    Expired,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::NotStarted => "not_started",
            KycStatus::Pending => "pending",
            KycStatus::Approved => "approved",
            KycStatus::Failed => "failed",
            KycStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not_started" => Ok(KycStatus::NotStarted),
            "pending" => Ok(KycStatus::Pending),
            "approved" => Ok(KycStatus::Approved),
            "failed" => Ok(KycStatus::Failed),
            "expired" => Ok(KycStatus::Expired),
            other => Err(format!(
                "'{}' is not one of not_started|pending|approved|failed|expired",
                other
            )),
        }
    }
}

/// Investor onboarding record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub investor_type: Option<String>,
    pub wallet_address: Option<String>,
    pub kyc_status: KycStatus,
    pub kyc_updated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Investor {
    /// True when a non-blank wallet address is on file
    pub fn has_wallet(&self) -> bool {
        self.wallet_address
            .as_deref()
            .map_or(false, |w| !w.trim().is_empty())
    }
}

/// An investor's fiat commitment to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub investor_id: Uuid,
    pub project_id: Uuid,
    pub currency: String,
    pub fiat_amount: Decimal,
    pub confirmed: bool,
    pub allocated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Allocations against this subscription may be minted
    pub fn is_mintable(&self) -> bool {
        self.confirmed && self.allocated
    }
}

/// A quantity of one token type owed to an investor against a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub investor_id: Uuid,
    pub project_id: Uuid,
    pub token_type: TokenStandard,
    pub token_amount: Decimal,
    pub state: AllocationState,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allocation joined with the subscription flags and investor fields the
/// lifecycle rules read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationView {
    pub allocation: Allocation,
    pub subscription_confirmed: bool,
    pub subscription_allocated: bool,
    pub investor_name: String,
    pub investor_email: String,
    pub wallet_address: Option<String>,
}

impl AllocationView {
    pub fn subscription_mintable(&self) -> bool {
        self.subscription_confirmed && self.subscription_allocated
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet_address
            .as_deref()
            .map_or(false, |w| !w.trim().is_empty())
    }
}
