//! Chain capability used by minting and distribution.
//!
//! The lifecycle services only need a transaction hash back for each batch;
//! how tokens are actually created or transferred is the implementation's
//! business. [`PlaceholderChain`] fabricates hashes for bookkeeping-only
//! deployments.

mod placeholder;

pub use placeholder::PlaceholderChain;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::TokenStandard;

/// One allocation inside a chain batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchLine {
    pub allocation_id: Uuid,
    pub investor_id: Uuid,
    pub amount: Decimal,
    /// Destination wallet; always present for distributions
    pub wallet_address: Option<String>,
}

/// Tokens to create for one project and token type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MintBatch {
    pub project_id: Uuid,
    pub token_type: TokenStandard,
    pub lines: Vec<BatchLine>,
}

/// Minted tokens to transfer to investor wallets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBatch {
    pub lines: Vec<BatchLine>,
}

/// Acknowledgement of a submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReceipt {
    pub tx_hash: String,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Chain rejected batch: {0}")]
    Rejected(String),
    #[error("Chain unavailable: {0}")]
    Unavailable(String),
}

/// Minting and distribution capability
#[async_trait]
pub trait TokenChain: Send + Sync {
    async fn mint(&self, batch: &MintBatch) -> Result<ChainReceipt, ChainError>;

    async fn distribute(&self, batch: &DistributionBatch) -> Result<ChainReceipt, ChainError>;
}
