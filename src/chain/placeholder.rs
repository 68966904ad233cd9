use async_trait::async_trait;
use rand::RngCore;

use crate::chain::{ChainError, ChainReceipt, DistributionBatch, MintBatch, TokenChain};

/// Records batches without touching a chain; receipts carry random
/// 32-byte hashes
#[derive(Debug, Default, Clone)]
pub struct PlaceholderChain;

impl PlaceholderChain {
    pub fn new() -> Self {
        Self
    }

    fn random_tx_hash() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("0x{}", hex::encode(bytes))
    }
}

#[async_trait]
impl TokenChain for PlaceholderChain {
    async fn mint(&self, batch: &MintBatch) -> Result<ChainReceipt, ChainError> {
        if batch.lines.is_empty() {
            return Err(ChainError::Rejected("empty mint batch".to_string()));
        }

        let tx_hash = Self::random_tx_hash();
        tracing::info!(
            "Placeholder mint of {} {} allocation(s) for project {}: {}",
            batch.lines.len(),
            batch.token_type,
            batch.project_id,
            tx_hash
        );
        Ok(ChainReceipt { tx_hash })
    }

    async fn distribute(&self, batch: &DistributionBatch) -> Result<ChainReceipt, ChainError> {
        if let Some(line) = batch.lines.iter().find(|l| l.wallet_address.is_none()) {
            return Err(ChainError::Rejected(format!(
                "allocation {} has no destination wallet",
                line.allocation_id
            )));
        }

        let tx_hash = Self::random_tx_hash();
        tracing::info!(
            "Placeholder distribution of {} allocation(s): {}",
            batch.lines.len(),
            tx_hash
        );
        Ok(ChainReceipt { tx_hash })
    }
}
