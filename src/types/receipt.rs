//! Receipt and token snapshot types

use alloy::primitives::{TxHash, U256};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

impl From<bool> for ReceiptStatus {
    fn from(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Reverted
        }
    }
}

/// Node-reported outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: u64,
    pub gas_used: u64,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

/// Token metadata, re-queried on every request
///
/// `total_supply` is a raw integer; the token is assumed to have zero decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
}
