//! Receipt polling and outcome classification

use crate::chain::{ChainClient, LedgerNode};
use crate::constants::MIN_POLL_INTERVAL;
use crate::error::{EngineError, FailureReason, Result};
use crate::types::{ReceiptStatus, TransactionReceipt};
use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

/// Polls the node for a receipt until one appears or the deadline passes
pub struct ConfirmationWaiter<N> {
    client: ChainClient<N>,
    poll_interval: Duration,
}

impl<N: LedgerNode> ConfirmationWaiter<N> {
    /// `poll_interval` is raised to [`MIN_POLL_INTERVAL`] if shorter
    pub fn new(client: ChainClient<N>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Wait for `hash` to be mined
    ///
    /// A successful receipt is returned. A reverted receipt fails with
    /// `TransactionFailed { reason: Reverted }`. No receipt before `deadline`
    /// fails with `TransactionFailed { reason: Timeout }`: the transaction may
    /// still be mined later, and expiry only stops local waiting.
    pub async fn wait(&self, hash: TxHash, deadline: Duration) -> Result<TransactionReceipt> {
        let polled: std::result::Result<Result<TransactionReceipt>, _> = timeout(deadline, async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match self.client.get_receipt(hash).await? {
                    Some(receipt) => return Ok(receipt),
                    None => tracing::debug!(%hash, "Transaction pending"),
                }
            }
        })
        .await;

        let receipt = match polled {
            Ok(receipt) => receipt?,
            Err(_) => {
                tracing::warn!(%hash, ?deadline, "No receipt before deadline; outcome unknown");
                return Err(EngineError::TransactionFailed {
                    reason: FailureReason::Timeout,
                    hash,
                    tx: None,
                });
            }
        };

        match receipt.status {
            ReceiptStatus::Success => {
                tracing::info!(
                    %hash,
                    block = receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Transaction confirmed"
                );
                Ok(receipt)
            }
            ReceiptStatus::Reverted => {
                tracing::warn!(%hash, block = receipt.block_number, "Transaction reverted");
                Err(EngineError::TransactionFailed {
                    reason: FailureReason::Reverted,
                    hash,
                    tx: None,
                })
            }
        }
    }
}
