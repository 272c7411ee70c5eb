//! Submission of signed payloads

use crate::chain::{ChainClient, LedgerNode, NodeError};
use crate::error::{EngineError, Result};
use crate::types::SignedTransaction;
use alloy::primitives::TxHash;

/// Sends signed transactions to the node's pending pool
pub struct Broadcaster<N> {
    client: ChainClient<N>,
}

impl<N: LedgerNode> Broadcaster<N> {
    pub fn new(client: ChainClient<N>) -> Self {
        Self { client }
    }

    /// Submit once; never re-signs or resends
    ///
    /// A JSON-RPC error from the node (underpriced, nonce too low, insufficient
    /// funds for gas * price + value) is `SubmissionRejected`. A transport
    /// failure is `Connection` with the transaction context attached, since the
    /// node may have accepted the payload before the connection broke.
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<TxHash> {
        let ctx = signed.context();

        match self.client.send_raw_transaction(signed.raw().clone()).await {
            Ok(hash) => {
                if hash != ctx.hash {
                    tracing::warn!(
                        local = %ctx.hash,
                        node = %hash,
                        "Node reported a different transaction hash"
                    );
                }
                tracing::info!(
                    from = %ctx.from,
                    nonce = ctx.nonce,
                    %hash,
                    "Broadcast transaction"
                );
                Ok(hash)
            }
            Err(NodeError::Rpc { code, message }) => {
                tracing::warn!(%ctx, code, %message, "Node rejected transaction");
                Err(EngineError::SubmissionRejected {
                    tx: ctx,
                    reason: message,
                })
            }
            Err(err) => Err(EngineError::connection("eth_sendRawTransaction", err).with_tx(ctx)),
        }
    }
}
