//! Scripted ledger node for unit tests

use crate::chain::{CallRequest, LedgerNode, NodeError};
use crate::types::TransactionReceipt;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

struct Script {
    unreachable: bool,
    latency: Duration,
    next_nonce: u64,
    gas_price: u128,
    balance: U256,
    call_result: Result<Bytes, NodeError>,
    estimate_result: Result<u64, NodeError>,
    send_error: Option<NodeError>,
    /// Polls answered with `None` before the receipt shows up
    receipt_delay: usize,
    receipts: HashMap<TxHash, TransactionReceipt>,
    sent: VecDeque<Bytes>,
    calls: HashMap<&'static str, usize>,
}

/// Node whose answers are set up by the test
pub(crate) struct ScriptedNode {
    script: Mutex<Script>,
}

impl Default for ScriptedNode {
    fn default() -> Self {
        Self {
            script: Mutex::new(Script {
                unreachable: false,
                latency: Duration::ZERO,
                next_nonce: 0,
                gas_price: 1_000_000_000,
                balance: U256::ZERO,
                call_result: Ok(Bytes::new()),
                estimate_result: Ok(50_000),
                send_error: None,
                receipt_delay: 0,
                receipts: HashMap::new(),
                sent: VecDeque::new(),
                calls: HashMap::new(),
            }),
        }
    }
}

impl ScriptedNode {
    pub const CHAIN_ID: u64 = 31337;

    pub fn set_unreachable(&self, unreachable: bool) {
        self.script.lock().unwrap().unreachable = unreachable;
    }

    pub fn set_latency(&self, latency: Duration) {
        self.script.lock().unwrap().latency = latency;
    }

    pub fn set_next_nonce(&self, nonce: u64) {
        self.script.lock().unwrap().next_nonce = nonce;
    }

    pub fn set_call_result(&self, result: Result<Bytes, NodeError>) {
        self.script.lock().unwrap().call_result = result;
    }

    pub fn set_estimate_result(&self, result: Result<u64, NodeError>) {
        self.script.lock().unwrap().estimate_result = result;
    }

    pub fn set_send_error(&self, error: Option<NodeError>) {
        self.script.lock().unwrap().send_error = error;
    }

    pub fn set_receipt_delay(&self, polls: usize) {
        self.script.lock().unwrap().receipt_delay = polls;
    }

    pub fn insert_receipt(&self, receipt: TransactionReceipt) {
        self.script
            .lock()
            .unwrap()
            .receipts
            .insert(receipt.hash, receipt);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or_default()
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.script.lock().unwrap().sent.iter().cloned().collect()
    }

    async fn enter(&self, method: &'static str) -> Result<(), NodeError> {
        let (unreachable, latency) = {
            let mut script = self.script.lock().unwrap();
            *script.calls.entry(method).or_default() += 1;
            (script.unreachable, script.latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if unreachable {
            return Err(NodeError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

impl LedgerNode for ScriptedNode {
    async fn block_number(&self) -> Result<u64, NodeError> {
        self.enter("eth_blockNumber").await?;
        Ok(1)
    }

    async fn chain_id(&self) -> Result<u64, NodeError> {
        self.enter("eth_chainId").await?;
        Ok(Self::CHAIN_ID)
    }

    async fn gas_price(&self) -> Result<u128, NodeError> {
        self.enter("eth_gasPrice").await?;
        Ok(self.script.lock().unwrap().gas_price)
    }

    async fn balance(&self, _address: Address) -> Result<U256, NodeError> {
        self.enter("eth_getBalance").await?;
        Ok(self.script.lock().unwrap().balance)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, NodeError> {
        self.enter("eth_getTransactionCount").await?;
        Ok(self.script.lock().unwrap().next_nonce)
    }

    async fn call(&self, _request: CallRequest) -> Result<Bytes, NodeError> {
        self.enter("eth_call").await?;
        self.script.lock().unwrap().call_result.clone()
    }

    async fn estimate_gas(&self, _request: CallRequest) -> Result<u64, NodeError> {
        self.enter("eth_estimateGas").await?;
        self.script.lock().unwrap().estimate_result.clone()
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, NodeError> {
        self.enter("eth_sendRawTransaction").await?;
        let mut script = self.script.lock().unwrap();
        if let Some(err) = script.send_error.clone() {
            return Err(err);
        }
        let hash = keccak256(&raw);
        script.sent.push_back(raw);
        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        self.enter("eth_getTransactionReceipt").await?;
        let mut script = self.script.lock().unwrap();
        if script.receipt_delay > 0 {
            script.receipt_delay -= 1;
            return Ok(None);
        }
        Ok(script.receipts.get(&hash).cloned())
    }
}
