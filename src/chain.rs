//! Ledger node access
//!
//! [`LedgerNode`] is the raw JSON-RPC surface the engine consumes. [`HttpNode`]
//! implements it over alloy's HTTP provider. [`ChainClient`] wraps any node with
//! a per-request timeout and maps node failures onto [`EngineError`].

use crate::config::NetworkConfig;
use crate::error::{EngineError, Result};
use crate::types::{ReceiptStatus, TransactionReceipt};
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::http::Http;
use alloy::transports::{RpcError, TransportErrorKind};
use reqwest::Url;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`LedgerNode`]
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// Could not reach the node or the connection broke.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("node error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered but the response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Read-only call or gas simulation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

impl CallRequest {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            data: data.into(),
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    fn into_request(self) -> TransactionRequest {
        let mut request = TransactionRequest::default()
            .with_to(self.to)
            .with_input(self.data);
        if let Some(from) = self.from {
            request = request.with_from(from);
        }
        request
    }
}

/// JSON-RPC methods consumed from the ledger node
pub trait LedgerNode: Send + Sync + 'static {
    /// `eth_blockNumber`
    fn block_number(&self) -> impl Future<Output = Result<u64, NodeError>> + Send;

    /// `eth_chainId`
    fn chain_id(&self) -> impl Future<Output = Result<u64, NodeError>> + Send;

    /// `eth_gasPrice`
    fn gas_price(&self) -> impl Future<Output = Result<u128, NodeError>> + Send;

    /// `eth_getBalance` at the latest block
    fn balance(&self, address: Address)
        -> impl Future<Output = Result<U256, NodeError>> + Send;

    /// `eth_getTransactionCount` at the pending block
    fn transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<u64, NodeError>> + Send;

    /// `eth_call` at the latest block
    fn call(&self, request: CallRequest) -> impl Future<Output = Result<Bytes, NodeError>> + Send;

    /// `eth_estimateGas`
    fn estimate_gas(
        &self,
        request: CallRequest,
    ) -> impl Future<Output = Result<u64, NodeError>> + Send;

    /// `eth_sendRawTransaction`
    fn send_raw_transaction(
        &self,
        raw: Bytes,
    ) -> impl Future<Output = Result<TxHash, NodeError>> + Send;

    /// `eth_getTransactionReceipt`; `None` while the transaction is not mined
    fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, NodeError>> + Send;
}

/// Ledger node reached over HTTP JSON-RPC
pub struct HttpNode {
    provider: RootProvider<Ethereum>,
}

impl HttpNode {
    /// Build the transport. Does not contact the node.
    pub fn new(rpc_url: &str, request_timeout: Duration) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| EngineError::connection("connect", format!("invalid RPC URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| EngineError::connection("connect", e))?;

        let client = RpcClient::new(Http::with_client(http, url), false);

        // Plain provider without fillers: nonce, gas and signing are done by the engine
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_client(client);

        Ok(Self { provider })
    }
}

fn classify(err: RpcError<TransportErrorKind>) -> NodeError {
    match err {
        RpcError::ErrorResp(payload) => NodeError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        RpcError::DeserError { err, .. } => NodeError::Decode(err.to_string()),
        other => NodeError::Transport(other.to_string()),
    }
}

impl LedgerNode for HttpNode {
    async fn block_number(&self) -> Result<u64, NodeError> {
        self.provider.get_block_number().await.map_err(classify)
    }

    async fn chain_id(&self) -> Result<u64, NodeError> {
        self.provider.get_chain_id().await.map_err(classify)
    }

    async fn gas_price(&self) -> Result<u128, NodeError> {
        self.provider.get_gas_price().await.map_err(classify)
    }

    async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        self.provider.get_balance(address).await.map_err(classify)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, NodeError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(classify)
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, NodeError> {
        self.provider
            .call(request.into_request())
            .await
            .map_err(classify)
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, NodeError> {
        self.provider
            .estimate_gas(request.into_request())
            .await
            .map_err(classify)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, NodeError> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(classify)?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(classify)?;

        Ok(receipt.map(|receipt| TransactionReceipt {
            hash: receipt.transaction_hash,
            status: ReceiptStatus::from(receipt.status()),
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used,
        }))
    }
}

/// Shared handle to the ledger node with timeouts and error classification
pub struct ChainClient<N> {
    node: Arc<N>,
    request_timeout: Duration,
}

impl<N> Clone for ChainClient<N> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            request_timeout: self.request_timeout,
        }
    }
}

impl<N: LedgerNode> ChainClient<N> {
    /// Wrap a node and verify it answers within the request timeout
    ///
    /// Fails with [`EngineError::Connection`] if the node is unreachable or,
    /// when `expected_chain_id` is configured, reports a different chain.
    pub async fn connect(node: N, config: &NetworkConfig) -> Result<Self> {
        let client = Self {
            node: Arc::new(node),
            request_timeout: config.request_timeout,
        };

        let block = client
            .timed(client.node.block_number())
            .await
            .map_err(|e| EngineError::connection("eth_blockNumber", e))?;

        if let Some(expected) = config.expected_chain_id {
            let actual = client.get_chain_id().await?;
            if actual != expected {
                return Err(EngineError::connection(
                    "eth_chainId",
                    format!("chain id mismatch: expected {expected}, got {actual}"),
                ));
            }
        }

        tracing::info!(
            block,
            poa_compat = config.poa_compat,
            "Connected to ledger node"
        );

        Ok(client)
    }

    async fn timed<T>(&self, fut: impl Future<Output = Result<T, NodeError>>) -> Result<T, NodeError> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(NodeError::Timeout(self.request_timeout)),
        }
    }

    /// True if the node answers `eth_blockNumber` in time
    pub async fn is_reachable(&self) -> bool {
        self.timed(self.node.block_number()).await.is_ok()
    }

    pub async fn get_chain_id(&self) -> Result<u64> {
        self.timed(self.node.chain_id())
            .await
            .map_err(|e| EngineError::connection("eth_chainId", e))
    }

    /// Current gas price in wei. Never cached.
    pub async fn get_gas_price(&self) -> Result<u128> {
        self.timed(self.node.gas_price())
            .await
            .map_err(|e| EngineError::connection("eth_gasPrice", e))
    }

    /// Native balance in wei
    pub async fn get_native_balance(&self, address: Address) -> Result<U256> {
        self.timed(self.node.balance(address))
            .await
            .map_err(|e| EngineError::connection("eth_getBalance", e))
    }

    /// Next nonce the node expects from `address`, including pending transactions
    pub async fn get_next_nonce(&self, address: Address) -> Result<u64> {
        self.timed(self.node.transaction_count(address))
            .await
            .map_err(|e| EngineError::connection("eth_getTransactionCount", e))
    }

    /// Execute a read call; reverts and undecodable results become `ContractCall` errors
    pub async fn call(&self, method: &'static str, request: CallRequest) -> Result<Bytes> {
        self.timed(self.node.call(request))
            .await
            .map_err(|e| contract_error(method, "eth_call", e))
    }

    /// Simulate a call and return the raw gas estimate
    pub async fn estimate_gas(&self, method: &'static str, request: CallRequest) -> Result<u64> {
        self.timed(self.node.estimate_gas(request))
            .await
            .map_err(|e| contract_error(method, "eth_estimateGas", e))
    }

    /// Submit a raw payload. Classification is left to the broadcaster,
    /// which knows the transaction's nonce.
    pub async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, NodeError> {
        self.timed(self.node.send_raw_transaction(raw)).await
    }

    pub async fn get_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>> {
        self.timed(self.node.transaction_receipt(hash))
            .await
            .map_err(|e| EngineError::connection("eth_getTransactionReceipt", e))
    }

    pub fn node(&self) -> &N {
        &self.node
    }
}

fn contract_error(method: &'static str, operation: &'static str, err: NodeError) -> EngineError {
    match err {
        NodeError::Rpc { .. } | NodeError::Decode(_) => EngineError::contract_call(method, err),
        NodeError::Transport(_) | NodeError::Timeout(_) => EngineError::connection(operation, err),
    }
}
