//! Unsigned and signed transaction types

use crate::error::TxContext;
use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

/// Target contract plus ABI-encoded arguments for a state-changing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    /// Contract address
    pub to: Address,
    /// Encoded calldata (selector + arguments)
    pub data: Bytes,
    /// Function name, used in error context and logs
    pub method: &'static str,
    /// Token amount the call moves, used in error context
    pub amount: U256,
}

/// Per-transaction parameters fetched from the node and the nonce sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub nonce: u64,
    pub gas_limit: u64,
    /// Legacy gas price in wei
    pub gas_price: u128,
    pub chain_id: u64,
}

/// A fully parameterized transaction awaiting a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    /// Native value in wei
    pub value: U256,
    /// Calldata; empty for a plain value transfer
    pub data: Bytes,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub chain_id: u64,
}

impl UnsignedTransaction {
    /// EIP-155 legacy transaction for signing
    pub fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.data.clone(),
        }
    }
}

/// A signed transaction ready for submission
///
/// Holds the unsigned fields and the EIP-2718 encoded payload.
/// The payload is never re-signed: a retry needs a fresh nonce and a new signature.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    tx: UnsignedTransaction,
    hash: TxHash,
    raw: Bytes,
}

impl SignedTransaction {
    pub fn new(tx: UnsignedTransaction, hash: TxHash, raw: Bytes) -> Self {
        Self { tx, hash, raw }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Encoded payload for `eth_sendRawTransaction`
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn context(&self) -> TxContext {
        TxContext {
            from: self.tx.from,
            nonce: self.tx.nonce,
            hash: self.hash,
        }
    }
}
