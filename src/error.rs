//! Error types for the transaction engine
//!
//! Every failure the engine can report is a variant of [`EngineError`]. Variants
//! carry enough context (address, amount, nonce, hash) for the caller to decide
//! whether and how to retry. Nothing in the engine retries on its own.

use alloy::primitives::{Address, TxHash, U256};
use std::fmt;
use thiserror::Error;

pub use eyre::{eyre, Context, Report};

/// Result alias used by every engine operation.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Identifies a signed transaction that has consumed a nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub from: Address,
    pub nonce: u64,
    pub hash: TxHash,
}

impl fmt::Display for TxContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} nonce {} tx {}", self.from, self.nonce, self.hash)
    }
}

/// A nonce handed out to a transaction that was never signed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumedNonce {
    pub from: Address,
    pub nonce: u64,
}

impl fmt::Display for ConsumedNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} nonce {}", self.from, self.nonce)
    }
}

/// Why a broadcast transaction did not end in a successful receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Mined with status 0.
    Reverted,
    /// No receipt observed before the deadline. The transaction may still be mined.
    Timeout,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reverted => f.write_str("reverted"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// What reached the chain before an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEffect {
    /// Rejected before anything was broadcast; funds and nonce on chain are untouched.
    None,
    /// A signed transaction may be in flight. Check its receipt before retrying.
    Unknown,
    /// The transaction was mined and reverted. Its nonce and gas are spent.
    Reverted,
}

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Node unreachable, timed out, or returned a transport-level failure.
    #[error("connection error during {operation}: {reason}{}", fmt_tx(.tx))]
    Connection {
        operation: &'static str,
        reason: String,
        tx: Option<TxContext>,
    },

    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    /// The key could not be parsed or refused to sign. Raised from the write
    /// path, `consumed` names the nonce that was taken for the transaction.
    #[error("invalid key: {reason}{}", fmt_consumed(.consumed))]
    InvalidKey {
        reason: String,
        consumed: Option<ConsumedNonce>,
    },

    /// Local pre-flight balance check failed. Nothing was sent.
    #[error("insufficient funds for {address}: required {required}, available {available}")]
    InsufficientFunds {
        address: Address,
        required: U256,
        available: U256,
    },

    /// A read call or a gas simulation reverted, or its result did not decode.
    ///
    /// `from` and `amount` are set when a write call's simulation failed.
    #[error("contract call {method} failed: {reason}{}", fmt_caller(.from, .amount))]
    ContractCall {
        method: &'static str,
        reason: String,
        from: Option<Address>,
        amount: Option<U256>,
    },

    /// The node refused a well-formed signed transaction.
    #[error("submission rejected ({tx}): {reason}")]
    SubmissionRejected { tx: TxContext, reason: String },

    #[error("transaction {hash} failed: {reason}{}", fmt_tx(.tx))]
    TransactionFailed {
        reason: FailureReason,
        hash: TxHash,
        tx: Option<TxContext>,
    },
}

fn fmt_tx(tx: &Option<TxContext>) -> String {
    tx.map(|tx| format!(" ({tx})")).unwrap_or_default()
}

fn fmt_consumed(consumed: &Option<ConsumedNonce>) -> String {
    consumed
        .map(|c| format!(" ({c} consumed)"))
        .unwrap_or_default()
}

fn fmt_caller(from: &Option<Address>, amount: &Option<U256>) -> String {
    match (from, amount) {
        (Some(from), Some(amount)) => format!(" (from {from}, amount {amount})"),
        (Some(from), None) => format!(" (from {from})"),
        (None, Some(amount)) => format!(" (amount {amount})"),
        (None, None) => String::new(),
    }
}

impl EngineError {
    pub(crate) fn connection(operation: &'static str, reason: impl fmt::Display) -> Self {
        Self::Connection {
            operation,
            reason: reason.to_string(),
            tx: None,
        }
    }

    pub(crate) fn contract_call(method: &'static str, reason: impl fmt::Display) -> Self {
        Self::ContractCall {
            method,
            reason: reason.to_string(),
            from: None,
            amount: None,
        }
    }

    pub(crate) fn invalid_key(reason: impl fmt::Display) -> Self {
        Self::InvalidKey {
            reason: reason.to_string(),
            consumed: None,
        }
    }

    /// Name the sender and amount of a write call whose simulation failed.
    pub(crate) fn with_caller(self, caller: Address, value: U256) -> Self {
        match self {
            Self::ContractCall { method, reason, .. } => Self::ContractCall {
                method,
                reason,
                from: Some(caller),
                amount: Some(value),
            },
            other => other,
        }
    }

    /// Record the nonce taken for a transaction whose signing failed.
    pub(crate) fn with_consumed_nonce(self, from: Address, nonce: u64) -> Self {
        match self {
            Self::InvalidKey { reason, .. } => Self::InvalidKey {
                reason,
                consumed: Some(ConsumedNonce { from, nonce }),
            },
            other => other,
        }
    }

    /// Attach the consumed-nonce context to errors raised after signing.
    pub(crate) fn with_tx(self, ctx: TxContext) -> Self {
        match self {
            Self::Connection {
                operation, reason, ..
            } => Self::Connection {
                operation,
                reason,
                tx: Some(ctx),
            },
            Self::TransactionFailed { reason, hash, .. } => Self::TransactionFailed {
                reason,
                hash,
                tx: Some(ctx),
            },
            other => other,
        }
    }

    /// The signed transaction this error refers to, if one was produced.
    pub fn tx_context(&self) -> Option<TxContext> {
        match self {
            Self::Connection { tx, .. } | Self::TransactionFailed { tx, .. } => *tx,
            Self::SubmissionRejected { tx, .. } => Some(*tx),
            _ => None,
        }
    }

    /// Nonce this failure used up, whether or not anything reached the node.
    pub fn consumed_nonce(&self) -> Option<ConsumedNonce> {
        match self {
            Self::InvalidKey { consumed, .. } => *consumed,
            other => other.tx_context().map(|tx| ConsumedNonce {
                from: tx.from,
                nonce: tx.nonce,
            }),
        }
    }

    /// True when a nonce was consumed but nothing reached the node.
    ///
    /// The local counter is then ahead of the chain and later sends from the
    /// account stall behind the gap until `NonceSequencer::resync` is called.
    pub fn needs_resync(&self) -> bool {
        self.network_effect() == NetworkEffect::None && self.consumed_nonce().is_some()
    }

    /// Classify what the failed operation left behind on chain.
    ///
    /// A rejected submission still reports `None`: the node never accepted the
    /// payload, although the local nonce counter has moved past it.
    pub fn network_effect(&self) -> NetworkEffect {
        match self {
            Self::TransactionFailed {
                reason: FailureReason::Reverted,
                ..
            } => NetworkEffect::Reverted,
            Self::TransactionFailed {
                reason: FailureReason::Timeout,
                ..
            } => NetworkEffect::Unknown,
            Self::Connection { tx: Some(_), .. } => NetworkEffect::Unknown,
            _ => NetworkEffect::None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::TransactionFailed {
                reason: FailureReason::Timeout,
                ..
            }
        )
    }
}
