//! Token transaction engine
//!
//! Turns "send N units to address X" into a correctly nonced, priced, signed,
//! broadcast and confirmed transaction on an EVM chain, for the native asset
//! and one mintable/burnable token contract.
//!
//! # Features
//!
//! - Offline account creation
//! - Native and token balance queries, token metadata
//! - Native transfer, token transfer/mint/burn with optional confirmation
//! - Per-account nonce sequencing safe under concurrent requests
//! - Typed errors separating "nothing was sent" from "sent, outcome unknown"
//!
//! # Example
//!
//! ```rust,ignore
//! use token_engine::{LocalSigner, NetworkConfig, TransferService};
//! use alloy::primitives::U256;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let config = NetworkConfig::from_env()?;
//!     let service = TransferService::connect(config).await?;
//!
//!     let owner = LocalSigner::from_private_key("0x...")?;
//!     let recipient = TransferService::<token_engine::HttpNode>::create_account();
//!
//!     let hash = service
//!         .mint_token(&owner, &recipient.address.to_string(), U256::from(50), true)
//!         .await?;
//!     println!("minted in {hash}");
//!
//!     Ok(())
//! }
//! ```
//!
//! Token amounts are raw integers: the token is assumed to have zero decimals.

pub mod account;
pub mod address;
pub mod broadcast;
pub mod builder;
pub mod chain;
pub mod config;
pub mod confirm;
pub mod constants;
pub mod contracts;
pub mod error;
pub mod gas;
pub mod gateway;
pub mod nonce;
pub mod service;
pub mod signer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use account::{Account, AccountFactory};
pub use address::AddressCodec;
pub use broadcast::Broadcaster;
pub use builder::TransactionBuilder;
pub use chain::{CallRequest, ChainClient, HttpNode, LedgerNode, NodeError};
pub use config::NetworkConfig;
pub use confirm::ConfirmationWaiter;
pub use constants::{apply_gas_buffer, format_native, parse_native};
pub use error::{ConsumedNonce, EngineError, FailureReason, NetworkEffect, Result, TxContext};
pub use gas::GasEstimator;
pub use gateway::ContractGateway;
pub use nonce::NonceSequencer;
pub use service::TransferService;
pub use signer::{LocalSigner, TransactionSigner};
pub use types::{
    CallDescriptor, ReceiptStatus, SignedTransaction, TokenInfo, TransactionReceipt, TxParams,
    UnsignedTransaction,
};
