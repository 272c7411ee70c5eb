//! Data model shared across the engine

pub mod receipt;
pub mod transaction;

pub use receipt::{ReceiptStatus, TokenInfo, TransactionReceipt};
pub use transaction::{CallDescriptor, SignedTransaction, TxParams, UnsignedTransaction};
