//! Transaction signing capability
//!
//! The engine never sees where a key lives. It hands an [`UnsignedTransaction`]
//! to a [`TransactionSigner`] and gets back a [`SignedTransaction`], so an
//! encrypted keystore or a remote signer can replace [`LocalSigner`] without
//! touching the execution path.

mod local;

pub use local::LocalSigner;

use crate::error::Result;
use crate::types::{SignedTransaction, UnsignedTransaction};
use alloy::primitives::Address;

/// Signs transactions on behalf of one account
pub trait TransactionSigner: Send + Sync {
    /// Address whose transactions this signer can authorize
    fn address(&self) -> Address;

    /// Sign `tx`, which must have `tx.from == self.address()`
    ///
    /// Fails with `InvalidKey` if the key cannot sign for the sender.
    fn sign(
        &self,
        tx: UnsignedTransaction,
    ) -> impl std::future::Future<Output = Result<SignedTransaction>> + Send;
}
