//! In-process private key signer

use super::TransactionSigner;
use crate::account::Account;
use crate::error::{EngineError, Result};
use crate::types::{SignedTransaction, UnsignedTransaction};
use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::fmt;

/// Signer holding a raw secp256k1 key in memory
///
/// Signing is deterministic (RFC 6979) and offline.
#[derive(Clone)]
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// Create a signer from a hex-encoded private key
    ///
    /// # Arguments
    ///
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let signer = LocalSigner::from_private_key("0xac09...ff80")?;
    /// ```
    pub fn from_private_key(private_key: impl AsRef<str>) -> Result<Self> {
        let key = private_key.as_ref().trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let inner: PrivateKeySigner = key
            .parse()
            .map_err(|e| EngineError::invalid_key(format!("failed to parse private key: {e}")))?;

        Ok(Self { inner })
    }

    /// Signer for an account produced by the account factory
    pub fn from_account(account: &Account) -> Result<Self> {
        let inner =
            PrivateKeySigner::from_bytes(account.private_key()).map_err(EngineError::invalid_key)?;
        Ok(Self { inner })
    }

    /// Synchronous signing, shared by the trait implementation
    pub fn sign_sync(&self, tx: UnsignedTransaction) -> Result<SignedTransaction> {
        if tx.from != self.address() {
            return Err(EngineError::invalid_key(format!(
                "key for {} cannot sign for {}",
                self.address(),
                tx.from
            )));
        }

        let legacy = tx.to_legacy();
        let signature = self
            .inner
            .sign_hash_sync(&legacy.signature_hash())
            .map_err(|e| EngineError::invalid_key(format!("signing failed: {e}")))?;

        let signed = legacy.into_signed(signature);
        let hash = *signed.hash();
        let raw = Bytes::from(TxEnvelope::from(signed).encoded_2718());

        Ok(SignedTransaction::new(tx, hash, raw))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction> {
        self.sign_sync(tx)
    }
}
