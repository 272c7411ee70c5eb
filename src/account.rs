//! Offline key pair generation

use alloy::primitives::{hex, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use std::fmt;

/// A freshly generated key pair
///
/// The caller owns the secret. It is never logged: `Debug` redacts it.
#[derive(Clone)]
pub struct Account {
    pub address: Address,
    private_key: B256,
}

impl Account {
    pub fn private_key(&self) -> &B256 {
        &self.private_key
    }

    /// Hex-encoded secret (0x-prefixed), for handing to the caller's key store
    pub fn private_key_hex(&self) -> String {
        hex::encode_prefixed(self.private_key)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generates key pairs without touching the network
pub struct AccountFactory;

impl AccountFactory {
    pub fn create() -> Account {
        let signer = PrivateKeySigner::random();
        Account {
            address: signer.address(),
            private_key: signer.to_bytes(),
        }
    }
}
