//! Per-account nonce allocation
//!
//! Each sending address gets its own counter behind its own async mutex, so
//! concurrent sends from one account are serialized while unrelated accounts
//! never wait on each other. The counter is seeded from the node's pending
//! transaction count on first use and advances on every acquisition, whether or
//! not the transaction that received the nonce ever reaches the chain.
//!
//! If a consumed nonce is never broadcast, the node stalls later transactions
//! behind the gap. [`NonceSequencer::resync`] drops the local counter so the
//! next acquisition re-reads the node.

use crate::chain::{ChainClient, LedgerNode};
use crate::error::Result;
use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

type Slot = Arc<Mutex<Option<u64>>>;

pub struct NonceSequencer<N> {
    client: ChainClient<N>,
    slots: DashMap<Address, Slot>,
}

impl<N: LedgerNode> NonceSequencer<N> {
    pub fn new(client: ChainClient<N>) -> Self {
        Self {
            client,
            slots: DashMap::new(),
        }
    }

    fn slot(&self, address: Address) -> Slot {
        // Clone the Arc out so the map shard lock is released before awaiting
        Arc::clone(&self.slots.entry(address).or_default())
    }

    /// Hand out the next nonce for `address`
    pub async fn acquire(&self, address: Address) -> Result<u64> {
        let slot = self.slot(address);
        let mut next = slot.lock().await;

        let nonce = match *next {
            Some(nonce) => nonce,
            None => {
                let nonce = self.client.get_next_nonce(address).await?;
                tracing::debug!(%address, nonce, "Initialized nonce counter from node");
                nonce
            }
        };
        *next = Some(nonce + 1);

        Ok(nonce)
    }

    /// Next nonce that would be handed out, if the counter is initialized
    pub async fn peek(&self, address: Address) -> Option<u64> {
        let slot = self.slots.get(&address).map(|slot| Arc::clone(&slot))?;
        let next = slot.lock().await;
        *next
    }

    /// Forget the local counter; the next `acquire` re-reads the node
    ///
    /// Waits for in-flight acquisitions on the same account.
    pub async fn resync(&self, address: Address) {
        let Some(slot) = self.slots.get(&address).map(|slot| Arc::clone(&slot)) else {
            return;
        };
        let mut next = slot.lock().await;
        if let Some(stale) = next.take() {
            tracing::warn!(%address, stale, "Dropped local nonce counter");
        }
    }
}
