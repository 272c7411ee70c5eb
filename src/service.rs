//! TransferService - main entry point of the engine

use crate::account::{Account, AccountFactory};
use crate::address::AddressCodec;
use crate::broadcast::Broadcaster;
use crate::builder::TransactionBuilder;
use crate::chain::{ChainClient, HttpNode, LedgerNode};
use crate::config::NetworkConfig;
use crate::confirm::ConfirmationWaiter;
use crate::constants::{format_native, NATIVE_TRANSFER_GAS};
use crate::error::{EngineError, Result};
use crate::gas::GasEstimator;
use crate::gateway::ContractGateway;
use crate::nonce::NonceSequencer;
use crate::signer::TransactionSigner;
use crate::types::{CallDescriptor, TokenInfo, TransactionReceipt, TxParams};
use alloy::primitives::{Address, TxHash, U256};

/// What a write operation sends
enum Payload {
    Native { to: Address, value: U256 },
    Call(CallDescriptor),
}

/// Composes the engine components into the public operations
///
/// Constructed once; every method is a function of its arguments plus this
/// fixed context. The only mutable state is the nonce sequencer's per-account
/// counters.
pub struct TransferService<N> {
    config: NetworkConfig,
    client: ChainClient<N>,
    token: ContractGateway<N>,
    nonces: NonceSequencer<N>,
    gas: GasEstimator<N>,
    broadcaster: Broadcaster<N>,
    waiter: ConfirmationWaiter<N>,
}

impl TransferService<HttpNode> {
    /// Connect to the configured HTTP node
    ///
    /// Fails with `Connection` if the node does not answer within the request timeout.
    pub async fn connect(config: NetworkConfig) -> Result<Self> {
        let node = HttpNode::new(&config.rpc_url, config.request_timeout)?;
        Self::with_node(node, config).await
    }
}

impl<N: LedgerNode> TransferService<N> {
    /// Build the service over any ledger node
    pub async fn with_node(node: N, config: NetworkConfig) -> Result<Self> {
        let client = ChainClient::connect(node, &config).await?;

        Ok(Self {
            token: ContractGateway::new(client.clone(), config.token_contract),
            nonces: NonceSequencer::new(client.clone()),
            gas: GasEstimator::new(client.clone()),
            broadcaster: Broadcaster::new(client.clone()),
            waiter: ConfirmationWaiter::new(client.clone(), config.poll_interval),
            client,
            config,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn chain(&self) -> &ChainClient<N> {
        &self.client
    }

    pub fn token(&self) -> &ContractGateway<N> {
        &self.token
    }

    /// Nonce counters, exposed for manual recovery after a dropped transaction
    pub fn nonces(&self) -> &NonceSequencer<N> {
        &self.nonces
    }

    // ========== Accounts ==========

    /// Generate a new key pair offline
    pub fn create_account() -> Account {
        AccountFactory::create()
    }

    /// Create an account and fund it with native gas from `funder`
    ///
    /// Waits for the funding transfer to confirm. With a zero allowance no
    /// transaction is sent.
    pub async fn open_account<S: TransactionSigner>(
        &self,
        funder: &S,
        gas_allowance: U256,
    ) -> Result<(Account, Option<TxHash>)> {
        let account = Self::create_account();
        if gas_allowance.is_zero() {
            return Ok((account, None));
        }

        let to = AddressCodec::checksum(&account.address);
        let hash = self
            .transfer_native(funder, &to, gas_allowance, true)
            .await?;

        tracing::info!(address = %account.address, %hash, "Opened and funded account");
        Ok((account, Some(hash)))
    }

    // ========== Reads ==========

    /// Native balance in wei
    pub async fn get_native_balance(&self, address: &str) -> Result<U256> {
        let address = AddressCodec::normalize(address)?;
        self.client.get_native_balance(address).await
    }

    /// Native balance in the display unit
    pub async fn get_native_balance_display(&self, address: &str) -> Result<String> {
        self.get_native_balance(address).await.map(format_native)
    }

    /// Raw token balance (no decimal scaling)
    pub async fn get_token_balance(&self, address: &str) -> Result<U256> {
        let address = AddressCodec::normalize(address)?;
        self.token.balance_of(address).await
    }

    pub async fn get_token_info(&self) -> Result<TokenInfo> {
        self.token.token_info().await
    }

    /// Receipt for `hash` if it has been mined; `None` if not (yet)
    pub async fn transaction_status(&self, hash: TxHash) -> Result<Option<TransactionReceipt>> {
        self.client.get_receipt(hash).await
    }

    /// Wait for a previously broadcast transaction using the configured timeout
    pub async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt> {
        self.waiter.wait(hash, self.config.confirmation_timeout).await
    }

    // ========== Writes ==========

    /// Send native asset
    ///
    /// Not pre-checked locally: a transfer exceeding the sender's balance is
    /// rejected by the node at broadcast.
    pub async fn transfer_native<S: TransactionSigner>(
        &self,
        signer: &S,
        to: &str,
        amount: U256,
        wait_for_confirmation: bool,
    ) -> Result<TxHash> {
        let to = AddressCodec::normalize(to)?;
        self.execute(
            signer,
            Payload::Native { to, value: amount },
            wait_for_confirmation,
        )
        .await
    }

    /// Transfer tokens from the signer to `to`
    ///
    /// The local balance check only saves gas on an obviously failing call.
    /// The balance can change before the transaction is mined; the contract
    /// is what actually enforces it.
    pub async fn transfer_token<S: TransactionSigner>(
        &self,
        signer: &S,
        to: &str,
        amount: U256,
        wait_for_confirmation: bool,
    ) -> Result<TxHash> {
        let to = AddressCodec::normalize(to)?;
        self.ensure_token_balance(signer.address(), amount).await?;

        let call = self.token.build_transfer(to, amount);
        self.execute(signer, Payload::Call(call), wait_for_confirmation)
            .await
    }

    /// Mint tokens to `to`; authorization is enforced by the contract
    pub async fn mint_token<S: TransactionSigner>(
        &self,
        owner: &S,
        to: &str,
        amount: U256,
        wait_for_confirmation: bool,
    ) -> Result<TxHash> {
        let to = AddressCodec::normalize(to)?;
        let call = self.token.build_mint(to, amount);
        self.execute(owner, Payload::Call(call), wait_for_confirmation)
            .await
    }

    /// Burn tokens held by the signer (same best-effort pre-check as transfer)
    pub async fn burn_token<S: TransactionSigner>(
        &self,
        signer: &S,
        amount: U256,
        wait_for_confirmation: bool,
    ) -> Result<TxHash> {
        self.ensure_token_balance(signer.address(), amount).await?;

        let call = self.token.build_burn(amount);
        self.execute(signer, Payload::Call(call), wait_for_confirmation)
            .await
    }

    async fn ensure_token_balance(&self, owner: Address, amount: U256) -> Result<()> {
        let available = self.token.balance_of(owner).await?;
        if available < amount {
            tracing::warn!(%owner, %amount, %available, "Insufficient token balance");
            return Err(EngineError::InsufficientFunds {
                address: owner,
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Shared write path: gas -> price/chain -> nonce -> build -> sign -> broadcast -> wait
    ///
    /// Everything that can fail without network effect runs before the nonce
    /// is taken. Errors after signing carry the transaction context; nothing
    /// is rolled back.
    async fn execute<S: TransactionSigner>(
        &self,
        signer: &S,
        payload: Payload,
        wait_for_confirmation: bool,
    ) -> Result<TxHash> {
        let from = signer.address();

        let gas_limit = match &payload {
            Payload::Native { .. } => NATIVE_TRANSFER_GAS,
            Payload::Call(call) => self.gas.estimate(call, from).await?,
        };
        let (gas_price, chain_id) =
            tokio::try_join!(self.client.get_gas_price(), self.client.get_chain_id())?;

        let nonce = self.nonces.acquire(from).await?;
        let params = TxParams {
            nonce,
            gas_limit,
            gas_price,
            chain_id,
        };

        let unsigned = match payload {
            Payload::Native { to, value } => {
                TransactionBuilder::native_transfer(from, to, value, params)
            }
            Payload::Call(call) => TransactionBuilder::contract_call(from, call, params),
        };

        let signed = signer.sign(unsigned).await.map_err(|e| {
            tracing::warn!(%from, nonce, error = %e, "Signing failed after nonce was consumed");
            e.with_consumed_nonce(from, nonce)
        })?;
        let ctx = signed.context();

        let hash = self.broadcaster.submit(&signed).await?;

        if wait_for_confirmation {
            self.waiter
                .wait(hash, self.config.confirmation_timeout)
                .await
                .map_err(|e| e.with_tx(ctx))?;
        }

        Ok(hash)
    }
}
