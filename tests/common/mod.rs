//! In-memory ledger for end-to-end tests
//!
//! Decodes the signed payloads it receives, recovers the sender, enforces
//! nonces and native balances, and executes token calls against a tiny
//! state machine. Future nonces are queued until the gap is filled.

#![allow(dead_code)]

use alloy::consensus::{SignableTransaction, Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolInterface};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use token_engine::contracts::IToken;
use token_engine::{
    CallRequest, LedgerNode, LocalSigner, NetworkConfig, NodeError, ReceiptStatus,
    TransactionReceipt, TransferService,
};

pub const CHAIN_ID: u64 = 31337;
pub const GAS_PRICE: u128 = 1_000_000_000;
pub const TOKEN: Address = Address::repeat_byte(0x70);
pub const TOKEN_CALL_GAS: u64 = 45_000;

/// Anvil's first two well-known keys
pub const OWNER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ALICE_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub fn one_ether() -> U256 {
    U256::from(10u64).pow(U256::from(18))
}

struct Queued {
    hash: TxHash,
    from: Address,
    to: Option<Address>,
    value: U256,
    input: Bytes,
    gas_limit: u64,
    gas_price: u128,
}

#[derive(Default)]
struct Ledger {
    native: HashMap<Address, U256>,
    tokens: HashMap<Address, U256>,
    total_supply: U256,
    owner: Address,
    nonces: HashMap<Address, u64>,
    queued: BTreeMap<(Address, u64), Queued>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    block: u64,
    hold_receipts: bool,
    calls: HashMap<&'static str, usize>,
}

impl Ledger {
    fn count(&mut self, method: &'static str) {
        *self.calls.entry(method).or_default() += 1;
    }

    fn token_balance(&self, account: &Address) -> U256 {
        self.tokens.get(account).copied().unwrap_or_default()
    }

    /// Apply a token call from `from`; `Err` carries the revert reason
    fn apply_token_call(&mut self, from: Address, data: &[u8]) -> Result<(), String> {
        let call = IToken::ITokenCalls::abi_decode(data).map_err(|e| e.to_string())?;
        match call {
            IToken::ITokenCalls::transfer(c) => {
                let balance = self.token_balance(&from);
                if balance < c.amount {
                    return Err("transfer amount exceeds balance".into());
                }
                self.tokens.insert(from, balance - c.amount);
                *self.tokens.entry(c.to).or_default() += c.amount;
            }
            IToken::ITokenCalls::mint(c) => {
                if from != self.owner {
                    return Err("caller is not the owner".into());
                }
                *self.tokens.entry(c.to).or_default() += c.amount;
                self.total_supply += c.amount;
            }
            IToken::ITokenCalls::burn(c) => {
                let balance = self.token_balance(&from);
                if balance < c.amount {
                    return Err("burn amount exceeds balance".into());
                }
                self.tokens.insert(from, balance - c.amount);
                self.total_supply -= c.amount;
            }
            _ => return Err("not a state-changing call".into()),
        }
        Ok(())
    }

    fn read_token(&self, data: &[u8]) -> Result<Bytes, NodeError> {
        let call = IToken::ITokenCalls::abi_decode(data).map_err(|e| NodeError::Rpc {
            code: 3,
            message: format!("execution reverted: {e}"),
        })?;
        let encoded = match call {
            IToken::ITokenCalls::name(_) => {
                IToken::nameCall::abi_encode_returns(&"Engine Token".to_string())
            }
            IToken::ITokenCalls::symbol(_) => {
                IToken::symbolCall::abi_encode_returns(&"ENG".to_string())
            }
            IToken::ITokenCalls::decimals(_) => IToken::decimalsCall::abi_encode_returns(&0u8),
            IToken::ITokenCalls::totalSupply(_) => {
                IToken::totalSupplyCall::abi_encode_returns(&self.total_supply)
            }
            IToken::ITokenCalls::balanceOf(c) => {
                IToken::balanceOfCall::abi_encode_returns(&self.token_balance(&c.account))
            }
            _ => {
                return Err(NodeError::Rpc {
                    code: 3,
                    message: "execution reverted: write call via eth_call".into(),
                })
            }
        };
        Ok(encoded.into())
    }

    /// Mine every queued transaction whose nonce is next for its sender
    fn drain(&mut self) {
        loop {
            let ready = self
                .queued
                .keys()
                .find(|(from, nonce)| self.nonces.get(from).copied().unwrap_or_default() == *nonce)
                .copied();
            let Some(key) = ready else {
                break;
            };
            if let Some(tx) = self.queued.remove(&key) {
                self.mine(tx);
                *self.nonces.entry(key.0).or_default() += 1;
            }
        }
    }

    fn mine(&mut self, tx: Queued) {
        self.block += 1;

        let is_token = tx.to == Some(TOKEN);
        let gas_used = if is_token {
            tx.gas_limit.min(TOKEN_CALL_GAS)
        } else {
            tx.gas_limit.min(21_000)
        };
        let fee = U256::from(gas_used) * U256::from(tx.gas_price);
        let sender = self.native.entry(tx.from).or_default();
        *sender = sender.saturating_sub(fee);

        let outcome = if is_token {
            self.apply_token_call(tx.from, &tx.input)
        } else {
            match tx.to {
                Some(to) => {
                    let sender = self.native.entry(tx.from).or_default();
                    if *sender < tx.value {
                        Err("insufficient balance for value".to_string())
                    } else {
                        *sender -= tx.value;
                        *self.native.entry(to).or_default() += tx.value;
                        Ok(())
                    }
                }
                None => Err("contract creation unsupported".into()),
            }
        };

        let receipt = TransactionReceipt {
            hash: tx.hash,
            status: ReceiptStatus::from(outcome.is_ok()),
            block_number: self.block,
            gas_used,
        };
        if !self.hold_receipts {
            self.receipts.insert(tx.hash, receipt);
        }
    }
}

/// Stateful single-token ledger shared between the engine and the test
#[derive(Clone, Default)]
pub struct SimulatedLedger {
    state: Arc<Mutex<Ledger>>,
}

impl SimulatedLedger {
    pub fn new(owner: Address) -> Self {
        let ledger = Self::default();
        ledger.state.lock().unwrap().owner = owner;
        ledger
    }

    pub fn fund_native(&self, address: Address, amount: U256) {
        *self.state.lock().unwrap().native.entry(address).or_default() += amount;
    }

    pub fn fund_tokens(&self, address: Address, amount: U256) {
        let mut state = self.state.lock().unwrap();
        *state.tokens.entry(address).or_default() += amount;
        state.total_supply += amount;
    }

    /// Transactions are still mined but their receipts are never published
    pub fn hold_receipts(&self) {
        self.state.lock().unwrap().hold_receipts = true;
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or_default()
    }

    pub fn confirmed_nonce(&self, address: Address) -> u64 {
        self.state
            .lock()
            .unwrap()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn receipts(&self) -> Vec<TransactionReceipt> {
        self.state.lock().unwrap().receipts.values().cloned().collect()
    }
}

impl LedgerNode for SimulatedLedger {
    async fn block_number(&self) -> Result<u64, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_blockNumber");
        Ok(state.block)
    }

    async fn chain_id(&self) -> Result<u64, NodeError> {
        self.state.lock().unwrap().count("eth_chainId");
        Ok(CHAIN_ID)
    }

    async fn gas_price(&self) -> Result<u128, NodeError> {
        self.state.lock().unwrap().count("eth_gasPrice");
        Ok(GAS_PRICE)
    }

    async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_getBalance");
        Ok(state.native.get(&address).copied().unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_getTransactionCount");
        let confirmed = state.nonces.get(&address).copied().unwrap_or_default();
        let queued = state.queued.keys().filter(|(from, _)| *from == address).count() as u64;
        Ok(confirmed + queued)
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_call");
        if request.to != TOKEN {
            return Ok(Bytes::new());
        }
        state.read_token(&request.data)
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_estimateGas");
        if request.to != TOKEN {
            return Ok(21_000);
        }

        // Dry run against a copy of the token state
        let from = request.from.unwrap_or_default();
        let (tokens, supply) = (state.tokens.clone(), state.total_supply);
        let outcome = state.apply_token_call(from, &request.data);
        state.tokens = tokens;
        state.total_supply = supply;

        outcome
            .map(|()| TOKEN_CALL_GAS - 3_000)
            .map_err(|reason| NodeError::Rpc {
                code: 3,
                message: format!("execution reverted: {reason}"),
            })
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_sendRawTransaction");

        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).map_err(|e| NodeError::Rpc {
            code: -32602,
            message: format!("rlp: {e}"),
        })?;
        let TxEnvelope::Legacy(signed) = envelope else {
            return Err(NodeError::Rpc {
                code: -32602,
                message: "unsupported transaction type".into(),
            });
        };
        if signed.tx().chain_id != Some(CHAIN_ID) {
            return Err(NodeError::Rpc {
                code: -32000,
                message: "invalid chain id for signer".into(),
            });
        }
        let from = signed
            .signature()
            .recover_address_from_prehash(&signed.tx().signature_hash())
            .map_err(|e| NodeError::Rpc {
                code: -32000,
                message: format!("invalid sender: {e}"),
            })?;

        let tx = signed.tx();
        let expected = state.nonces.get(&from).copied().unwrap_or_default();
        if tx.nonce < expected || state.queued.contains_key(&(from, tx.nonce)) {
            return Err(NodeError::Rpc {
                code: -32000,
                message: "nonce too low".into(),
            });
        }

        let max_cost = U256::from(tx.gas_limit) * U256::from(tx.gas_price) + tx.value;
        let balance = state.native.get(&from).copied().unwrap_or_default();
        if balance < max_cost {
            return Err(NodeError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".into(),
            });
        }

        let hash = keccak256(&raw);
        state.queued.insert(
            (from, tx.nonce),
            Queued {
                hash,
                from,
                to: tx.to(),
                value: tx.value,
                input: tx.input.clone(),
                gas_limit: tx.gas_limit,
                gas_price: tx.gas_price,
            },
        );
        state.drain();

        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.count("eth_getTransactionReceipt");
        Ok(state.receipts.get(&hash).cloned())
    }
}

pub fn config() -> NetworkConfig {
    NetworkConfig::new("http://localhost:8545", TOKEN)
        .with_confirmation_timeout(Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(5))
        .with_expected_chain_id(CHAIN_ID)
}

/// Service over a fresh ledger where `OWNER_KEY` owns the token and holds ten ether
pub async fn setup() -> (TransferService<SimulatedLedger>, LocalSigner) {
    setup_with(config()).await
}

pub async fn setup_with(
    config: NetworkConfig,
) -> (TransferService<SimulatedLedger>, LocalSigner) {
    use token_engine::TransactionSigner;

    let owner = LocalSigner::from_private_key(OWNER_KEY).unwrap();
    let ledger = SimulatedLedger::new(owner.address());
    ledger.fund_native(owner.address(), one_ether() * U256::from(10));

    let service = TransferService::with_node(ledger, config).await.unwrap();
    (service, owner)
}
