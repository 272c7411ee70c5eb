//! Typed access to the deployed token contract

use crate::chain::{CallRequest, ChainClient, LedgerNode};
use crate::contracts::IToken;
use crate::error::{EngineError, Result};
use crate::types::{CallDescriptor, TokenInfo};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

/// Binds the token ABI to one contract address
///
/// Reads go to the node's latest state. Write builders only encode calldata.
pub struct ContractGateway<N> {
    client: ChainClient<N>,
    address: Address,
}

impl<N: LedgerNode> ContractGateway<N> {
    pub fn new(client: ChainClient<N>, address: Address) -> Self {
        Self { client, address }
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, method: &'static str, call: C) -> Result<C::Return> {
        let request = CallRequest::new(self.address, call.abi_encode());
        let result = self.client.call(method, request).await?;

        C::abi_decode_returns(&result)
            .map_err(|e| EngineError::contract_call(method, format!("failed to decode result: {e}")))
    }

    pub async fn name(&self) -> Result<String> {
        self.read("name", IToken::nameCall {}).await
    }

    pub async fn symbol(&self) -> Result<String> {
        self.read("symbol", IToken::symbolCall {}).await
    }

    /// Reported decimals. Balances and amounts are still handled as raw
    /// integers; this exists so callers can detect a non-zero-decimals token.
    pub async fn decimals(&self) -> Result<u8> {
        self.read("decimals", IToken::decimalsCall {}).await
    }

    pub async fn total_supply(&self) -> Result<U256> {
        self.read("totalSupply", IToken::totalSupplyCall {}).await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        self.read("balanceOf", IToken::balanceOfCall { account }).await
    }

    /// Name, symbol and total supply, queried fresh
    pub async fn token_info(&self) -> Result<TokenInfo> {
        let (name, symbol, total_supply) =
            tokio::try_join!(self.name(), self.symbol(), self.total_supply())?;

        Ok(TokenInfo {
            name,
            symbol,
            total_supply,
        })
    }

    pub fn build_transfer(&self, to: Address, amount: U256) -> CallDescriptor {
        self.descriptor("transfer", amount, IToken::transferCall { to, amount })
    }

    pub fn build_mint(&self, to: Address, amount: U256) -> CallDescriptor {
        self.descriptor("mint", amount, IToken::mintCall { to, amount })
    }

    pub fn build_burn(&self, amount: U256) -> CallDescriptor {
        self.descriptor("burn", amount, IToken::burnCall { amount })
    }

    fn descriptor<C: SolCall>(
        &self,
        method: &'static str,
        amount: U256,
        call: C,
    ) -> CallDescriptor {
        CallDescriptor {
            to: self.address,
            data: Bytes::from(call.abi_encode()),
            method,
            amount,
        }
    }
}
