//! Gas limit estimation for contract calls

use crate::chain::{CallRequest, ChainClient, LedgerNode};
use crate::constants::apply_gas_buffer;
use crate::error::Result;
use crate::types::CallDescriptor;
use alloy::primitives::Address;

/// Asks the node to simulate a call and pads the result
pub struct GasEstimator<N> {
    client: ChainClient<N>,
}

impl<N: LedgerNode> GasEstimator<N> {
    pub fn new(client: ChainClient<N>) -> Self {
        Self { client }
    }

    /// Gas limit for executing `call` as `from`
    ///
    /// A simulation that reverts (e.g. the caller is not allowed to mint) fails
    /// here with a `ContractCall` error, before anything is signed.
    pub async fn estimate(&self, call: &CallDescriptor, from: Address) -> Result<u64> {
        let request = CallRequest::new(call.to, call.data.clone()).with_from(from);
        let estimate = self
            .client
            .estimate_gas(call.method, request)
            .await
            .map_err(|e| e.with_caller(from, call.amount))?;
        let gas_limit = apply_gas_buffer(estimate);

        tracing::debug!(
            method = call.method,
            %from,
            estimate,
            gas_limit,
            "Estimated gas"
        );

        Ok(gas_limit)
    }
}
