//! Assembly of unsigned transactions

use crate::constants::NATIVE_TRANSFER_GAS;
use crate::types::{CallDescriptor, TxParams, UnsignedTransaction};
use alloy::primitives::{Address, Bytes, U256};

/// Builds [`UnsignedTransaction`]s from already-fetched parameters
///
/// Pure: nonce, gas and chain id come from the caller.
pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Plain native-asset transfer
    ///
    /// The gas limit in `params` is ignored in favor of the protocol-fixed
    /// transfer cost.
    pub fn native_transfer(
        from: Address,
        to: Address,
        value: U256,
        params: TxParams,
    ) -> UnsignedTransaction {
        UnsignedTransaction {
            from,
            to,
            value,
            data: Bytes::new(),
            nonce: params.nonce,
            gas_limit: NATIVE_TRANSFER_GAS,
            gas_price: params.gas_price,
            chain_id: params.chain_id,
        }
    }

    /// Contract call with no native value attached
    pub fn contract_call(from: Address, call: CallDescriptor, params: TxParams) -> UnsignedTransaction {
        UnsignedTransaction {
            from,
            to: call.to,
            value: U256::ZERO,
            data: call.data,
            nonce: params.nonce,
            gas_limit: params.gas_limit,
            gas_price: params.gas_price,
            chain_id: params.chain_id,
        }
    }
}
