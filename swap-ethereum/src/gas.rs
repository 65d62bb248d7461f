use alloy::{
    network::TransactionBuilder,
    rpc::types::{BlockId, TransactionRequest},
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use tracing::debug;

use crate::rpc::{errors::RPCError, EthereumRpcClient};

/// Represents gas pricing information for EVM blockchain transactions.
///
/// Different EVM networks use different gas pricing models:
/// - Most modern chains use EIP-1559 (base fee + priority fee model)
/// - Legacy chains (e.g., BSC, pre-London Ethereum) use a simple gas price
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GasPrice {
    /// Legacy gas pricing model with a single gas price value.
    Legacy {
        /// Gas price in wei
        #[serde_as(as = "DisplayFromStr")]
        gas_price: u128,
    },
    /// EIP-1559 gas pricing model with base fee and priority fee.
    Eip1559 {
        /// Base fee per gas in wei, determined by the protocol
        #[serde_as(as = "DisplayFromStr")]
        base_fee_per_gas: u128,
        /// Maximum priority fee (tip) per gas in wei, paid to validators
        #[serde_as(as = "DisplayFromStr")]
        max_priority_fee_per_gas: u128,
    },
}

impl GasPrice {
    /// Reads the current pricing from the node: EIP-1559 when the latest block carries a base
    /// fee, legacy otherwise.
    pub async fn fetch(rpc: &EthereumRpcClient) -> Result<Self, RPCError> {
        let price = match rpc
            .get_base_fee_per_gas(BlockId::latest())
            .await?
        {
            Some(base_fee_per_gas) => GasPrice::Eip1559 {
                base_fee_per_gas,
                max_priority_fee_per_gas: rpc.get_max_priority_fee_per_gas().await?,
            },
            None => GasPrice::Legacy { gas_price: rpc.get_gas_price().await? },
        };
        debug!(?price, "Fetched gas price");
        Ok(price)
    }

    /// Fee cap for EIP-1559 transactions. Allows the base fee to double before the transaction
    /// stops being includable.
    pub fn max_fee_per_gas(&self) -> u128 {
        match self {
            GasPrice::Legacy { gas_price } => *gas_price,
            GasPrice::Eip1559 { base_fee_per_gas, max_priority_fee_per_gas } => base_fee_per_gas
                .saturating_mul(2)
                .saturating_add(*max_priority_fee_per_gas),
        }
    }

    /// Sets the pricing fields of a transaction request.
    pub fn apply(&self, request: TransactionRequest) -> TransactionRequest {
        match self {
            GasPrice::Legacy { gas_price } => request.with_gas_price(*gas_price),
            GasPrice::Eip1559 { max_priority_fee_per_gas, .. } => request
                .with_max_fee_per_gas(self.max_fee_per_gas())
                .with_max_priority_fee_per_gas(*max_priority_fee_per_gas),
        }
    }
}
