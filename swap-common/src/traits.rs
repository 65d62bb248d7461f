use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::{
    error::ChainCallError,
    models::{
        path::Path,
        swap::{ContractCall, TxReceipt},
        token::Token,
        Asset,
    },
};

/// Read-only access to the chain state a swap depends on.
///
/// Every call reads fresh state from the node; implementations must not cache results across
/// calls, and must not retry failed reads.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Base unit balance of `owner`. Native balances are read from the account, token balances
    /// through `balanceOf`.
    async fn balance(&self, asset: Asset, owner: Address) -> Result<U256, ChainCallError>;

    /// Amount `spender` may transfer out of `owner`'s balance of `token`.
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainCallError>;

    /// Decimals and symbol of an asset.
    async fn token(&self, asset: Asset) -> Result<Token, ChainCallError>;

    /// Asks `router` for the amounts obtained at each position of `path` when putting in
    /// `amount_in`. Reverts if any pair along the path has no pool.
    async fn amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &Path,
    ) -> Result<Vec<U256>, ChainCallError>;
}

/// Signs, broadcasts and tracks transactions for a single account.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Account the submitted transactions are signed by.
    fn sender(&self) -> Address;

    /// Signs and broadcasts `call`, returning as soon as the node accepted it.
    async fn submit(&self, call: ContractCall) -> Result<TxHash, ChainCallError>;

    /// Waits until `tx_hash` is mined. There is no local timeout.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainCallError>;
}
