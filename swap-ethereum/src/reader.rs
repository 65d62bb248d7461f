use alloy::{
    primitives::{Address, Bytes, U256},
    rpc::types::{BlockNumberOrTag, TransactionInput, TransactionRequest},
};
use async_trait::async_trait;
use swap_common::{
    models::{path::Path, token::Token, Asset},
    traits::ChainReader,
    ChainCallError,
};
use tracing::{instrument, warn};

use crate::{erc20, router, rpc::EthereumRpcClient};

/// Reads balances, allowances, token metadata and router quotes at the latest block.
#[derive(Debug, Clone)]
pub struct EthereumChainReader {
    rpc: EthereumRpcClient,
    native_symbol: String,
}

fn call_request(to: Address, calldata: Vec<u8>) -> TransactionRequest {
    TransactionRequest::default()
        .to(to)
        .input(TransactionInput::both(calldata.into()))
}

fn decode_error<E: std::fmt::Display>(
    what: &'static str,
    target: Address,
) -> impl FnOnce(E) -> ChainCallError {
    move |e| ChainCallError::Decode(format!("Failed to decode {what} result from {target}: {e}"))
}

impl EthereumChainReader {
    pub fn new(rpc: EthereumRpcClient, native_symbol: &str) -> Self {
        Self { rpc, native_symbol: native_symbol.to_string() }
    }

    async fn call(&self, to: Address, calldata: Vec<u8>) -> Result<Bytes, ChainCallError> {
        Ok(self
            .rpc
            .eth_call(call_request(to, calldata), BlockNumberOrTag::Latest)
            .await?)
    }

    async fn call_symbol(&self, token: Address) -> String {
        let result = match self
            .call(token, erc20::encode_symbol())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(?e, ?token, "Failed to call symbol function, using address as fallback");
                return format!("0x{:x}", token);
            }
        };

        match erc20::decode_symbol(&result) {
            Ok(symbol) => symbol.replace('\0', ""),
            Err(e) => {
                warn!(
                    ?e,
                    ?token,
                    "Failed to decode symbol function result, using address as fallback"
                );
                format!("0x{:x}", token)
            }
        }
    }
}

#[async_trait]
impl ChainReader for EthereumChainReader {
    #[instrument(level = "debug", skip(self))]
    async fn balance(&self, asset: Asset, owner: Address) -> Result<U256, ChainCallError> {
        match asset {
            Asset::Native => Ok(self
                .rpc
                .eth_get_balance(BlockNumberOrTag::Latest, owner)
                .await?),
            Asset::Erc20(token) => {
                let result = self
                    .call(token, erc20::encode_balance_of(owner))
                    .await?;
                erc20::decode_balance_of(&result).map_err(decode_error("balanceOf", token))
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainCallError> {
        let result = self
            .call(token, erc20::encode_allowance(owner, spender))
            .await?;
        erc20::decode_allowance(&result).map_err(decode_error("allowance", token))
    }

    /// The symbol is display-only and falls back to the address; decimals scale amounts and
    /// must be read successfully.
    #[instrument(level = "debug", skip(self))]
    async fn token(&self, asset: Asset) -> Result<Token, ChainCallError> {
        let address = match asset {
            Asset::Native => return Ok(Token::native(&self.native_symbol)),
            Asset::Erc20(address) => address,
        };

        let result = self
            .call(address, erc20::encode_decimals())
            .await?;
        let decimals =
            erc20::decode_decimals(&result).map_err(decode_error("decimals", address))?;
        let symbol = self.call_symbol(address).await;

        Ok(Token::new(asset, &symbol, decimals))
    }

    #[instrument(level = "debug", skip(self, path), fields(%path))]
    async fn amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &Path,
    ) -> Result<Vec<U256>, ChainCallError> {
        let result = self
            .call(router, router::encode_get_amounts_out(amount_in, path.tokens()))
            .await?;
        router::decode_get_amounts_out(&result).map_err(decode_error("getAmountsOut", router))
    }
}
