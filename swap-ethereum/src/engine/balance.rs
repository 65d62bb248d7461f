use alloy::primitives::Address;
use swap_common::{
    models::{
        token::{Token, TokenAmount},
        Asset,
    },
    traits::ChainReader,
    SwapError,
};
use tracing::instrument;

use super::chain_read;

/// Balance and allowance lookups rendered in human units.
pub struct BalanceReader<'a, R> {
    reader: &'a R,
}

impl<'a, R: ChainReader> BalanceReader<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    pub async fn token(&self, asset: Asset) -> Result<Token, SwapError> {
        self.reader
            .token(asset)
            .await
            .map_err(chain_read)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn balance(&self, asset: Asset, owner: Address) -> Result<TokenAmount, SwapError> {
        let token = self.token(asset).await?;
        let amount = self
            .reader
            .balance(asset, owner)
            .await
            .map_err(chain_read)?;
        Ok(TokenAmount::new(token, amount))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<TokenAmount, SwapError> {
        let metadata = self.token(Asset::Erc20(token)).await?;
        let amount = self
            .reader
            .allowance(token, owner, spender)
            .await
            .map_err(chain_read)?;
        Ok(TokenAmount::new(metadata, amount))
    }
}
