use alloy::primitives::{Address, U256};
use swap_common::{
    models::{path::Path, quote::Quote},
    traits::ChainReader,
    SwapError,
};
use tracing::{debug, instrument};

/// Reads the expected output of a path from the router.
///
/// Exactly one `getAmountsOut` read per quote. There is no fallback path search: a path without
/// liquidity fails.
pub struct QuoteResolver<'a, R> {
    reader: &'a R,
    router: Address,
}

impl<'a, R: ChainReader> QuoteResolver<'a, R> {
    pub fn new(reader: &'a R, router: Address) -> Self {
        Self { reader, router }
    }

    /// Validates `tokens` as a path before quoting it. Invalid paths never reach the node.
    pub async fn resolve_tokens(
        &self,
        tokens: Vec<Address>,
        amount_in: U256,
    ) -> Result<Quote, SwapError> {
        let path = Path::new(tokens)?;
        self.resolve(&path, amount_in).await
    }

    #[instrument(level = "debug", skip(self, path), fields(%path))]
    pub async fn resolve(&self, path: &Path, amount_in: U256) -> Result<Quote, SwapError> {
        let amounts = self
            .reader
            .amounts_out(self.router, amount_in, path)
            .await
            .map_err(|err| {
                if err.is_revert() {
                    SwapError::NoLiquidity {
                        path: path.clone(),
                        amount_in,
                        reason: err.to_string(),
                    }
                } else {
                    SwapError::ChainRead(err.to_string())
                }
            })?;

        let quote = Quote::new(path.clone(), amount_in, amounts)?;
        if quote.amount_out().is_zero() {
            return Err(SwapError::NoLiquidity {
                path: path.clone(),
                amount_in,
                reason: "router quoted zero output".to_string(),
            });
        }

        debug!(amounts = ?quote.amounts(), "Resolved quote");
        Ok(quote)
    }
}
