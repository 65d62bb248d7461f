use alloy::primitives::{Address, U256};
use swap_common::{
    models::swap::{ContractCall, TxReceipt},
    traits::{ChainReader, TransactionSubmitter},
    SwapError,
};
use tracing::{debug, info, instrument};

use super::chain_read;
use crate::erc20;

/// Makes sure a spender may move at least a given amount of the signer's tokens.
///
/// Approvals are always for the exact amount required, never unlimited. Tokens that require the
/// allowance to be reset to zero before it can be changed are not supported.
pub struct AllowanceManager<'a, R, S> {
    reader: &'a R,
    submitter: &'a S,
}

impl<'a, R: ChainReader, S: TransactionSubmitter> AllowanceManager<'a, R, S> {
    pub fn new(reader: &'a R, submitter: &'a S) -> Self {
        Self { reader, submitter }
    }

    /// Returns the receipt of the approval when one had to be mined, `None` when the current
    /// allowance already covers `required`.
    #[instrument(level = "debug", skip(self))]
    pub async fn ensure_allowance(
        &self,
        token: Address,
        spender: Address,
        required: U256,
    ) -> Result<Option<TxReceipt>, SwapError> {
        let owner = self.submitter.sender();
        let current = self
            .reader
            .allowance(token, owner, spender)
            .await
            .map_err(chain_read)?;
        if current >= required {
            debug!(%current, %required, "Allowance sufficient");
            return Ok(None);
        }

        let failed = |tx_hash, reason: String| SwapError::ApprovalFailed {
            token,
            spender,
            amount: required,
            tx_hash,
            reason,
        };

        let call = ContractCall::new(token, erc20::encode_approve(spender, required));
        let tx_hash = self
            .submitter
            .submit(call)
            .await
            .map_err(|e| failed(None, e.to_string()))?;
        info!(%tx_hash, %current, %required, "Approval submitted");

        let receipt = self
            .submitter
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| failed(Some(tx_hash), e.to_string()))?;
        if !receipt.success {
            return Err(failed(
                Some(tx_hash),
                format!("approval reverted in block {}", receipt.block_number),
            ));
        }

        info!(%tx_hash, block = receipt.block_number, "Approval confirmed");
        Ok(Some(receipt))
    }
}
