use alloy_primitives::{Address, Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

use super::path::Path;
use crate::{error::SwapError, slippage::SlippageTolerance};

/// Caller input for a single swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub path: Path,
    /// Input amount in human units of the input token, e.g. `"10.5"`.
    pub amount_in: String,
    pub slippage: SlippageTolerance,
    /// Account that signs the swap and receives the output.
    pub account: Address,
    /// The swap must not execute after this instant.
    pub deadline: DateTime<Utc>,
    /// Pay with the chain's native asset. The first path entry must be the wrapped native token.
    #[serde(default)]
    pub native_input: bool,
}

/// States a swap request goes through.
///
/// The happy path is `Quoting -> AllowanceCheck -> Submitting -> Pending -> Confirmed`. All other
/// terminal states describe where a request stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapState {
    Quoting,
    AllowanceCheck,
    Submitting,
    Pending,
    Confirmed,
    Reverted,
    Expired,
    Rejected,
    QuoteFailed,
    ApprovalFailed,
    SubmitFailed,
}

/// A contract interaction to be signed and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self { to, data: data.into(), value: U256::ZERO }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Inclusion receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub amount_in: U256,
    pub quoted_out: U256,
    pub min_out: U256,
    pub tx_hash: TxHash,
    pub receipt: TxReceipt,
    /// Receipt of the approval that had to be mined before the swap, if any.
    pub approval: Option<TxReceipt>,
}

/// Amounts fixed once a request has been quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub amount_in: U256,
    pub quoted_out: U256,
    pub min_out: U256,
}

/// A swap request that stopped before reaching `Confirmed`.
///
/// Carries whatever on-chain side effects already happened so the caller can decide whether to
/// resubmit: a mined approval stays in place even if the swap itself never went out.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Swap stopped in state {state}: {source}")]
pub struct SwapFailure {
    pub state: SwapState,
    #[source]
    pub source: SwapError,
    pub tx_hash: Option<TxHash>,
    pub approval: Option<TxReceipt>,
    /// Set for every failure after quoting succeeded.
    pub quote: Option<QuoteSummary>,
}

impl SwapFailure {
    pub fn new(state: SwapState, source: SwapError) -> Self {
        Self { state, source, tx_hash: None, approval: None, quote: None }
    }

    pub fn with_quote(mut self, quote: QuoteSummary) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_approval(mut self, approval: Option<TxReceipt>) -> Self {
        self.approval = approval;
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: TxHash) -> Self {
        self.tx_hash = Some(tx_hash);
        self
    }
}
