use alloy_primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{path::Path, swap::TxReceipt, Asset};

/// Outcome of a single failed interaction with the chain.
///
/// Chain-facing implementations translate their transport specific errors into this type so the
/// engine can decide how a failure should be reported without knowing about the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainCallError {
    /// The node could not be reached or answered with a non-revert error.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The call or transaction was executed and reverted.
    #[error("Execution reverted: {0}")]
    Reverted(String),
    /// The node answered but the payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The transaction could not be built or signed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl ChainCallError {
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted(_))
    }
}

/// User-facing errors of a swap request.
///
/// Every variant is terminal for the request that produced it. None of them is retried by the
/// engine: after a partial state change (e.g. a mined approval) a retry is a new request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("Chain read failed: {0}")]
    ChainRead(String),
    #[error("No liquidity for path {path} with amount in {amount_in}: {reason}")]
    NoLiquidity { path: Path, amount_in: U256, reason: String },
    /// Holds the tolerance as the caller wrote it.
    #[error("Invalid slippage tolerance {0:?}: must be a percentage within [0, 100]")]
    InvalidTolerance(String),
    #[error("Approval of {amount} for spender {spender} on token {token} failed: {reason}")]
    ApprovalFailed {
        token: Address,
        spender: Address,
        amount: U256,
        tx_hash: Option<TxHash>,
        reason: String,
    },
    #[error("Deadline {deadline} already passed (now {now})")]
    DeadlineExpired { deadline: DateTime<Utc>, now: DateTime<Utc> },
    #[error(
        "Swap transaction {} reverted in block {} (minimum output {min_out})",
        .receipt.tx_hash,
        .receipt.block_number
    )]
    SlippageExceededOrRevert { min_out: U256, receipt: TxReceipt },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Invalid amount {amount:?} for {asset}: {reason}")]
    InvalidAmount { asset: Asset, amount: String, reason: String },
    #[error("Request account {requested} does not match signer {signer}")]
    SignerMismatch { requested: Address, signer: Address },
    #[error("Failed to submit transaction: {0}")]
    Submission(String),
}
