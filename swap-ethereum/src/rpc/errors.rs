use std::{error::Error, fmt::Display};

use alloy::transports::{RpcError as AlloyRpcError, TransportErrorKind};
use swap_common::ChainCallError;
use thiserror::Error;

/// Alloy RPC error type alias for convenience.
pub(crate) type AlloyError = AlloyRpcError<TransportErrorKind>;

/// JSON-RPC error code geth and most other clients use for `execution reverted`.
const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Error, Debug)]
pub struct TransportError {
    pub msg: String,
    #[source]
    pub source: AlloyError,
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.msg, self.source)
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    Transport(TransportError),
    Other(String),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Transport(e) => write!(f, "{}: {}", e.msg, e.source),
            RequestError::Other(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RPCError {
    #[error("RPC setup error: {0}")]
    SetupError(String),
    #[error("Request error: {0}")]
    RequestError(RequestError),
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl RPCError {
    pub(super) fn from_alloy<S: ToString>(msg: S, error: AlloyError) -> Self {
        RPCError::RequestError(RequestError::Transport(TransportError {
            msg: msg.to_string(),
            source: error,
        }))
    }

    /// Whether the node executed the call and it reverted, as opposed to the request failing.
    pub fn is_revert(&self) -> bool {
        match self {
            RPCError::RequestError(RequestError::Transport(TransportError {
                source: AlloyRpcError::ErrorResp(payload),
                ..
            })) => {
                payload.code == EXECUTION_REVERTED_CODE ||
                    payload
                        .message
                        .to_lowercase()
                        .contains("revert")
            }
            _ => false,
        }
    }
}

impl From<RPCError> for ChainCallError {
    fn from(error: RPCError) -> Self {
        let message = extract_error_chain(&error);
        if error.is_revert() {
            return ChainCallError::Reverted(message);
        }
        match error {
            RPCError::DecodeError(_) => ChainCallError::Decode(message),
            _ => ChainCallError::Transport(message),
        }
    }
}

/// Extension trait for adding RPC context to Results containing Alloy errors.
///
/// Similar to `anyhow::Context`, this trait provides ergonomic error wrapping
/// that converts Alloy RPC errors into `RPCError` with contextual messages.
///
/// # Example
/// ```ignore
/// use crate::rpc::errors::RpcResultExt;
///
/// result.rpc_context(format!("Failed to get balance of {owner}"))?;
///
/// // Or with lazy evaluation (avoids format! on success path):
/// result.with_rpc_context(|| format!("Failed to get balance of {owner}"))?;
/// ```
pub(crate) trait RpcResultExt<T> {
    /// Wraps the error with context, converting it to an `RPCError`.
    fn rpc_context<C: Display>(self, context: C) -> Result<T, RPCError>;

    /// Wraps the error with lazily-evaluated context.
    fn with_rpc_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, RPCError>;
}

impl<T> RpcResultExt<T> for Result<T, AlloyError> {
    fn rpc_context<C: Display>(self, context: C) -> Result<T, RPCError> {
        self.map_err(|e| RPCError::from_alloy(context.to_string(), e))
    }

    fn with_rpc_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, RPCError> {
        self.map_err(|e| RPCError::from_alloy(f().to_string(), e))
    }
}

/// Helper function to extract the full error chain including source errors
pub(crate) fn extract_error_chain(error: &dyn Error) -> String {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();

    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }

    if chain.len() == 1 {
        chain[0].clone()
    } else {
        format!("{} (caused by: {})", chain[0], chain[1..].join(" -> "))
    }
}
