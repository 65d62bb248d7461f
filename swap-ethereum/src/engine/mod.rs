//! The swap engine.
//!
//! A request runs through the components in a fixed order: [`quote::QuoteResolver`], the
//! slippage policy ([`swap_common::SlippageTolerance::min_output`]),
//! [`allowance::AllowanceManager`] and finally the [`executor::SwapExecutor`], which owns the
//! state machine tying them together. Components only hold borrowed handles to the chain and keep
//! no state between requests.

pub mod allowance;
pub mod balance;
pub mod executor;
pub mod quote;

use swap_common::{ChainCallError, SwapError};

pub use allowance::AllowanceManager;
pub use balance::BalanceReader;
pub use executor::SwapExecutor;
pub use quote::QuoteResolver;

pub(crate) fn chain_read(err: ChainCallError) -> SwapError {
    SwapError::ChainRead(err.to_string())
}
