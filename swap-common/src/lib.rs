#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod error;
pub mod models;
pub mod slippage;
pub mod traits;

pub use error::{ChainCallError, SwapError};
pub use slippage::SlippageTolerance;
