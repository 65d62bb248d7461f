#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod config;
pub mod engine;
pub mod erc20;
pub mod gas;
pub mod reader;
pub mod router;
pub mod rpc;
pub mod submitter;

#[cfg(test)]
pub mod test_fixtures;

pub use rpc::{errors::RPCError, EthereumRpcClient};
