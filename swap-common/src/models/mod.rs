pub mod path;
pub mod quote;
pub mod swap;
pub mod token;

use std::fmt::Display;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Numeric identifier of an EVM chain (EIP-155).
pub type ChainId = u64;

/// A fungible asset that can be held by an account.
///
/// The chain's gas token has no contract, its balance is read from the account itself. Every
/// other asset is an ERC-20 style token identified by its contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "address", rename_all = "snake_case")]
pub enum Asset {
    Native,
    Erc20(Address),
}

impl Asset {
    pub fn address(&self) -> Option<Address> {
        match self {
            Asset::Native => None,
            Asset::Erc20(address) => Some(*address),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Erc20(address) => write!(f, "{address}"),
        }
    }
}

impl From<Address> for Asset {
    fn from(value: Address) -> Self {
        Asset::Erc20(value)
    }
}
