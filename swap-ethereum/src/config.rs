//! Per-chain configuration of the swap engine.
//!
//! Router and token addresses differ per chain and per deployment, so nothing is hardcoded: a
//! YAML file maps chain ids to their [`ChainConfig`].
//!
//! ```yaml
//! chains:
//!   1:
//!     name: ethereum
//!     router: "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
//!     wrapped_native: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
//!     native_symbol: ETH
//!     tokens:
//!       USDC: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
//! ```

use std::{collections::HashMap, fs, str::FromStr, time::Duration};

use alloy::primitives::Address;
use serde::Deserialize;
use swap_common::models::{Asset, ChainId};
use thiserror::Error;

use crate::gas::GasPrice;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("No configuration for chain id {0}")]
    UnknownChain(ChainId),
    #[error("Unknown token {token} on chain {chain}")]
    UnknownToken { token: String, chain: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainConfig {
    /// Filled from the key of the entry in [`SwapConfig::chains`].
    #[serde(skip)]
    pub chain_id: ChainId,
    pub name: String,
    /// Node endpoint. The `--rpc-url` flag takes precedence.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Uniswap V2 style router used for quotes and swaps.
    pub router: Address,
    /// Wrapped native token, first hop of every native-input swap.
    pub wrapped_native: Address,
    pub native_symbol: String,
    /// Symbol -> token contract.
    #[serde(default)]
    pub tokens: HashMap<String, Address>,
    /// Fixed gas pricing. When unset, pricing is read from the node for every transaction.
    #[serde(default)]
    pub gas_price: Option<GasPrice>,
    #[serde(default = "default_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
}

impl ChainConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Resolves a token given either as a contract address or as a configured symbol
    /// (case-insensitive).
    pub fn resolve_token(&self, token: &str) -> Result<Address, ConfigError> {
        if token.starts_with("0x") {
            return Address::from_str(token)
                .map_err(|e| ConfigError::Invalid(format!("Invalid address {token}: {e}")));
        }
        self.tokens
            .iter()
            .find(|(symbol, _)| symbol.eq_ignore_ascii_case(token))
            .map(|(_, address)| *address)
            .ok_or_else(|| ConfigError::UnknownToken {
                token: token.to_string(),
                chain: self.name.clone(),
            })
    }

    /// Like [`Self::resolve_token`], but also accepts `native` or the native symbol.
    pub fn resolve_asset(&self, asset: &str) -> Result<Asset, ConfigError> {
        if asset.eq_ignore_ascii_case("native") || asset.eq_ignore_ascii_case(&self.native_symbol) {
            return Ok(Asset::Native);
        }
        self.resolve_token(asset)
            .map(Asset::Erc20)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwapConfig {
    chains: HashMap<ChainId, ChainConfig>,
}

impl SwapConfig {
    pub fn new(chains: impl IntoIterator<Item = ChainConfig>) -> Self {
        Self {
            chains: chains
                .into_iter()
                .map(|chain| (chain.chain_id, chain))
                .collect(),
        }
    }

    pub fn from_yaml(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: SwapConfig = serde_yaml::from_str(contents)?;
        for (chain_id, chain) in config.chains.iter_mut() {
            chain.chain_id = *chain_id;
            if chain.receipt_poll_interval_ms == 0 {
                return Err(ConfigError::Invalid(format!(
                    "receipt_poll_interval_ms of chain {chain_id} must be positive"
                )));
            }
        }
        Ok(config)
    }

    pub fn chain(&self, chain_id: ChainId) -> Result<&ChainConfig, ConfigError> {
        self.chains
            .get(&chain_id)
            .ok_or(ConfigError::UnknownChain(chain_id))
    }
}
