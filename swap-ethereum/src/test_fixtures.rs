//! Common test fixtures and utilities for swap-ethereum tests
//!
//! This module contains shared test constants, helper functions, and fixtures
//! that can be used across multiple test files in the crate.

use std::{collections::HashMap, str::FromStr};

use alloy::primitives::Address;

use crate::config::ChainConfig;

// Common Ethereum mainnet contract addresses for testing
pub const USDC_STR: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
pub const USDT_STR: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const WETH_STR: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const UNISWAP_V2_ROUTER_STR: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";

// Known token holder for testing (Uniswap V4 pool manager)
pub const USDC_HOLDER_ADDR: &str = "0x000000000004444c5dc75cB358380D2e3dE08A90";

// Well known development key (anvil / hardhat account #0). Never holds real funds.
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_SIGNER_ADDR: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn parse(address: &str) -> Address {
    Address::from_str(address).expect("failed to parse address")
}

pub fn usdc() -> Address {
    parse(USDC_STR)
}

pub fn usdt() -> Address {
    parse(USDT_STR)
}

pub fn weth() -> Address {
    parse(WETH_STR)
}

pub fn router() -> Address {
    parse(UNISWAP_V2_ROUTER_STR)
}

pub fn signer() -> Address {
    parse(TEST_SIGNER_ADDR)
}

/// Mainnet-like chain configuration pointing at the Uniswap V2 router.
pub fn mainnet_config() -> ChainConfig {
    ChainConfig {
        chain_id: 1,
        name: "ethereum".to_string(),
        rpc_url: None,
        router: router(),
        wrapped_native: weth(),
        native_symbol: "ETH".to_string(),
        tokens: HashMap::from([
            ("USDC".to_string(), usdc()),
            ("USDT".to_string(), usdt()),
            ("WETH".to_string(), weth()),
        ]),
        gas_price: None,
        receipt_poll_interval_ms: 10,
    }
}
