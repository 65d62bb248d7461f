use std::fmt::Display;

use alloy_primitives::{
    utils::{format_units, parse_units},
    U256,
};
use serde::{Deserialize, Serialize};

use super::Asset;
use crate::error::SwapError;

/// Decimals of the native asset on every EVM chain.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub asset: Asset,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(asset: Asset, symbol: &str, decimals: u8) -> Self {
        Self { asset, symbol: symbol.to_string(), decimals }
    }

    pub fn native(symbol: &str) -> Self {
        Self::new(Asset::Native, symbol, NATIVE_DECIMALS)
    }

    /// Scales a human readable amount (e.g. `"10.5"`) to base units.
    ///
    /// Rejects negative and zero amounts as well as amounts with more fractional digits than the
    /// token supports, since those can't be represented on-chain without silently truncating.
    pub fn parse_amount(&self, amount: &str) -> Result<U256, SwapError> {
        let invalid = |reason: String| SwapError::InvalidAmount {
            asset: self.asset,
            amount: amount.to_string(),
            reason,
        };

        let trimmed = amount.trim();
        if trimmed.starts_with('-') {
            return Err(invalid("amount must not be negative".to_string()));
        }
        if let Some((_, fraction)) = trimmed.split_once('.') {
            if fraction.len() > self.decimals as usize {
                return Err(invalid(format!(
                    "{} supports at most {} fractional digits",
                    self.symbol, self.decimals
                )));
            }
        }

        let value = parse_units(trimmed, self.decimals)
            .map_err(|e| invalid(e.to_string()))?
            .get_absolute();
        if value.is_zero() {
            return Err(invalid("amount must be greater than zero".to_string()));
        }
        Ok(value)
    }

    /// Renders a base unit amount in human units, without trailing zeros.
    pub fn format_amount(&self, amount: U256) -> String {
        match format_units(amount, self.decimals) {
            Ok(formatted) if formatted.contains('.') => formatted
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string(),
            Ok(formatted) => formatted,
            // Only reachable for decimals > 77, which no deployed token uses.
            Err(_) => amount.to_string(),
        }
    }
}

/// A base unit amount together with the token it is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: Token,
    pub amount: U256,
}

impl TokenAmount {
    pub fn new(token: Token, amount: U256) -> Self {
        Self { token, amount }
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.token.format_amount(self.amount), self.token.symbol)
    }
}
