use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use super::path::Path;
use crate::error::SwapError;

/// Amounts returned by the router for a path, one per path position.
///
/// Only valid for the block it was read at; it is never cached or reused across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    path: Path,
    amounts: Vec<U256>,
}

impl Quote {
    /// Builds a quote from the router's answer, checking it is consistent with the request.
    pub fn new(path: Path, amount_in: U256, amounts: Vec<U256>) -> Result<Self, SwapError> {
        if amounts.len() != path.len() {
            return Err(SwapError::ChainRead(format!(
                "router returned {} amounts for a path of {} tokens",
                amounts.len(),
                path.len()
            )));
        }
        if amounts[0] != amount_in {
            return Err(SwapError::ChainRead(format!(
                "router quoted input {} but {amount_in} was requested",
                amounts[0]
            )));
        }
        Ok(Self { path, amounts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn amounts(&self) -> &[U256] {
        &self.amounts
    }

    pub fn amount_in(&self) -> U256 {
        self.amounts[0]
    }

    pub fn amount_out(&self) -> U256 {
        self.amounts[self.amounts.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    fn path() -> Path {
        Path::new(vec![
            address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
            address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        ])
        .unwrap()
    }

    #[test]
    fn test_quote_accessors() {
        let quote = Quote::new(path(), U256::from(100), vec![U256::from(100), U256::from(97)])
            .unwrap();
        assert_eq!(quote.amount_in(), U256::from(100));
        assert_eq!(quote.amount_out(), U256::from(97));
    }

    #[test]
    fn test_quote_rejects_length_mismatch() {
        let res = Quote::new(path(), U256::from(100), vec![U256::from(100)]);
        assert!(matches!(res, Err(SwapError::ChainRead(_))));
    }

    #[test]
    fn test_quote_rejects_input_mismatch() {
        let res = Quote::new(path(), U256::from(100), vec![U256::from(99), U256::from(97)]);
        assert!(matches!(res, Err(SwapError::ChainRead(_))));
    }
}
