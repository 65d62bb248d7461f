use std::fmt::Display;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// Ordered hop sequence of a swap, `[in, ..., out]`.
///
/// A `Path` always holds at least two addresses and never two identical adjacent addresses, so
/// holding one means the shape was checked before anything was sent to the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct Path(Vec<Address>);

impl Path {
    pub fn new(tokens: Vec<Address>) -> Result<Self, SwapError> {
        if tokens.len() < 2 {
            return Err(SwapError::InvalidPath(format!(
                "a path needs at least 2 tokens, got {}",
                tokens.len()
            )));
        }
        if let Some(pair) = tokens
            .windows(2)
            .find(|pair| pair[0] == pair[1])
        {
            return Err(SwapError::InvalidPath(format!(
                "token {} appears twice in a row",
                pair[0]
            )));
        }
        Ok(Self(tokens))
    }

    pub fn input(&self) -> Address {
        self.0[0]
    }

    pub fn output(&self) -> Address {
        self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path holds no tokens. False for every constructed path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pairwise exchanges, `len - 1`.
    pub fn hops(&self) -> usize {
        self.0.len() - 1
    }

    pub fn tokens(&self) -> &[Address] {
        &self.0
    }
}

impl TryFrom<Vec<Address>> for Path {
    type Error = SwapError;

    fn try_from(value: Vec<Address>) -> Result<Self, Self::Error> {
        Path::new(value)
    }
}

impl From<Path> for Vec<Address> {
    fn from(value: Path) -> Self {
        value.0
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hops: Vec<String> = self
            .0
            .iter()
            .map(|address| address.to_string())
            .collect();
        write!(f, "{}", hops.join(" -> "))
    }
}
