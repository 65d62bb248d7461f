//! Slippage policy: turns a quoted output into the minimum output a swap may accept.

use std::{fmt::Display, str::FromStr};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// Denominator of a basis point fraction.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// A validated slippage tolerance, held in basis points.
///
/// Built from a percentage in `[0, 100]`, fractional values allowed (`0.5` means 0.5%). The
/// percentage is rounded to the nearest basis point once; all further math is integer math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SlippageTolerance {
    bps: u64,
}

impl SlippageTolerance {
    pub const ZERO: SlippageTolerance = SlippageTolerance { bps: 0 };

    pub fn from_percent(percent: f64) -> Result<Self, SwapError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(SwapError::InvalidTolerance(percent.to_string()));
        }
        Ok(Self { bps: (percent * 100.0).round() as u64 })
    }

    pub fn bps(&self) -> u64 {
        self.bps
    }

    pub fn percent(&self) -> f64 {
        self.bps as f64 / 100.0
    }

    /// `floor(quoted_out * (10000 - bps) / 10000)`.
    ///
    /// Evaluated as `q * k / d = (q / d) * k + (q % d) * k / d`, which is exact under integer
    /// division and never overflows since `k <= d`.
    pub fn min_output(&self, quoted_out: U256) -> U256 {
        let denominator = U256::from(BPS_DENOMINATOR);
        let keep = U256::from(BPS_DENOMINATOR - self.bps);
        (quoted_out / denominator) * keep + (quoted_out % denominator) * keep / denominator
    }
}

impl TryFrom<f64> for SlippageTolerance {
    type Error = SwapError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_percent(value)
    }
}

impl From<SlippageTolerance> for f64 {
    fn from(value: SlippageTolerance) -> Self {
        value.percent()
    }
}

impl FromStr for SlippageTolerance {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SwapError::InvalidTolerance(s.to_string());
        let percent = s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| invalid())?;
        Self::from_percent(percent).map_err(|_| invalid())
    }
}

impl Display for SlippageTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
