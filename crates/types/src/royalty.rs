//! Royalty configuration for transfer policies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for basis points (100%).
pub const MAX_BASIS_POINTS: u64 = 10_000;

/// Royalty rule parameters.
///
/// Always within range: construction and deserialization both validate, so
/// an out-of-range value cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoyaltyConfig")]
pub struct RoyaltyConfig {
    basis_points: u16,
    min_amount: u64,
}

#[derive(Deserialize)]
struct RawRoyaltyConfig {
    basis_points: u64,
    min_amount: u64,
}

impl TryFrom<RawRoyaltyConfig> for RoyaltyConfig {
    type Error = RoyaltyError;

    fn try_from(raw: RawRoyaltyConfig) -> Result<Self, Self::Error> {
        RoyaltyConfig::new(raw.basis_points, raw.min_amount)
    }
}

impl RoyaltyConfig {
    /// Default rate: 100 bp (1%).
    pub const DEFAULT_BASIS_POINTS: u16 = 100;

    /// Default minimum: 0.01 SUI in base units.
    pub const DEFAULT_MIN_AMOUNT: u64 = 10_000_000;

    /// Create a royalty config, rejecting basis points above 10000.
    pub fn new(basis_points: u64, min_amount: u64) -> Result<Self, RoyaltyError> {
        if basis_points > MAX_BASIS_POINTS {
            return Err(RoyaltyError::BasisPointsOutOfRange(basis_points));
        }
        Ok(Self {
            basis_points: basis_points as u16,
            min_amount,
        })
    }

    /// Royalty rate in basis points.
    pub fn basis_points(&self) -> u16 {
        self.basis_points
    }

    /// Minimum royalty in base units.
    pub fn min_amount(&self) -> u64 {
        self.min_amount
    }
}

impl Default for RoyaltyConfig {
    fn default() -> Self {
        Self {
            basis_points: Self::DEFAULT_BASIS_POINTS,
            min_amount: Self::DEFAULT_MIN_AMOUNT,
        }
    }
}

impl fmt::Display for RoyaltyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}bp (min {})",
            self.basis_points, self.min_amount
        )
    }
}

/// Royalty validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoyaltyError {
    #[error("Royalty basis points out of range: {0} (max {max})", max = MAX_BASIS_POINTS)]
    BasisPointsOutOfRange(u64),
}
