//! Monetary amounts in whole won.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Non-negative monetary amount.
///
/// Wallet balances and ledger amounts never go below zero at the domain
/// level; signed deltas live only inside ledger rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Money(i64);

/// Raised when constructing or combining amounts would go negative.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("monetary amount must not be negative: {amount}")]
pub struct NegativeAmount {
    amount: i64,
}

impl Money {
    /// Zero won.
    pub const ZERO: Self = Self(0);

    /// Construct from an inherently non-negative amount.
    pub const fn from_won(amount: u32) -> Self {
        Self(amount as i64)
    }

    /// Construct from a non-negative amount.
    pub fn new(amount: i64) -> Result<Self, NegativeAmount> {
        if amount < 0 {
            return Err(NegativeAmount { amount });
        }
        Ok(Self(amount))
    }

    /// The raw amount in won.
    pub fn amount(self) -> i64 {
        self.0
    }

    /// Saturating addition; balances cap at `i64::MAX`.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Checked subtraction; `None` when the result would be negative.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let result = self.0 - other.0;
        (result >= 0).then_some(Self(result))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
