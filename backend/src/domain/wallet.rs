//! Append-only wallet ledger types.
//!
//! Balances live in the wallets table and are derived through
//! [`LedgerEntryKind::signed_delta`]; every mutation appends one
//! [`LedgerEntry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use super::user::UserId;

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    /// Balance top-up.
    Charge,
    /// Debit for a confirmed reservation.
    Payment,
    /// Credit restoring a cancelled reservation's price.
    Refund,
}

impl LedgerEntryKind {
    /// Store representation of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Charge => "CHARGE",
            Self::Payment => "PAYMENT",
            Self::Refund => "REFUND",
        }
    }

    /// Parse the store representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CHARGE" => Some(Self::Charge),
            "PAYMENT" => Some(Self::Payment),
            "REFUND" => Some(Self::Refund),
            _ => None,
        }
    }

    /// Signed delta applied to the balance for `amount`.
    pub fn signed_delta(self, amount: Money) -> i64 {
        match self {
            Self::Charge | Self::Refund => amount.amount(),
            Self::Payment => -amount.amount(),
        }
    }
}

/// One immutable ledger row.
///
/// The optional idempotency key makes charge and payment replays
/// observable: a key seen before short-circuits the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: LedgerEntryKind,
    pub amount: Money,
    pub idempotency_key: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Record a movement against `user_id` now.
    pub fn record(
        user_id: UserId,
        kind: LedgerEntryKind,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            amount,
            idempotency_key,
            recorded_at: Utc::now(),
        }
    }
}
