//! Admission queue value types and policy.
//!
//! Entry to seat holds and payment is gated by a queue token. At most
//! [`QueuePolicy::max_active_users`] tokens are active at once; the rest
//! wait in issue-time order and are promoted by the background worker.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque admission token handed to a user on entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueToken(String);

impl QueueToken {
    /// Issue a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a token received from a client or the store.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for QueueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a queue token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    /// Issued but not yet placed (transient, store-internal).
    Pending,
    /// Queued behind the active set.
    Waiting,
    /// Admitted; may hold seats and pay.
    Active,
}

impl TokenStatus {
    /// Store representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Waiting => "WAITING",
            Self::Active => "ACTIVE",
        }
    }

    /// Parse the store representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "WAITING" => Some(Self::Waiting),
            "ACTIVE" => Some(Self::Active),
            _ => None,
        }
    }
}

/// Tunables for the admission queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Maximum number of simultaneously active tokens.
    pub max_active_users: u32,
    /// Lifetime of a token from issue (or activation refresh).
    pub token_ttl: Duration,
    /// How many waiting tokens one promotion pass may admit.
    pub promotion_batch: u32,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            max_active_users: 100,
            token_ttl: Duration::from_secs(10 * 60),
            promotion_batch: 20,
        }
    }
}

impl QueuePolicy {
    /// Estimated wait in minutes for `waiting` users ahead.
    ///
    /// Assumes one admission roughly every ten seconds.
    pub fn estimated_wait_minutes(&self, waiting: u64) -> u64 {
        if waiting == 0 {
            return 0;
        }
        waiting * 10 / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn tokens_are_unique() {
        assert_ne!(QueueToken::generate(), QueueToken::generate());
    }

    #[rstest]
    #[case(TokenStatus::Pending, "PENDING")]
    #[case(TokenStatus::Waiting, "WAITING")]
    #[case(TokenStatus::Active, "ACTIVE")]
    fn status_round_trips(#[case] status: TokenStatus, #[case] raw: &str) {
        assert_eq!(status.as_str(), raw);
        assert_eq!(TokenStatus::parse(raw), Some(status));
    }

    #[rstest]
    fn unknown_status_is_none() {
        assert_eq!(TokenStatus::parse("EXPIRED"), None);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 0)]
    #[case(60, 10)]
    #[case(120, 20)]
    fn wait_estimate_follows_heuristic(#[case] waiting: u64, #[case] minutes: u64) {
        let policy = QueuePolicy::default();
        assert_eq!(policy.estimated_wait_minutes(waiting), minutes);
    }
}
