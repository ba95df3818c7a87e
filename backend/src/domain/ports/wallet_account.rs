//! Driving port for wallet top-ups and balance queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::UserId;
use crate::domain::Error;

/// Response to a charge or balance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    pub user_id: UserId,
    pub balance: i64,
}

/// Driving port for wallet operations exposed over HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletAccount: Send + Sync {
    /// Tops up the wallet; a repeated idempotency key replays the first
    /// outcome instead of charging twice.
    async fn charge(
        &self,
        user_id: UserId,
        amount: i64,
        idempotency_key: Option<String>,
    ) -> Result<ChargeResponse, Error>;

    /// Current balance; zero for users without a wallet.
    async fn balance(&self, user_id: UserId) -> Result<ChargeResponse, Error>;
}

/// Fixture wallet account that accepts any positive charge.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWalletAccount;

#[async_trait]
impl WalletAccount for FixtureWalletAccount {
    async fn charge(
        &self,
        user_id: UserId,
        amount: i64,
        _idempotency_key: Option<String>,
    ) -> Result<ChargeResponse, Error> {
        if amount <= 0 {
            return Err(Error::invalid_request("charge amount must be positive"));
        }
        Ok(ChargeResponse {
            user_id,
            balance: amount,
        })
    }

    async fn balance(&self, user_id: UserId) -> Result<ChargeResponse, Error> {
        Ok(ChargeResponse {
            user_id,
            balance: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_accepts_positive_charges() {
        let account = FixtureWalletAccount;
        let user = UserId::random();
        let response = account
            .charge(user, 50_000, None)
            .await
            .expect("charge succeeds");
        assert_eq!(response.user_id, user);
        assert_eq!(response.balance, 50_000);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[tokio::test]
    async fn fixture_rejects_non_positive_charges(#[case] amount: i64) {
        let account = FixtureWalletAccount;
        assert!(account.charge(UserId::random(), amount, None).await.is_err());
    }
}
