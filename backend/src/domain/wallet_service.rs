//! Wallet domain service.
//!
//! Implements the [`WalletAccount`] driving port over the wallet
//! repository. Validation stops non-positive amounts here; idempotency is
//! the repository's concern because the dedupe check must share the
//! transaction with the ledger append.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::money::Money;
use crate::domain::ports::{
    ChargeResponse, WalletAccount, WalletRepository, WalletRepositoryError,
};
use crate::domain::user::UserId;
use crate::domain::Error;

fn map_repository_error(error: WalletRepositoryError) -> Error {
    match error {
        WalletRepositoryError::InsufficientBalance { balance, required } => {
            Error::conflict("insufficient balance")
                .with_details(json!({ "balance": balance, "required": required }))
        }
        WalletRepositoryError::WalletNotFound { message } => {
            Error::not_found(format!("wallet not found: {message}"))
        }
        WalletRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("wallet repository unavailable: {message}"))
        }
        WalletRepositoryError::Query { message } => {
            Error::internal(format!("wallet repository error: {message}"))
        }
    }
}

/// Wallet service backed by the wallet repository.
#[derive(Clone)]
pub struct WalletService<W> {
    wallet_repo: Arc<W>,
}

impl<W> WalletService<W> {
    /// Create a new wallet service.
    pub fn new(wallet_repo: Arc<W>) -> Self {
        Self { wallet_repo }
    }
}

#[async_trait]
impl<W> WalletAccount for WalletService<W>
where
    W: WalletRepository,
{
    async fn charge(
        &self,
        user_id: UserId,
        amount: i64,
        idempotency_key: Option<String>,
    ) -> Result<ChargeResponse, Error> {
        if amount <= 0 {
            return Err(Error::invalid_request("charge amount must be positive"));
        }
        let amount = Money::new(amount)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let balance = self
            .wallet_repo
            .charge(user_id, amount, idempotency_key)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(user_id = %user_id, amount = amount.amount(), "wallet charged");

        Ok(ChargeResponse {
            user_id,
            balance: balance.amount(),
        })
    }

    async fn balance(&self, user_id: UserId) -> Result<ChargeResponse, Error> {
        let balance = self
            .wallet_repo
            .balance(user_id)
            .await
            .map_err(map_repository_error)?;

        Ok(ChargeResponse {
            user_id,
            balance: balance.amount(),
        })
    }
}

#[cfg(test)]
#[path = "wallet_service_tests.rs"]
mod tests;
