//! Driven port for wallet balances and the ledger.

use async_trait::async_trait;

use crate::domain::money::Money;
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by wallet repository adapters.
    pub enum WalletRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "wallet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "wallet repository query failed: {message}",
        /// Debit rejected: the balance cannot cover the amount.
        InsufficientBalance { balance: i64, required: i64 } =>
            "insufficient balance: have {balance}, need {required}",
        /// Debit rejected: the user has no wallet at all.
        WalletNotFound { message: String } =>
            "wallet not found: {message}",
    }
}

/// Port for wallet mutations.
///
/// Charge and debit are transactional in the adapter: balance update and
/// ledger append commit together, and an idempotency key seen before
/// returns the current balance without a second mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Current balance; zero for unknown wallets.
    async fn balance(&self, user_id: UserId) -> Result<Money, WalletRepositoryError>;

    /// Whether the ledger already holds an entry for this idempotency key.
    async fn key_recorded(
        &self,
        user_id: UserId,
        idempotency_key: &str,
    ) -> Result<bool, WalletRepositoryError>;

    /// Idempotent top-up creating the wallet on first use; returns the
    /// balance after the charge.
    async fn charge(
        &self,
        user_id: UserId,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError>;

    /// Idempotent debit; returns the balance after the payment.
    async fn debit(
        &self,
        user_id: UserId,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError>;

    /// Credit a refund; returns the balance after the refund.
    async fn refund(
        &self,
        user_id: UserId,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError>;
}

/// Fixture wallet with an inexhaustible balance.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWalletRepository;

const FIXTURE_BALANCE: i64 = 1_000_000;

#[async_trait]
impl WalletRepository for FixtureWalletRepository {
    async fn balance(&self, _user_id: UserId) -> Result<Money, WalletRepositoryError> {
        Money::new(FIXTURE_BALANCE).map_err(|err| WalletRepositoryError::query(err.to_string()))
    }

    async fn key_recorded(
        &self,
        _user_id: UserId,
        _idempotency_key: &str,
    ) -> Result<bool, WalletRepositoryError> {
        Ok(false)
    }

    async fn charge(
        &self,
        _user_id: UserId,
        amount: Money,
        _idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        Money::new(FIXTURE_BALANCE)
            .map(|balance| balance.saturating_add(amount))
            .map_err(|err| WalletRepositoryError::query(err.to_string()))
    }

    async fn debit(
        &self,
        _user_id: UserId,
        amount: Money,
        _idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        let balance =
            Money::new(FIXTURE_BALANCE).map_err(|err| WalletRepositoryError::query(err.to_string()))?;
        balance
            .checked_sub(amount)
            .ok_or(WalletRepositoryError::InsufficientBalance {
                balance: FIXTURE_BALANCE,
                required: amount.amount(),
            })
    }

    async fn refund(
        &self,
        _user_id: UserId,
        amount: Money,
        _idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        Money::new(FIXTURE_BALANCE)
            .map(|balance| balance.saturating_add(amount))
            .map_err(|err| WalletRepositoryError::query(err.to_string()))
    }
}
