//! PostgreSQL-backed `WalletRepository` implementation using Diesel ORM.
//!
//! Every mutation runs in one transaction: the wallet row is locked with
//! `FOR UPDATE`, the balance is updated, and a ledger row is appended, so
//! the balance and the ledger can never drift apart. When an idempotency
//! key has been seen before, the mutation short-circuits and returns the
//! current balance.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{WalletRepository, WalletRepositoryError};
use crate::domain::{LedgerEntry, LedgerEntryKind, Money, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewLedgerRow, NewWalletRow, WalletRow};
use super::pool::{DbPool, PoolError};
use super::schema::{wallet_ledger, wallets};

/// Diesel-backed implementation of the wallet repository port.
#[derive(Clone)]
pub struct DieselWalletRepository {
    pool: DbPool,
}

impl DieselWalletRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn apply(
        &self,
        user_id: UserId,
        kind: LedgerEntryKind,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction::<i64, TxError, _>(|conn| {
                async move {
                    if let Some(key) = idempotency_key.as_deref() {
                        if let Some(balance) = replayed_balance(conn, user_id, key).await? {
                            return Ok(balance);
                        }
                    }

                    let balance = mutate_balance(conn, user_id, kind, amount).await?;
                    let entry = LedgerEntry::record(user_id, kind, amount, idempotency_key);
                    append_ledger_row(conn, &entry).await?;
                    Ok(balance)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(balance) => {
                Money::new(balance).map_err(|err| WalletRepositoryError::query(err.to_string()))
            }
            Err(TxError::Domain(err)) => Err(err),
            Err(TxError::Diesel(err)) => Err(map_diesel_error(err)),
        }
    }
}

/// Transaction-internal error carrying either a Diesel failure (which
/// rolls the transaction back) or an already-mapped domain error.
enum TxError {
    Diesel(diesel::result::Error),
    Domain(WalletRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> WalletRepositoryError {
    map_basic_pool_error(error, WalletRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WalletRepositoryError {
    map_basic_diesel_error(
        error,
        WalletRepositoryError::query,
        WalletRepositoryError::connection,
    )
}

/// Balance to return when the idempotency key was already recorded,
/// `None` when the key is new.
async fn replayed_balance(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    key: &str,
) -> Result<Option<i64>, TxError> {
    let seen: i64 = wallet_ledger::table
        .filter(wallet_ledger::user_id.eq(user_id.as_uuid()))
        .filter(wallet_ledger::idempotency_key.eq(key))
        .count()
        .get_result(conn)
        .await?;
    if seen == 0 {
        return Ok(None);
    }

    let balance: Option<i64> = wallets::table
        .find(user_id.as_uuid())
        .select(wallets::balance)
        .first(conn)
        .await
        .optional()?;
    Ok(Some(balance.unwrap_or(0)))
}

/// Lock the wallet row and apply the movement; returns the new balance.
async fn mutate_balance(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    kind: LedgerEntryKind,
    amount: Money,
) -> Result<i64, TxError> {
    let wallet: Option<WalletRow> = wallets::table
        .find(user_id.as_uuid())
        .select(WalletRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;

    let Some(wallet) = wallet else {
        // Only a charge may create the wallet.
        if kind != LedgerEntryKind::Charge {
            return Err(TxError::Domain(WalletRepositoryError::wallet_not_found(
                user_id.to_string(),
            )));
        }
        let row = NewWalletRow {
            user_id: *user_id.as_uuid(),
            balance: amount.amount(),
            updated_at: Utc::now(),
        };
        diesel::insert_into(wallets::table)
            .values(&row)
            .execute(conn)
            .await?;
        return Ok(amount.amount());
    };

    let balance = wallet.balance.saturating_add(kind.signed_delta(amount));
    if balance < 0 {
        return Err(TxError::Domain(WalletRepositoryError::InsufficientBalance {
            balance: wallet.balance,
            required: amount.amount(),
        }));
    }
    update_balance(conn, user_id, balance).await?;
    Ok(balance)
}

async fn update_balance(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    balance: i64,
) -> Result<(), diesel::result::Error> {
    diesel::update(wallets::table.find(user_id.as_uuid()))
        .set((
            wallets::balance.eq(balance),
            wallets::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn append_ledger_row(
    conn: &mut AsyncPgConnection,
    entry: &LedgerEntry,
) -> Result<(), diesel::result::Error> {
    let row = NewLedgerRow {
        id: entry.id,
        user_id: *entry.user_id.as_uuid(),
        kind: entry.kind.as_str(),
        amount: entry.amount.amount(),
        idempotency_key: entry.idempotency_key.as_deref(),
        recorded_at: entry.recorded_at,
    };
    diesel::insert_into(wallet_ledger::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl WalletRepository for DieselWalletRepository {
    async fn balance(&self, user_id: UserId) -> Result<Money, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let balance: Option<i64> = wallets::table
            .find(user_id.as_uuid())
            .select(wallets::balance)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Money::new(balance.unwrap_or(0))
            .map_err(|err| WalletRepositoryError::query(err.to_string()))
    }

    async fn key_recorded(
        &self,
        user_id: UserId,
        idempotency_key: &str,
    ) -> Result<bool, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let seen: i64 = wallet_ledger::table
            .filter(wallet_ledger::user_id.eq(user_id.as_uuid()))
            .filter(wallet_ledger::idempotency_key.eq(idempotency_key))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(seen > 0)
    }

    async fn charge(
        &self,
        user_id: UserId,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        self.apply(user_id, LedgerEntryKind::Charge, amount, idempotency_key)
            .await
    }

    async fn debit(
        &self,
        user_id: UserId,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        self.apply(user_id, LedgerEntryKind::Payment, amount, idempotency_key)
            .await
    }

    async fn refund(
        &self,
        user_id: UserId,
        amount: Money,
        idempotency_key: Option<String>,
    ) -> Result<Money, WalletRepositoryError> {
        self.apply(user_id, LedgerEntryKind::Refund, amount, idempotency_key)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn diesel_errors_convert_into_tx_errors() {
        let tx: TxError = diesel::result::Error::NotFound.into();
        assert!(matches!(tx, TxError::Diesel(diesel::result::Error::NotFound)));
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("pool exhausted"));
        assert!(matches!(mapped, WalletRepositoryError::Connection { .. }));
    }
}
