//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{concert_schedules, concerts, reservations, wallet_ledger, wallets};

/// Row struct for reading from the concerts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = concerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConcertRow {
    pub id: i64,
    pub title: String,
    #[expect(dead_code, reason = "schema field used only for ordering")]
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the concert_schedules table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = concert_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleRow {
    pub id: i64,
    pub concert_id: i64,
    pub performance_date: NaiveDate,
    pub total_seats: i32,
}

/// Row struct for reading from the reservations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub schedule_id: i64,
    pub seat_number: i32,
    pub price: i64,
    pub status: String,
    pub reserved_at: DateTime<Utc>,
}

/// Insertable struct for creating reservation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub(crate) struct NewReservationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub schedule_id: i64,
    pub seat_number: i32,
    pub price: i64,
    pub status: &'a str,
    pub reserved_at: DateTime<Utc>,
}

/// Row struct for reading from the wallets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletRow {
    #[expect(dead_code, reason = "row is keyed by the lookup filter")]
    pub user_id: Uuid,
    pub balance: i64,
    #[expect(dead_code, reason = "schema field for audit only")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating wallet rows on first charge.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallets)]
pub(crate) struct NewWalletRow {
    pub user_id: Uuid,
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger movements.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallet_ledger)]
pub(crate) struct NewLedgerRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub amount: i64,
    pub idempotency_key: Option<&'a str>,
    pub recorded_at: DateTime<Utc>,
}
