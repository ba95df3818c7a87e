//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate with
//! `diesel print-schema` or update by hand.

diesel::table! {
    /// Concert catalogue.
    concerts (id) {
        /// Primary key, assigned by the sequence.
        id -> Int8,
        /// Display title.
        title -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dated performances of a concert.
    concert_schedules (id) {
        id -> Int8,
        /// Owning concert.
        concert_id -> Int8,
        /// Performance date; unique per concert.
        performance_date -> Date,
        /// Fixed seat count for the venue.
        total_seats -> Int4,
    }
}

diesel::table! {
    /// Seat reservations across all lifecycle states.
    ///
    /// A partial unique index on `(schedule_id, seat_number)` where
    /// `status = 'CONFIRMED'` enforces one confirmed owner per seat.
    reservations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Schedule the seat belongs to.
        schedule_id -> Int8,
        /// Seat number within the venue layout.
        seat_number -> Int4,
        /// Price paid (or to be paid) in whole won.
        price -> Int8,
        /// Lifecycle status in store form.
        status -> Varchar,
        /// When the seat was first claimed.
        reserved_at -> Timestamptz,
    }
}

diesel::table! {
    /// Wallet balances, one row per user.
    wallets (user_id) {
        user_id -> Uuid,
        /// Current balance in whole won; never negative.
        balance -> Int8,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only wallet movement ledger.
    ///
    /// A unique index on `(user_id, idempotency_key)` (where the key is
    /// not null) makes charge and payment replays detectable.
    wallet_ledger (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        user_id -> Uuid,
        /// Movement kind in store form: CHARGE, PAYMENT, or REFUND.
        kind -> Varchar,
        /// Unsigned movement amount in whole won.
        amount -> Int8,
        /// Client-supplied replay guard, if any.
        idempotency_key -> Nullable<Varchar>,
        /// When the movement was recorded.
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(concert_schedules -> concerts (concert_id));
diesel::joinable!(wallet_ledger -> wallets (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    concerts,
    concert_schedules,
    reservations,
    wallets,
    wallet_ledger,
);
