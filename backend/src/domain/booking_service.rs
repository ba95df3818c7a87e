//! Reservation domain service.
//!
//! Implements the [`Booking`] driving port: temporary seat holds, payment
//! and confirmation, and cancellation with refund. A per-seat distributed
//! lock keeps the check-then-claim sequences atomic across instances;
//! confirmed and cancelled reservations are announced on the event
//! publisher for the ranking pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::concert::ConcertSchedule;
use crate::domain::events::ReservationEvent;
use crate::domain::money::Money;
use crate::domain::ports::{
    seat_lock_key, Booking, CancelResponse, ConcertRepository, ConcertRepositoryError,
    ConfirmRequest, ConfirmResponse, DistributedLock, EventPublisher, HoldSeatRequest,
    HoldSeatResponse, LockError, LockLease, ReservationRepository, ReservationRepositoryError,
    SeatHoldStore, SeatHoldStoreError, WalletRepository, WalletRepositoryError,
};
use crate::domain::reservation::{Reservation, ReservationPolicy, ReservationStatus, SeatIdentifier};
use crate::domain::user::UserId;
use crate::domain::Error;

const SEAT_LOCK_TTL: Duration = Duration::from_secs(3);
const SEAT_LOCK_RETRIES: u32 = 3;
const SEAT_LOCK_RETRY_DELAY: Duration = Duration::from_millis(100);

fn map_concert_error(error: ConcertRepositoryError) -> Error {
    match error {
        ConcertRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("concert repository unavailable: {message}"))
        }
        ConcertRepositoryError::Query { message } => {
            Error::internal(format!("concert repository error: {message}"))
        }
    }
}

fn map_reservation_error(error: ReservationRepositoryError) -> Error {
    match error {
        ReservationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reservation repository unavailable: {message}"))
        }
        ReservationRepositoryError::Query { message } => {
            Error::internal(format!("reservation repository error: {message}"))
        }
        ReservationRepositoryError::DuplicateSeat { message } => {
            Error::conflict(format!("seat already confirmed: {message}"))
        }
    }
}

fn map_hold_error(error: SeatHoldStoreError) -> Error {
    match error {
        SeatHoldStoreError::Backend { message } => {
            Error::service_unavailable(format!("seat hold store unavailable: {message}"))
        }
    }
}

fn map_wallet_error(error: WalletRepositoryError) -> Error {
    match error {
        WalletRepositoryError::InsufficientBalance { balance, required } => {
            Error::conflict("insufficient balance")
                .with_details(json!({ "balance": balance, "required": required }))
        }
        WalletRepositoryError::WalletNotFound { message } => {
            Error::conflict(format!("wallet not found: {message}"))
        }
        WalletRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("wallet repository unavailable: {message}"))
        }
        WalletRepositoryError::Query { message } => {
            Error::internal(format!("wallet repository error: {message}"))
        }
    }
}

fn map_lock_error(error: LockError) -> Error {
    match error {
        LockError::Contended { key, attempts } => Error::conflict(format!(
            "seat is being processed by another request (lock {key}, {attempts} attempts)"
        )),
        LockError::Backend { message } => {
            Error::service_unavailable(format!("lock backend unavailable: {message}"))
        }
    }
}

/// Booking service coordinating holds, payment, and reservation rows.
#[derive(Clone)]
pub struct BookingService<C, R, H, W, L> {
    concert_repo: Arc<C>,
    reservation_repo: Arc<R>,
    seat_holds: Arc<H>,
    wallet_repo: Arc<W>,
    lock: Arc<L>,
    events: Arc<dyn EventPublisher>,
    policy: ReservationPolicy,
}

impl<C, R, H, W, L> BookingService<C, R, H, W, L> {
    /// Create a new booking service with the default reservation policy.
    pub fn new(
        concert_repo: Arc<C>,
        reservation_repo: Arc<R>,
        seat_holds: Arc<H>,
        wallet_repo: Arc<W>,
        lock: Arc<L>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            concert_repo,
            reservation_repo,
            seat_holds,
            wallet_repo,
            lock,
            events,
            policy: ReservationPolicy::default(),
        }
    }

    /// Override the reservation policy.
    pub fn with_policy(mut self, policy: ReservationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<C, R, H, W, L> BookingService<C, R, H, W, L>
where
    C: ConcertRepository,
    R: ReservationRepository,
    H: SeatHoldStore,
    W: WalletRepository,
    L: DistributedLock,
{
    async fn schedule_or_not_found(
        &self,
        seat: SeatIdentifier,
    ) -> Result<ConcertSchedule, Error> {
        self.concert_repo
            .find_schedule(seat.schedule_id)
            .await
            .map_err(map_concert_error)?
            .ok_or_else(|| Error::not_found(format!("schedule {} not found", seat.schedule_id)))
    }

    async fn ensure_seat_unsold(&self, seat: SeatIdentifier) -> Result<(), Error> {
        let sold = self
            .reservation_repo
            .find_confirmed(seat)
            .await
            .map_err(map_reservation_error)?;
        if sold.is_some() {
            return Err(Error::conflict(format!("seat {seat} is already reserved")));
        }
        Ok(())
    }

    /// Lock loss after the critical section is survivable; the TTL will
    /// clear a lease the backend refused to delete.
    async fn release_lock(&self, lease: &LockLease) {
        match self.lock.release(lease).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(key = %lease.key, "seat lock expired before release"),
            Err(error) => {
                tracing::warn!(key = %lease.key, %error, "seat lock release failed");
            }
        }
    }
}

#[async_trait]
impl<C, R, H, W, L> Booking for BookingService<C, R, H, W, L>
where
    C: ConcertRepository,
    R: ReservationRepository,
    H: SeatHoldStore,
    W: WalletRepository,
    L: DistributedLock,
{
    async fn hold_seat(
        &self,
        user_id: UserId,
        request: HoldSeatRequest,
    ) -> Result<HoldSeatResponse, Error> {
        let seat = request.seat()?;
        self.schedule_or_not_found(seat).await?;

        let lease = self
            .lock
            .acquire(
                &seat_lock_key(seat),
                SEAT_LOCK_TTL,
                SEAT_LOCK_RETRIES,
                SEAT_LOCK_RETRY_DELAY,
            )
            .await
            .map_err(map_lock_error)?;

        let outcome = async {
            self.ensure_seat_unsold(seat).await?;

            let claimed = self
                .seat_holds
                .try_hold(seat, user_id, self.policy.hold_ttl)
                .await
                .map_err(map_hold_error)?;
            if !claimed {
                return Err(Error::conflict(format!(
                    "seat {seat} is held by another user"
                )));
            }

            // The temporary row is what the cleanup worker expires when the
            // hold lapses without payment.
            self.reservation_repo
                .insert(&Reservation::temporary(user_id, seat, self.policy.seat_price))
                .await
                .map_err(map_reservation_error)?;
            Ok(())
        }
        .await;

        self.release_lock(&lease).await;
        outcome?;

        let hold_ttl = chrono::Duration::from_std(self.policy.hold_ttl)
            .map_err(|err| Error::internal(format!("hold ttl out of range: {err}")))?;

        tracing::info!(user_id = %user_id, seat = %seat, "seat held");

        Ok(HoldSeatResponse {
            schedule_id: seat.schedule_id.0,
            seat_number: seat.seat_number.value(),
            price: self.policy.seat_price.amount(),
            expires_at: Utc::now() + hold_ttl,
        })
    }

    async fn confirm(
        &self,
        user_id: UserId,
        request: ConfirmRequest,
    ) -> Result<ConfirmResponse, Error> {
        let seat = request.seat()?;
        self.schedule_or_not_found(seat).await?;

        let lease = self
            .lock
            .acquire(
                &seat_lock_key(seat),
                SEAT_LOCK_TTL,
                SEAT_LOCK_RETRIES,
                SEAT_LOCK_RETRY_DELAY,
            )
            .await
            .map_err(map_lock_error)?;

        let outcome = self
            .confirm_under_lock(user_id, seat, request.idempotency_key.clone())
            .await;

        self.release_lock(&lease).await;
        outcome
    }

    async fn cancel(
        &self,
        user_id: UserId,
        reservation_id: Uuid,
    ) -> Result<CancelResponse, Error> {
        let mut reservation = self
            .reservation_repo
            .find_by_id(&reservation_id)
            .await
            .map_err(map_reservation_error)?
            .ok_or_else(|| Error::not_found(format!("reservation {reservation_id} not found")))?;

        if reservation.user_id != user_id {
            return Err(Error::forbidden("reservation belongs to another user"));
        }

        reservation
            .cancel()
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.reservation_repo
            .update_status(&reservation_id, ReservationStatus::Cancelled)
            .await
            .map_err(map_reservation_error)?;

        self.wallet_repo
            .refund(user_id, reservation.price, None)
            .await
            .map_err(map_wallet_error)?;

        self.events.publish(ReservationEvent::Cancelled {
            reservation_id,
            user_id,
            seat: reservation.seat,
            cancelled_at: Utc::now(),
        });

        tracing::info!(
            user_id = %user_id,
            reservation_id = %reservation_id,
            refunded = reservation.price.amount(),
            "reservation cancelled"
        );

        Ok(CancelResponse {
            reservation_id,
            status: ReservationStatus::Cancelled,
            refunded: reservation.price.amount(),
        })
    }
}

impl<C, R, H, W, L> BookingService<C, R, H, W, L>
where
    C: ConcertRepository,
    R: ReservationRepository,
    H: SeatHoldStore,
    W: WalletRepository,
    L: DistributedLock,
{
    async fn confirm_under_lock(
        &self,
        user_id: UserId,
        seat: SeatIdentifier,
        idempotency_key: Option<String>,
    ) -> Result<ConfirmResponse, Error> {
        if let Some(existing) = self
            .reservation_repo
            .find_confirmed(seat)
            .await
            .map_err(map_reservation_error)?
        {
            return self.replay_or_conflict(user_id, existing, idempotency_key).await;
        }

        let held = self
            .seat_holds
            .is_held_by(seat, user_id)
            .await
            .map_err(map_hold_error)?;
        if !held {
            return Err(Error::conflict(format!(
                "no active hold on seat {seat} for this user"
            )));
        }

        let price = self.policy.seat_price;
        let balance = self
            .wallet_repo
            .debit(user_id, price, idempotency_key)
            .await
            .map_err(map_wallet_error)?;

        let paid_at = Utc::now();
        let reservation = match self.persist_confirmation(user_id, seat, price).await {
            Ok(reservation) => reservation,
            Err(error) => {
                // Undo the payment; the seat was lost to a concurrent confirm.
                if let Err(refund_error) = self.wallet_repo.refund(user_id, price, None).await {
                    tracing::error!(
                        user_id = %user_id,
                        seat = %seat,
                        error = %refund_error,
                        "refund after failed reservation write did not complete"
                    );
                }
                return Err(map_reservation_error(error));
            }
        };

        if let Err(error) = self.seat_holds.release(seat).await {
            tracing::warn!(seat = %seat, error = %error, "hold release after confirm failed");
        }

        self.events.publish(ReservationEvent::Confirmed {
            reservation_id: reservation.id,
            user_id,
            seat,
            confirmed_at: paid_at,
        });

        tracing::info!(
            user_id = %user_id,
            seat = %seat,
            reservation_id = %reservation.id,
            "reservation confirmed"
        );

        Ok(ConfirmResponse {
            reservation_id: reservation.id,
            schedule_id: seat.schedule_id.0,
            seat_number: seat.seat_number.value(),
            status: reservation.status,
            price: price.amount(),
            balance: balance.amount(),
            paid_at,
        })
    }

    /// Replay the caller's own earlier confirm, or report the seat as
    /// taken. Replays are recognised by the payment's ledger key, so a
    /// retried request returns the stored outcome without a second debit.
    async fn replay_or_conflict(
        &self,
        user_id: UserId,
        existing: Reservation,
        idempotency_key: Option<String>,
    ) -> Result<ConfirmResponse, Error> {
        let replayed = match idempotency_key.as_deref() {
            Some(key) if existing.user_id == user_id => self
                .wallet_repo
                .key_recorded(user_id, key)
                .await
                .map_err(map_wallet_error)?,
            _ => false,
        };
        if !replayed {
            return Err(Error::conflict(format!(
                "seat {} is already reserved",
                existing.seat
            )));
        }

        let balance = self
            .wallet_repo
            .balance(user_id)
            .await
            .map_err(map_wallet_error)?;

        tracing::info!(
            user_id = %user_id,
            reservation_id = %existing.id,
            "confirm replayed from the ledger"
        );

        Ok(ConfirmResponse {
            reservation_id: existing.id,
            schedule_id: existing.seat.schedule_id.0,
            seat_number: existing.seat.seat_number.value(),
            status: existing.status,
            price: existing.price.amount(),
            balance: balance.amount(),
            paid_at: existing.reserved_at,
        })
    }

    /// Promote the caller's temporary row to confirmed, or insert a fresh
    /// confirmed row when the temporary one already expired.
    async fn persist_confirmation(
        &self,
        user_id: UserId,
        seat: SeatIdentifier,
        price: Money,
    ) -> Result<Reservation, ReservationRepositoryError> {
        if let Some(mut held) = self.reservation_repo.find_temporary(seat).await? {
            if held.user_id == user_id {
                self.reservation_repo
                    .update_status(&held.id, ReservationStatus::Confirmed)
                    .await?;
                held.status = ReservationStatus::Confirmed;
                return Ok(held);
            }
        }
        let reservation = Reservation::confirmed(user_id, seat, price);
        self.reservation_repo.insert(&reservation).await?;
        Ok(reservation)
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
