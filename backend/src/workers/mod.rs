//! Background loops keeping the queue, reservations, and rankings current.
//!
//! Each worker is an infinite loop driven by a tokio interval. Failures are
//! logged and the loop carries on; a worker never takes the process down.
//! The ranking listener is the one exception to the interval pattern: it
//! drains the reservation event channel and stops when the channel closes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    ConcertRepository, DistributedLock, QueueStore, RankingStore, ReservationRepository,
    QUEUE_ACTIVATION_LOCK_KEY,
};
use crate::domain::{QueuePolicy, RankingService, ReservationEvent, ReservationPolicy};

/// How often the promotion worker refills the active set.
pub const PROMOTION_INTERVAL: Duration = Duration::from_secs(1);
/// How often overdue temporary reservations are expired.
pub const RESERVATION_CLEANUP_INTERVAL: Duration = Duration::from_secs(10);
/// How often dead tokens are swept out of the queue collections.
pub const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// TTL on the promotion lock; generously above one pass's runtime.
const PROMOTION_LOCK_TTL: Duration = Duration::from_secs(5);

/// Promote waiting tokens into free active slots, forever.
pub async fn run_queue_promotion<S, L>(store: Arc<S>, lock: Arc<L>, policy: QueuePolicy)
where
    S: QueueStore,
    L: DistributedLock,
{
    let mut ticker = tokio::time::interval(PROMOTION_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match promote_once(store.as_ref(), lock.as_ref(), &policy).await {
            Ok(0) => {}
            Ok(promoted) => info!(promoted, "promoted waiting tokens"),
            Err(error) => warn!(%error, "queue promotion pass failed"),
        }
    }
}

/// One promotion pass; returns how many tokens were activated.
///
/// The pass is serialised across instances by the activation lock. A
/// contended lock means another instance is already promoting, so the
/// pass simply yields.
async fn promote_once<S, L>(
    store: &S,
    lock: &L,
    policy: &QueuePolicy,
) -> Result<u32, PromotionError>
where
    S: QueueStore + ?Sized,
    L: DistributedLock + ?Sized,
{
    let counts = store.counts().await?;
    let free_slots = u64::from(policy.max_active_users).saturating_sub(counts.active);
    let batch = free_slots
        .min(u64::from(policy.promotion_batch))
        .min(counts.waiting) as u32;
    if batch == 0 {
        return Ok(0);
    }

    let lease = match lock
        .acquire(
            QUEUE_ACTIVATION_LOCK_KEY,
            PROMOTION_LOCK_TTL,
            0,
            Duration::ZERO,
        )
        .await
    {
        Ok(lease) => lease,
        Err(crate::domain::ports::LockError::Contended { .. }) => {
            debug!("activation lock contended, skipping promotion pass");
            return Ok(0);
        }
        Err(error) => return Err(error.into()),
    };

    let promoted = store.activate_next(batch).await;
    if let Err(release_error) = lock.release(&lease).await {
        warn!(%release_error, "failed to release activation lock");
    }
    Ok(promoted?)
}

/// Errors raised inside one promotion pass.
#[derive(Debug, thiserror::Error)]
enum PromotionError {
    #[error(transparent)]
    Store(#[from] crate::domain::ports::QueueStoreError),
    #[error(transparent)]
    Lock(#[from] crate::domain::ports::LockError),
}

/// Expire temporary reservations whose hold window has lapsed, forever.
pub async fn run_reservation_cleanup<R>(repo: Arc<R>, policy: ReservationPolicy)
where
    R: ReservationRepository,
{
    let mut ticker = tokio::time::interval(RESERVATION_CLEANUP_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let cutoff = Utc::now()
            - chrono::Duration::from_std(policy.hold_ttl).unwrap_or(chrono::Duration::zero());
        match repo.expire_overdue(cutoff).await {
            Ok(0) => {}
            Ok(expired) => info!(expired, "expired overdue reservations"),
            Err(error) => warn!(%error, "reservation cleanup pass failed"),
        }
    }
}

/// Sweep queue members whose token records expired, forever.
pub async fn run_token_sweep<S>(store: Arc<S>)
where
    S: QueueStore,
{
    let mut ticker = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match store.purge_missing().await {
            Ok(0) => {}
            Ok(swept) => info!(swept, "swept dead queue tokens"),
            Err(error) => warn!(%error, "token sweep pass failed"),
        }
    }
}

/// Apply reservation events to the ranking store until the channel closes.
pub async fn run_ranking_listener<S, C>(
    service: RankingService<S, C>,
    mut receiver: mpsc::Receiver<ReservationEvent>,
) where
    S: RankingStore,
    C: ConcertRepository,
{
    while let Some(event) = receiver.recv().await {
        if let Err(err) = service.apply(&event).await {
            error!(
                schedule_id = %event.schedule_id(),
                error = %err,
                "failed to apply reservation event to rankings"
            );
        }
    }
    info!("reservation event channel closed, ranking listener stopping");
}
