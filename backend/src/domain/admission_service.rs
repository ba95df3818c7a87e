//! Queue admission domain service.
//!
//! Implements the [`Admission`] driving port over a [`QueueStore`]. The
//! store makes the admit-or-wait decision; this service shapes responses
//! and resolves tokens to users for the reservation flow.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    Admission, IssueTokenResponse, QueueStatusResponse, QueueStore, QueueStoreError,
    TokenStatusResponse,
};
use crate::domain::queue::{QueuePolicy, QueueToken, TokenStatus};
use crate::domain::user::UserId;
use crate::domain::Error;

fn map_store_error(error: QueueStoreError) -> Error {
    match error {
        QueueStoreError::Backend { message } => {
            Error::service_unavailable(format!("queue store unavailable: {message}"))
        }
    }
}

/// Admission service backed by the queue store.
#[derive(Clone)]
pub struct AdmissionService<S> {
    queue_store: Arc<S>,
    policy: QueuePolicy,
}

impl<S> AdmissionService<S> {
    /// Create a new admission service with the default queue policy.
    pub fn new(queue_store: Arc<S>) -> Self {
        Self::with_policy(queue_store, QueuePolicy::default())
    }

    /// Create a new admission service with an explicit policy.
    pub fn with_policy(queue_store: Arc<S>, policy: QueuePolicy) -> Self {
        Self {
            queue_store,
            policy,
        }
    }
}

#[async_trait]
impl<S> Admission for AdmissionService<S>
where
    S: QueueStore,
{
    async fn issue_token(&self, user_id: UserId) -> Result<IssueTokenResponse, Error> {
        let issued = self
            .queue_store
            .issue(user_id)
            .await
            .map_err(map_store_error)?;

        tracing::info!(user_id = %user_id, status = issued.status.as_str(), "queue token issued");

        Ok(IssueTokenResponse {
            token: issued.token.as_str().to_owned(),
            status: issued.status,
        })
    }

    async fn token_status(&self, token: QueueToken) -> Result<TokenStatusResponse, Error> {
        let snapshot = self
            .queue_store
            .snapshot(&token)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("queue token not found or expired"))?;

        let estimated_wait_minutes = snapshot
            .waiting_position
            .map(|position| self.policy.estimated_wait_minutes(position));

        Ok(TokenStatusResponse {
            token: token.as_str().to_owned(),
            status: snapshot.status,
            waiting_position: snapshot.waiting_position,
            estimated_wait_minutes,
        })
    }

    async fn queue_status(&self) -> Result<QueueStatusResponse, Error> {
        let counts = self.queue_store.counts().await.map_err(map_store_error)?;
        let available_slots = u64::from(self.policy.max_active_users).saturating_sub(counts.active);
        Ok(QueueStatusResponse {
            active_users: counts.active,
            waiting_users: counts.waiting,
            available_slots,
            estimated_wait_minutes: self.policy.estimated_wait_minutes(counts.waiting),
        })
    }

    async fn authorize(&self, token: QueueToken) -> Result<UserId, Error> {
        let snapshot = self
            .queue_store
            .snapshot(&token)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::unauthorized("queue token not found or expired"))?;

        if snapshot.status != TokenStatus::Active {
            return Err(Error::forbidden("queue token is not active yet"));
        }

        snapshot
            .user_id
            .ok_or_else(|| Error::unauthorized("queue token has no associated user"))
    }

    async fn complete(&self, token: QueueToken) -> Result<(), Error> {
        self.queue_store
            .expire(&token)
            .await
            .map_err(map_store_error)?;
        tracing::info!(token = token.as_str(), "queue token retired after booking");
        Ok(())
    }
}

#[cfg(test)]
#[path = "admission_service_tests.rs"]
mod tests;
