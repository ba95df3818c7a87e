//! Driving port for queue admission.
//!
//! Entry to the booking flow is gated by a waiting queue. Callers obtain a
//! token, poll its status until it turns active, and pass it with every
//! reservation request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::queue::{QueueToken, TokenStatus};
use crate::domain::user::UserId;
use crate::domain::Error;

/// Response to issuing or re-fetching a queue token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenResponse {
    pub token: String,
    pub status: TokenStatus,
}

/// Position report for a token still in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusResponse {
    pub token: String,
    pub status: TokenStatus,
    /// 1-based position among waiting tokens; absent once active.
    pub waiting_position: Option<u64>,
    pub estimated_wait_minutes: Option<u64>,
}

/// Aggregate queue load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusResponse {
    pub active_users: u64,
    pub waiting_users: u64,
    /// Admission slots still open before new tokens start waiting.
    pub available_slots: u64,
    /// Wait estimate for a token joining the queue now.
    pub estimated_wait_minutes: u64,
}

/// Driving port for queue admission operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Admission: Send + Sync {
    /// Issues a token for the user, or returns their existing one.
    async fn issue_token(&self, user_id: UserId) -> Result<IssueTokenResponse, Error>;

    /// Reports the token's status and queue position.
    async fn token_status(&self, token: QueueToken) -> Result<TokenStatusResponse, Error>;

    /// Reports aggregate active and waiting counts.
    async fn queue_status(&self) -> Result<QueueStatusResponse, Error>;

    /// Returns the user behind an active token, or an error when the token
    /// is unknown, expired, or still waiting.
    async fn authorize(&self, token: QueueToken) -> Result<UserId, Error>;

    /// Retires a token once its holder has finished booking, freeing an
    /// admission slot for the next waiting user.
    async fn complete(&self, token: QueueToken) -> Result<(), Error>;
}

/// Fixture admission that waves everyone straight through.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdmission;

#[async_trait]
impl Admission for FixtureAdmission {
    async fn issue_token(&self, _user_id: UserId) -> Result<IssueTokenResponse, Error> {
        let token = QueueToken::generate();
        Ok(IssueTokenResponse {
            token: token.as_str().to_owned(),
            status: TokenStatus::Active,
        })
    }

    async fn token_status(&self, token: QueueToken) -> Result<TokenStatusResponse, Error> {
        Ok(TokenStatusResponse {
            token: token.as_str().to_owned(),
            status: TokenStatus::Active,
            waiting_position: None,
            estimated_wait_minutes: None,
        })
    }

    async fn queue_status(&self) -> Result<QueueStatusResponse, Error> {
        Ok(QueueStatusResponse {
            active_users: 0,
            waiting_users: 0,
            available_slots: 100,
            estimated_wait_minutes: 0,
        })
    }

    async fn authorize(&self, _token: QueueToken) -> Result<UserId, Error> {
        Ok(UserId::random())
    }

    async fn complete(&self, _token: QueueToken) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_issues_active_tokens() {
        let admission = FixtureAdmission;
        let response = admission
            .issue_token(UserId::random())
            .await
            .expect("fixture issue succeeds");

        assert_eq!(response.status, TokenStatus::Active);
        assert!(!response.token.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_no_waiting_position() {
        let admission = FixtureAdmission;
        let response = admission
            .token_status(QueueToken::generate())
            .await
            .expect("fixture status succeeds");

        assert_eq!(response.status, TokenStatus::Active);
        assert!(response.waiting_position.is_none());
    }

    #[rstest]
    fn issue_response_serialises_camel_case() {
        let response = IssueTokenResponse {
            token: "abc".to_owned(),
            status: TokenStatus::Waiting,
        };
        let json = serde_json::to_value(&response).expect("serialise");
        assert_eq!(json["status"], "WAITING");
    }
}
