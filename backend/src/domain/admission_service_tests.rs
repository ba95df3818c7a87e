//! Tests for the admission service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{IssuedToken, MockQueueStore, QueueCounts, TokenSnapshot};
use crate::domain::ErrorCode;

#[tokio::test]
async fn issue_token_returns_store_decision() {
    let mut store = MockQueueStore::new();
    store.expect_issue().times(1).return_once(|_| {
        Ok(IssuedToken {
            token: QueueToken::from_raw("tok-1"),
            status: TokenStatus::Waiting,
        })
    });

    let service = AdmissionService::new(Arc::new(store));
    let response = service
        .issue_token(UserId::random())
        .await
        .expect("issue succeeds");

    assert_eq!(response.token, "tok-1");
    assert_eq!(response.status, TokenStatus::Waiting);
}

#[tokio::test]
async fn token_status_includes_wait_estimate_for_waiting_tokens() {
    let mut store = MockQueueStore::new();
    store.expect_snapshot().return_once(|_| {
        Ok(Some(TokenSnapshot {
            status: TokenStatus::Waiting,
            user_id: Some(UserId::random()),
            waiting_position: Some(60),
        }))
    });

    let service = AdmissionService::new(Arc::new(store));
    let response = service
        .token_status(QueueToken::from_raw("tok-2"))
        .await
        .expect("status succeeds");

    assert_eq!(response.waiting_position, Some(60));
    assert_eq!(response.estimated_wait_minutes, Some(10));
}

#[tokio::test]
async fn token_status_maps_missing_tokens_to_not_found() {
    let mut store = MockQueueStore::new();
    store.expect_snapshot().return_once(|_| Ok(None));

    let service = AdmissionService::new(Arc::new(store));
    let error = service
        .token_status(QueueToken::from_raw("gone"))
        .await
        .expect_err("missing token");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn queue_status_reports_counters() {
    let mut store = MockQueueStore::new();
    store.expect_counts().return_once(|| {
        Ok(QueueCounts {
            active: 100,
            waiting: 300,
        })
    });

    let service = AdmissionService::new(Arc::new(store));
    let response = service.queue_status().await.expect("status succeeds");

    assert_eq!(response.active_users, 100);
    assert_eq!(response.waiting_users, 300);
    assert_eq!(response.available_slots, 0);
    assert_eq!(response.estimated_wait_minutes, 50);
}

#[tokio::test]
async fn authorize_rejects_waiting_tokens() {
    let mut store = MockQueueStore::new();
    store.expect_snapshot().return_once(|_| {
        Ok(Some(TokenSnapshot {
            status: TokenStatus::Waiting,
            user_id: Some(UserId::random()),
            waiting_position: Some(1),
        }))
    });

    let service = AdmissionService::new(Arc::new(store));
    let error = service
        .authorize(QueueToken::from_raw("tok-3"))
        .await
        .expect_err("waiting token rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn authorize_resolves_active_tokens_to_their_user() {
    let user = UserId::random();
    let mut store = MockQueueStore::new();
    store.expect_snapshot().return_once(move |_| {
        Ok(Some(TokenSnapshot {
            status: TokenStatus::Active,
            user_id: Some(user),
            waiting_position: None,
        }))
    });

    let service = AdmissionService::new(Arc::new(store));
    let resolved = service
        .authorize(QueueToken::from_raw("tok-4"))
        .await
        .expect("active token authorises");

    assert_eq!(resolved, user);
}

#[tokio::test]
async fn complete_expires_the_token() {
    let mut store = MockQueueStore::new();
    store
        .expect_expire()
        .times(1)
        .withf(|token| token.as_str() == "tok-5")
        .return_once(|_| Ok(()));

    let service = AdmissionService::new(Arc::new(store));
    service
        .complete(QueueToken::from_raw("tok-5"))
        .await
        .expect("complete succeeds");
}

#[tokio::test]
async fn store_failures_surface_as_service_unavailable() {
    let mut store = MockQueueStore::new();
    store
        .expect_counts()
        .return_once(|| Err(QueueStoreError::backend("redis down")));

    let service = AdmissionService::new(Arc::new(store));
    let error = service.queue_status().await.expect_err("backend error");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
