//! Tests for the wallet service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::MockWalletRepository;
use crate::domain::ErrorCode;

#[tokio::test]
async fn charge_forwards_amount_and_key() {
    let user = UserId::random();

    let mut repo = MockWalletRepository::new();
    repo.expect_charge()
        .withf(move |id, amount, key| {
            *id == user && amount.amount() == 50_000 && key.as_deref() == Some("top-up-1")
        })
        .times(1)
        .returning(|_, amount, _| Ok(amount));

    let service = WalletService::new(Arc::new(repo));
    let response = service
        .charge(user, 50_000, Some("top-up-1".to_owned()))
        .await
        .expect("charge succeeds");

    assert_eq!(response.user_id, user);
    assert_eq!(response.balance, 50_000);
}

#[tokio::test]
async fn charge_rejects_non_positive_amounts() {
    let mut repo = MockWalletRepository::new();
    repo.expect_charge().times(0);

    let service = WalletService::new(Arc::new(repo));
    let error = service
        .charge(UserId::random(), 0, None)
        .await
        .expect_err("zero charge");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn balance_defaults_missing_wallets_via_repository() {
    let mut repo = MockWalletRepository::new();
    repo.expect_balance().return_once(|_| Ok(Money::ZERO));

    let service = WalletService::new(Arc::new(repo));
    let response = service
        .balance(UserId::random())
        .await
        .expect("balance succeeds");

    assert_eq!(response.balance, 0);
}

#[tokio::test]
async fn repository_outage_maps_to_service_unavailable() {
    let mut repo = MockWalletRepository::new();
    repo.expect_balance()
        .return_once(|_| Err(WalletRepositoryError::connection("pool exhausted")));

    let service = WalletService::new(Arc::new(repo));
    let error = service
        .balance(UserId::random())
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
