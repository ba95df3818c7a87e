//! Wallet HTTP handlers.
//!
//! ```text
//! POST /api/wallet/charge
//! GET  /api/wallet/{userId}/balance
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ChargeResponse;
use crate::domain::{Error, UserId};
use crate::inbound::http::queue_token::IdempotencyKeyHeader;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for topping up a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequestBody {
    pub user_id: UserId,
    /// Amount to add, in whole won.
    pub amount: i64,
}

/// Top up a wallet.
#[utoipa::path(
    post,
    path = "/api/wallet/charge",
    tags = ["wallet"],
    request_body = ChargeRequestBody,
    responses(
        (status = 200, description = "Balance after the charge", body = ChargeResponse),
        (status = 400, description = "Non-positive amount", body = Error),
        (status = 503, description = "Wallet store unavailable", body = Error)
    )
)]
#[post("/wallet/charge")]
pub async fn charge(
    state: web::Data<HttpState>,
    idempotency: IdempotencyKeyHeader,
    body: web::Json<ChargeRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let response = state
        .wallet
        .charge(body.user_id, body.amount, idempotency.into_key())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Read a wallet balance.
#[utoipa::path(
    get,
    path = "/api/wallet/{userId}/balance",
    tags = ["wallet"],
    params(("userId" = Uuid, Path, description = "Wallet owner")),
    responses(
        (status = 200, description = "Current balance", body = ChargeResponse),
        (status = 400, description = "Malformed user id", body = Error)
    )
)]
#[get("/wallet/{userId}/balance")]
pub async fn balance(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::parse(&path.into_inner())
        .map_err(|err| Error::invalid_request(format!("userId must be a UUID: {err}")))?;
    let response = state.wallet.balance(user_id).await?;
    Ok(HttpResponse::Ok().json(response))
}
