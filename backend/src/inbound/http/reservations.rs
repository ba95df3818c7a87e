//! Reservation HTTP handlers.
//!
//! ```text
//! POST /api/reservations/hold
//! POST /api/reservations/confirm
//! POST /api/reservations/{id}/cancel
//! ```
//!
//! All three require an active `X-Queue-Token`; confirm additionally takes
//! an optional `Idempotency-Key` header for the payment.

use actix_web::{post, web, HttpResponse};
use uuid::Uuid;

use crate::domain::ports::{
    CancelResponse, ConfirmRequest, ConfirmResponse, HoldSeatRequest, HoldSeatResponse,
};
use crate::domain::Error;
use crate::inbound::http::queue_token::{IdempotencyKeyHeader, QueueTokenHeader};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Place a temporary hold on a seat.
#[utoipa::path(
    post,
    path = "/api/reservations/hold",
    tags = ["reservations"],
    request_body = HoldSeatRequest,
    responses(
        (status = 200, description = "Seat held", body = HoldSeatResponse),
        (status = 401, description = "Missing or unknown queue token", body = Error),
        (status = 403, description = "Queue token not active", body = Error),
        (status = 409, description = "Seat held or sold", body = Error)
    )
)]
#[post("/reservations/hold")]
pub async fn hold_seat(
    state: web::Data<HttpState>,
    token: QueueTokenHeader,
    body: web::Json<HoldSeatRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = state.admission.authorize(token.into_token()).await?;
    let response = state.booking.hold_seat(user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Pay for a held seat and confirm the reservation.
#[utoipa::path(
    post,
    path = "/api/reservations/confirm",
    tags = ["reservations"],
    request_body = ConfirmRequest,
    responses(
        (status = 201, description = "Reservation confirmed", body = ConfirmResponse),
        (status = 401, description = "Missing or unknown queue token", body = Error),
        (status = 403, description = "Queue token not active", body = Error),
        (status = 409, description = "Hold lost, seat sold, or balance short", body = Error)
    )
)]
#[post("/reservations/confirm")]
pub async fn confirm(
    state: web::Data<HttpState>,
    token: QueueTokenHeader,
    idempotency: IdempotencyKeyHeader,
    body: web::Json<ConfirmRequest>,
) -> ApiResult<HttpResponse> {
    let token = token.into_token();
    let user_id = state.admission.authorize(token.clone()).await?;

    // Header key wins over any body-supplied key.
    let mut request = body.into_inner();
    if let Some(key) = idempotency.into_key() {
        request.idempotency_key = Some(key);
    }

    let response = state.booking.confirm(user_id, request).await?;

    // The booking is committed; a failed token retirement only delays the
    // next promotion sweep.
    if let Err(error) = state.admission.complete(token).await {
        tracing::warn!(%error, "failed to retire queue token after confirmation");
    }

    Ok(HttpResponse::Created().json(response))
}

/// Cancel a confirmed reservation and refund the payment.
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/cancel",
    tags = ["reservations"],
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation cancelled", body = CancelResponse),
        (status = 403, description = "Reservation belongs to another user", body = Error),
        (status = 404, description = "Unknown reservation", body = Error),
        (status = 409, description = "Reservation not cancellable", body = Error)
    )
)]
#[post("/reservations/{id}/cancel")]
pub async fn cancel(
    state: web::Data<HttpState>,
    token: QueueTokenHeader,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = state.admission.authorize(token.into_token()).await?;
    let response = state.booking.cancel(user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::queue_token::QUEUE_TOKEN_HEADER;
    use actix_web::{test, App};

    fn app_with_fixtures() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(HttpState::fixtures())).service(
            web::scope("/api")
                .service(hold_seat)
                .service(confirm)
                .service(cancel),
        )
    }

    #[actix_web::test]
    async fn hold_requires_the_queue_token_header() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::post()
            .uri("/api/reservations/hold")
            .set_json(HoldSeatRequest {
                schedule_id: 1,
                seat_number: 7,
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn hold_succeeds_with_an_active_token() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::post()
            .uri("/api/reservations/hold")
            .insert_header((QUEUE_TOKEN_HEADER, "tok-1"))
            .set_json(HoldSeatRequest {
                schedule_id: 1,
                seat_number: 7,
            })
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["seatNumber"], 7);
    }

    #[actix_web::test]
    async fn confirm_returns_created() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::post()
            .uri("/api/reservations/confirm")
            .insert_header((QUEUE_TOKEN_HEADER, "tok-1"))
            .insert_header(("Idempotency-Key", "pay-1"))
            .set_json(ConfirmRequest {
                schedule_id: 1,
                seat_number: 7,
                idempotency_key: None,
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn cancel_round_trips_the_reservation_id() {
        let app = test::init_service(app_with_fixtures()).await;
        let id = Uuid::new_v4();
        let req = test::TestRequest::post()
            .uri(&format!("/api/reservations/{id}/cancel"))
            .insert_header((QUEUE_TOKEN_HEADER, "tok-1"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reservationId"], id.to_string());
    }
}
