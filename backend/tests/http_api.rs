//! End-to-end HTTP tests over the fixture-backed application.
//!
//! These exercise routing, extractors, and error mapping through the full
//! actix stack without requiring PostgreSQL or Redis.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::Value;

use boxoffice::inbound::http::concerts::{available_seats, list_concerts, list_schedules};
use boxoffice::inbound::http::health::{live, ready, HealthState};
use boxoffice::inbound::http::meta::version;
use boxoffice::inbound::http::queue::{issue_token, queue_status, token_status};
use boxoffice::inbound::http::queue_token::QUEUE_TOKEN_HEADER;
use boxoffice::inbound::http::rankings::fast_selling;
use boxoffice::inbound::http::reservations::{cancel, confirm, hold_seat};
use boxoffice::inbound::http::state::HttpState;
use boxoffice::inbound::http::wallet::{balance, charge};
use boxoffice::middleware::trace::TRACE_ID_HEADER;
use boxoffice::Trace;

const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();

    let api = web::scope("/api")
        .service(issue_token)
        .service(token_status)
        .service(queue_status)
        .service(list_concerts)
        .service(list_schedules)
        .service(available_seats)
        .service(hold_seat)
        .service(confirm)
        .service(cancel)
        .service(charge)
        .service(balance)
        .service(fast_selling);

    App::new()
        .app_data(health_state)
        .app_data(web::Data::new(HttpState::fixtures()))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
        .service(version)
}

#[actix_web::test]
async fn queue_token_lifecycle() {
    let app = test::init_service(app()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/queue/token?userId={USER_ID}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    let token = body["token"].as_str().expect("token issued").to_owned();
    assert_eq!(body["status"], "ACTIVE");

    let req = test::TestRequest::get()
        .uri(&format!("/api/queue/token/{token}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ACTIVE");
}

#[actix_web::test]
async fn queue_status_reports_counters() {
    let app = test::init_service(app()).await;
    let req = test::TestRequest::get()
        .uri("/api/queue/status")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["availableSlots"].is_u64());
    assert!(body["estimatedWaitMinutes"].is_u64());
}

#[actix_web::test]
async fn concert_discovery_flow() {
    let app = test::init_service(app()).await;

    let req = test::TestRequest::get().uri("/api/concerts").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let concerts = body.as_array().expect("concert list");
    assert!(!concerts.is_empty());

    let concert_id = concerts[0]["id"].as_i64().expect("concert id");
    let req = test::TestRequest::get()
        .uri(&format!("/api/concerts/{concert_id}/schedules"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/concerts/{concert_id}/seats?date=2025-12-24"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["availableSeats"].as_array().expect("seat list").len(),
        50
    );
}

#[actix_web::test]
async fn malformed_seat_date_is_rejected() {
    let app = test::init_service(app()).await;
    let req = test::TestRequest::get()
        .uri("/api/concerts/1/seats?date=christmas")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn reservations_require_a_queue_token() {
    let app = test::init_service(app()).await;
    let req = test::TestRequest::post()
        .uri("/api/reservations/hold")
        .set_json(serde_json::json!({"scheduleId": 1, "seatNumber": 7}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(TRACE_ID_HEADER));
}

#[actix_web::test]
async fn hold_confirm_cancel_flow() {
    let app = test::init_service(app()).await;

    let req = test::TestRequest::post()
        .uri("/api/reservations/hold")
        .insert_header((QUEUE_TOKEN_HEADER, "fixture-token"))
        .set_json(serde_json::json!({"scheduleId": 1, "seatNumber": 7}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["seatNumber"], 7);
    assert_eq!(body["price"], 80_000);
    assert!(body["expiresAt"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/reservations/confirm")
        .insert_header((QUEUE_TOKEN_HEADER, "fixture-token"))
        .insert_header(("Idempotency-Key", "pay-1"))
        .set_json(serde_json::json!({"scheduleId": 1, "seatNumber": 7}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "CONFIRMED");
    let reservation_id = body["reservationId"].as_str().expect("id").to_owned();

    let req = test::TestRequest::post()
        .uri(&format!("/api/reservations/{reservation_id}/cancel"))
        .insert_header((QUEUE_TOKEN_HEADER, "fixture-token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["reservationId"], reservation_id.as_str());
}

#[actix_web::test]
async fn out_of_range_seat_is_rejected() {
    let app = test::init_service(app()).await;
    let req = test::TestRequest::post()
        .uri("/api/reservations/hold")
        .insert_header((QUEUE_TOKEN_HEADER, "fixture-token"))
        .set_json(serde_json::json!({"scheduleId": 1, "seatNumber": 51}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn wallet_charge_and_balance() {
    let app = test::init_service(app()).await;

    let req = test::TestRequest::post()
        .uri("/api/wallet/charge")
        .set_json(serde_json::json!({"userId": USER_ID, "amount": 50_000}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["balance"].as_i64().expect("balance") > 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/wallet/{USER_ID}/balance"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/wallet/charge")
        .set_json(serde_json::json!({"userId": USER_ID, "amount": 0}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn rankings_validate_the_limit() {
    let app = test::init_service(app()).await;

    let req = test::TestRequest::get()
        .uri("/api/rankings/fast-selling")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/rankings/fast-selling?limit=0")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn probes_and_version_respond() {
    let app = test::init_service(app()).await;

    for uri in ["/healthz/ready", "/healthz/live"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "probe {uri}");
    }

    let req = test::TestRequest::get().uri("/meta/version").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(!body["commitHash"].as_str().expect("hash").is_empty());
}
