//! Concert catalogue HTTP handlers.
//!
//! ```text
//! GET /api/concerts
//! GET /api/concerts/{id}/schedules
//! GET /api/concerts/{id}/seats?date=
//! ```

use actix_web::{get, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::{AvailableSeatsResponse, ConcertSummary, SchedulePayload};
use crate::domain::{ConcertId, Error};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters for seat availability.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SeatsQuery {
    /// Performance date, `YYYY-MM-DD`.
    pub date: String,
}

/// List all concerts on sale.
#[utoipa::path(
    get,
    path = "/api/concerts",
    tags = ["concerts"],
    responses(
        (status = 200, description = "Concert listing", body = [ConcertSummary])
    )
)]
#[get("/concerts")]
pub async fn list_concerts(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let concerts = state.catalogue.list_concerts().await?;
    Ok(HttpResponse::Ok().json(concerts))
}

/// List the dated schedules of one concert.
#[utoipa::path(
    get,
    path = "/api/concerts/{id}/schedules",
    tags = ["concerts"],
    params(("id" = i64, Path, description = "Concert id")),
    responses(
        (status = 200, description = "Schedule listing", body = [SchedulePayload])
    )
)]
#[get("/concerts/{id}/schedules")]
pub async fn list_schedules(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let schedules = state
        .catalogue
        .list_schedules(ConcertId(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(schedules))
}

/// List seats still open for a concert's schedule on a date.
#[utoipa::path(
    get,
    path = "/api/concerts/{id}/seats",
    tags = ["concerts"],
    params(("id" = i64, Path, description = "Concert id"), SeatsQuery),
    responses(
        (status = 200, description = "Open seat numbers", body = AvailableSeatsResponse),
        (status = 400, description = "Malformed date", body = Error),
        (status = 404, description = "No schedule on that date", body = Error)
    )
)]
#[get("/concerts/{id}/seats")]
pub async fn available_seats(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    query: web::Query<SeatsQuery>,
) -> ApiResult<HttpResponse> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|err| Error::invalid_request(format!("date must be YYYY-MM-DD: {err}")))?;

    let seats = state
        .catalogue
        .available_seats(ConcertId(path.into_inner()), date)
        .await?;
    Ok(HttpResponse::Ok().json(seats))
}
