//! Ranking HTTP handlers.
//!
//! ```text
//! GET /api/rankings/fast-selling?limit=
//! ```

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, RankingEntry};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Query parameters for the fast-selling ranking.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RankingQueryParams {
    /// Maximum entries to return; defaults to 10, capped at 100.
    pub limit: Option<usize>,
}

/// List the schedules selling fastest right now.
#[utoipa::path(
    get,
    path = "/api/rankings/fast-selling",
    tags = ["rankings"],
    params(RankingQueryParams),
    responses(
        (status = 200, description = "Ranking entries, fastest first", body = [RankingEntry]),
        (status = 400, description = "Limit out of range", body = Error),
        (status = 503, description = "Ranking store unavailable", body = Error)
    )
)]
#[get("/rankings/fast-selling")]
pub async fn fast_selling(
    state: web::Data<HttpState>,
    query: web::Query<RankingQueryParams>,
) -> ApiResult<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(Error::invalid_request(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let entries = state.rankings.fast_selling(limit).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
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
        App::new()
            .app_data(web::Data::new(HttpState::fixtures()))
            .service(web::scope("/api").service(fast_selling))
    }

    #[actix_web::test]
    async fn default_limit_returns_ok() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::get()
            .uri("/api/rankings/fast-selling")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
    }

    #[actix_web::test]
    async fn zero_limit_is_rejected() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::get()
            .uri("/api/rankings/fast-selling?limit=0")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
