//! Queue admission HTTP handlers.
//!
//! ```text
//! POST /api/queue/token?userId=
//! GET  /api/queue/token/{token}
//! GET  /api/queue/status
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::{IssueTokenResponse, QueueStatusResponse, TokenStatusResponse};
use crate::domain::{Error, QueueToken, UserId};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters for issuing a queue token.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenQuery {
    /// User requesting admission.
    pub user_id: String,
}

/// Issue a queue token for a user, or return their existing one.
#[utoipa::path(
    post,
    path = "/api/queue/token",
    tags = ["queue"],
    params(IssueTokenQuery),
    responses(
        (status = 201, description = "Token issued", body = IssueTokenResponse),
        (status = 400, description = "Malformed user id", body = Error),
        (status = 503, description = "Queue store unavailable", body = Error)
    )
)]
#[post("/queue/token")]
pub async fn issue_token(
    state: web::Data<HttpState>,
    query: web::Query<IssueTokenQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::parse(&query.user_id)
        .map_err(|err| Error::invalid_request(format!("userId must be a UUID: {err}")))?;

    let response = state.admission.issue_token(user_id).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Report a token's queue position and status.
#[utoipa::path(
    get,
    path = "/api/queue/token/{token}",
    tags = ["queue"],
    params(("token" = String, Path, description = "Queue token to inspect")),
    responses(
        (status = 200, description = "Token status", body = TokenStatusResponse),
        (status = 404, description = "Unknown or expired token", body = Error)
    )
)]
#[get("/queue/token/{token}")]
pub async fn token_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let token = QueueToken::from_raw(path.into_inner());
    let response = state.admission.token_status(token).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Report aggregate queue load.
#[utoipa::path(
    get,
    path = "/api/queue/status",
    tags = ["queue"],
    responses(
        (status = 200, description = "Queue counters", body = QueueStatusResponse),
        (status = 503, description = "Queue store unavailable", body = Error)
    )
)]
#[get("/queue/status")]
pub async fn queue_status(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let response = state.admission.queue_status().await?;
    Ok(HttpResponse::Ok().json(response))
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
            .service(web::scope("/api").service(issue_token).service(token_status).service(queue_status))
    }

    #[actix_web::test]
    async fn issue_token_returns_created() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::post()
            .uri("/api/queue/token?userId=3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn issue_token_rejects_non_uuid_users() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::post()
            .uri("/api/queue/token?userId=42")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn queue_status_is_public() {
        let app = test::init_service(app_with_fixtures()).await;
        let req = test::TestRequest::get().uri("/api/queue/status").to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
    }
}
