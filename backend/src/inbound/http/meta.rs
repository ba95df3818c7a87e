//! Build metadata endpoint.
//!
//! ```text
//! GET /meta/version
//! ```
//!
//! Mounted at the root next to the health probes, outside the token-gated
//! `/api` scope.

use actix_web::{get, HttpResponse};

use crate::version::VersionInfo;

/// Report the running build's package version and commit hash.
#[utoipa::path(
    get,
    path = "/meta/version",
    tags = ["meta"],
    responses(
        (status = 200, description = "Build metadata", body = VersionInfo)
    )
)]
#[get("/meta/version")]
pub async fn version() -> HttpResponse {
    HttpResponse::Ok().json(VersionInfo::current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn version_reports_a_non_empty_commit() {
        let app = test::init_service(App::new().service(version)).await;
        let req = test::TestRequest::get().uri("/meta/version").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["commitHash"].as_str().is_some_and(|s| !s.is_empty()));
        assert!(body["packageVersion"].as_str().is_some_and(|s| !s.is_empty()));
    }
}
