//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers all HTTP endpoints from the
//! inbound layer together with the request and response schemas they use,
//! plus the queue token security scheme carried in the `X-Queue-Token`
//! header. The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    AvailableSeatsResponse, CancelResponse, ChargeResponse, ConcertSummary, ConfirmRequest,
    ConfirmResponse, HoldSeatRequest, HoldSeatResponse, IssueTokenResponse, QueueStatusResponse,
    SchedulePayload, TokenStatusResponse,
};
use crate::domain::{Error, ErrorCode, RankingEntry, ReservationStatus, TokenStatus};
use crate::inbound::http::queue_token::QUEUE_TOKEN_HEADER;
use crate::inbound::http::wallet::ChargeRequestBody;
use crate::version::VersionInfo;

/// Enrich the generated document with the queue token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "QueueToken",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                QUEUE_TOKEN_HEADER,
                "Waiting queue token issued by POST /api/queue/token.",
            ))),
        );
    }
}

/// OpenAPI document for the ticketing API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Boxoffice API",
        description = "HTTP interface for queue admission, seat reservation, \
                       wallet payment, and sales rankings."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::queue::issue_token,
        crate::inbound::http::queue::token_status,
        crate::inbound::http::queue::queue_status,
        crate::inbound::http::concerts::list_concerts,
        crate::inbound::http::concerts::list_schedules,
        crate::inbound::http::concerts::available_seats,
        crate::inbound::http::reservations::hold_seat,
        crate::inbound::http::reservations::confirm,
        crate::inbound::http::reservations::cancel,
        crate::inbound::http::wallet::charge,
        crate::inbound::http::wallet::balance,
        crate::inbound::http::rankings::fast_selling,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::meta::version,
    ),
    components(schemas(
        Error,
        ErrorCode,
        TokenStatus,
        ReservationStatus,
        IssueTokenResponse,
        TokenStatusResponse,
        QueueStatusResponse,
        ConcertSummary,
        SchedulePayload,
        AvailableSeatsResponse,
        HoldSeatRequest,
        HoldSeatResponse,
        ConfirmRequest,
        ConfirmResponse,
        CancelResponse,
        ChargeRequestBody,
        ChargeResponse,
        RankingEntry,
        VersionInfo,
    )),
    tags(
        (name = "queue", description = "Waiting queue admission"),
        (name = "concerts", description = "Concert and seat discovery"),
        (name = "reservations", description = "Seat holds and confirmed bookings"),
        (name = "wallet", description = "Prepaid balance management"),
        (name = "rankings", description = "Fast-selling concert rankings"),
        (name = "health", description = "Endpoints for health checks"),
        (name = "meta", description = "Build metadata")
    )
)]
pub struct ApiDoc;
