//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};

use boxoffice::domain::ports::{
    Admission, Booking, Catalogue, EventPublisher, RankingQuery, WalletAccount,
};
use boxoffice::domain::{
    AdmissionService, BookingService, CatalogueService, RankingService, WalletService,
};
use boxoffice::inbound::http::concerts::{available_seats, list_concerts, list_schedules};
use boxoffice::inbound::http::health::{live, ready, HealthState};
use boxoffice::inbound::http::meta::version;
use boxoffice::inbound::http::queue::{issue_token, queue_status, token_status};
use boxoffice::inbound::http::rankings::fast_selling;
use boxoffice::inbound::http::reservations::{cancel, confirm, hold_seat};
use boxoffice::inbound::http::state::HttpState;
use boxoffice::inbound::http::wallet::{balance, charge};
use boxoffice::outbound::persistence::{
    DieselConcertRepository, DieselReservationRepository, DieselWalletRepository,
};
use boxoffice::outbound::redis::{
    RedisDistributedLock, RedisQueueStore, RedisRankingStore, RedisSeatHoldStore,
};
use boxoffice::Trace;

#[cfg(debug_assertions)]
use boxoffice::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build the HTTP port bundle from the configured backends.
///
/// Both pools must be present for the real adapters; anything less wires
/// the fixture set, which keeps local smoke runs and handler tests working
/// without infrastructure.
fn build_http_state(config: &ServerConfig, events: Arc<dyn EventPublisher>) -> HttpState {
    let (Some(db_pool), Some(redis_pool)) = (&config.db_pool, &config.redis_pool) else {
        return HttpState::fixtures();
    };

    let concert_repo = Arc::new(DieselConcertRepository::new(db_pool.clone()));
    let reservation_repo = Arc::new(DieselReservationRepository::new(db_pool.clone()));
    let wallet_repo = Arc::new(DieselWalletRepository::new(db_pool.clone()));
    let queue_store = Arc::new(RedisQueueStore::with_policy(
        redis_pool.clone(),
        config.queue_policy,
    ));
    let seat_holds = Arc::new(RedisSeatHoldStore::new(redis_pool.clone()));
    let ranking_store = Arc::new(RedisRankingStore::new(redis_pool.clone()));
    let lock = Arc::new(RedisDistributedLock::new(redis_pool.clone()));

    let admission: Arc<dyn Admission> = Arc::new(AdmissionService::with_policy(
        queue_store,
        config.queue_policy,
    ));
    let booking: Arc<dyn Booking> = Arc::new(
        BookingService::new(
            Arc::clone(&concert_repo),
            Arc::clone(&reservation_repo),
            Arc::clone(&seat_holds),
            Arc::clone(&wallet_repo),
            lock,
            events,
        )
        .with_policy(config.reservation_policy),
    );
    let catalogue: Arc<dyn Catalogue> = Arc::new(CatalogueService::new(
        Arc::clone(&concert_repo),
        reservation_repo,
        seat_holds,
    ));
    let rankings: Arc<dyn RankingQuery> =
        Arc::new(RankingService::new(ranking_store, concert_repo));
    let wallet: Arc<dyn WalletAccount> = Arc::new(WalletService::new(wallet_repo));

    HttpState::new(admission, booking, catalogue, rankings, wallet)
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
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

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
        .service(version);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config, Arc::clone(&config.events)));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
