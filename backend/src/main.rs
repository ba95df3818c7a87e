//! Backend entry-point: wires HTTP endpoints, workers, and OpenAPI docs.

mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use clap::Parser;
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use boxoffice::domain::ports::EventPublisher;
use boxoffice::domain::{QueuePolicy, RankingService, ReservationPolicy};
use boxoffice::inbound::http::health::HealthState;
use boxoffice::outbound::events::{reservation_event_channel, EVENT_CHANNEL_CAPACITY};
use boxoffice::outbound::persistence::{
    DbPool, DieselConcertRepository, DieselReservationRepository,
};
use boxoffice::outbound::redis::{
    build_pool, RedisDistributedLock, RedisPool, RedisQueueStore, RedisRankingStore,
};
use boxoffice::workers;

use server::ServerConfig;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Concert ticketing backend.
#[derive(Debug, Parser)]
#[command(name = "boxoffice", about = "Concert ticketing backend")]
struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// PostgreSQL connection URL; fixtures are used when absent.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Redis connection URL; fixtures are used when absent.
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Maximum PostgreSQL connections in the pool.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    db_pool_size: u32,

    /// Maximum Redis connections in the pool.
    #[arg(long, env = "REDIS_POOL_SIZE", default_value_t = 16)]
    redis_pool_size: u32,

    /// Skip running pending database migrations at startup.
    #[arg(long, env = "SKIP_MIGRATIONS", default_value_t = false)]
    skip_migrations: bool,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let health_state = web::Data::new(HealthState::new());

    let db_pool = match &cli.database_url {
        Some(url) => {
            if !cli.skip_migrations {
                run_migrations(url)?;
            }
            let pool = DbPool::connect(url, cli.db_pool_size)
                .await
                .map_err(std::io::Error::other)?;
            Some(pool)
        }
        None => {
            warn!("no DATABASE_URL configured, using fixture repositories");
            None
        }
    };

    let redis_pool = match &cli.redis_url {
        Some(url) => {
            let pool = build_pool(url, cli.redis_pool_size)
                .await
                .map_err(std::io::Error::other)?;
            Some(pool)
        }
        None => {
            warn!("no REDIS_URL configured, using fixture stores");
            None
        }
    };

    let queue_policy = QueuePolicy::default();
    let reservation_policy = ReservationPolicy::default();

    let mut config = ServerConfig::new(cli.bind_addr)
        .with_queue_policy(queue_policy)
        .with_reservation_policy(reservation_policy);

    if let (Some(db_pool), Some(redis_pool)) = (db_pool, redis_pool) {
        let events = spawn_workers(&db_pool, &redis_pool, queue_policy, reservation_policy);
        config = config
            .with_db_pool(db_pool)
            .with_redis_pool(redis_pool)
            .with_events(events);
    }

    info!(bind_addr = %config.bind_addr(), "starting server");
    let server = server::create_server(health_state, config)?;
    server.await
}

/// Start the background loops and return the booking event publisher.
fn spawn_workers(
    db_pool: &DbPool,
    redis_pool: &RedisPool,
    queue_policy: QueuePolicy,
    reservation_policy: ReservationPolicy,
) -> Arc<dyn EventPublisher> {
    let queue_store = Arc::new(RedisQueueStore::with_policy(redis_pool.clone(), queue_policy));
    let lock = Arc::new(RedisDistributedLock::new(redis_pool.clone()));
    let reservation_repo = Arc::new(DieselReservationRepository::new(db_pool.clone()));
    let ranking = RankingService::new(
        Arc::new(RedisRankingStore::new(redis_pool.clone())),
        Arc::new(DieselConcertRepository::new(db_pool.clone())),
    );

    let (publisher, receiver) = reservation_event_channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(workers::run_queue_promotion(
        Arc::clone(&queue_store),
        lock,
        queue_policy,
    ));
    tokio::spawn(workers::run_token_sweep(queue_store));
    tokio::spawn(workers::run_reservation_cleanup(
        reservation_repo,
        reservation_policy,
    ));
    tokio::spawn(workers::run_ranking_listener(ranking, receiver));

    Arc::new(publisher)
}

/// Apply pending migrations over a blocking connection before the pool and
/// the async runtime start depending on the schema.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}
