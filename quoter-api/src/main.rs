use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use quoter_api::{app, AppState, AuthConfig};
use quoter_core::repository::{CalculationRepository, RateLimiter, UserRepository};
use quoter_store::{
    Config, DbClient, MemoryCalculationRepository, MemoryRateLimiter, MemoryUserRepository, RedisClient,
    StoreCalculationRepository, StoreUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quoter_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting pricing calculator on port {}", config.server.port);

    // Ledger and accounts
    let (calculations, users): (Arc<dyn CalculationRepository>, Arc<dyn UserRepository>) =
        match &config.database.url {
            Some(url) => {
                let db = DbClient::new(url).await.context("Failed to connect to Postgres")?;
                db.migrate().await.context("Failed to run migrations")?;
                let calculations: Arc<dyn CalculationRepository> =
                    Arc::new(StoreCalculationRepository::new(db.pool.clone()));
                let users: Arc<dyn UserRepository> = Arc::new(StoreUserRepository::new(db.pool));
                (calculations, users)
            }
            None => {
                tracing::warn!("No database configured; history and accounts are kept in memory");
                let calculations: Arc<dyn CalculationRepository> = Arc::new(MemoryCalculationRepository::new());
                let users: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::new());
                (calculations, users)
            }
        };

    // Rate limit counters
    let limiter: Arc<dyn RateLimiter> = match &config.redis.url {
        Some(url) => {
            let redis = RedisClient::new(url).await.context("Invalid Redis URL")?;
            if let Err(e) = redis.ping().await {
                tracing::warn!("Redis not reachable yet, rate limiting will fail open: {}", e);
            }
            Arc::new(redis)
        }
        None => Arc::new(MemoryRateLimiter::new()),
    };

    let app_state = AppState {
        calculations,
        users,
        limiter,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            bcrypt_cost: config.auth.bcrypt_cost,
        },
        rate_limits: config.rate_limits.clone(),
        metrics: Arc::new(quoter_api::metrics::Metrics::new()?),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
