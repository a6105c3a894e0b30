use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{debug, info};

use stock_trader_backend::app;
use stock_trader_backend::config::{AppConfig, PriceFeed, StoreBackend};
use stock_trader_backend::external::failure_aware::FailureAwareProvider;
use stock_trader_backend::external::financial_modeling::FinancialModelingProvider;
use stock_trader_backend::external::price_provider::PriceProvider;
use stock_trader_backend::external::simulated::SimulatedProvider;
use stock_trader_backend::logging::{init_logging, LoggingConfig};
use stock_trader_backend::services::failure_cache::FailureCache;
use stock_trader_backend::services::password_hasher::Argon2PasswordHasher;
use stock_trader_backend::services::session_service::SessionManager;
use stock_trader_backend::state::AppState;
use stock_trader_backend::store::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow::anyhow!("logging init failed: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let accounts: Arc<dyn AccountRepository> = match &config.store {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to PostgreSQL")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            info!("🗄️ Using PostgreSQL account store");
            Arc::new(PostgresAccountRepository::new(pool))
        }
        StoreBackend::Memory => {
            info!("🗄️ Using in-memory account store, data is lost on restart");
            Arc::new(InMemoryAccountRepository::new())
        }
    };

    let feed: Box<dyn PriceProvider> = match &config.price_feed {
        PriceFeed::FinancialModelingPrep(api) => {
            info!("📈 Using price provider: Financial Modeling Prep at {}", api.base_url);
            Box::new(FinancialModelingProvider::new(api))
        }
        PriceFeed::Simulated { volatility } => {
            info!("📈 Using price provider: simulated (volatility {})", volatility);
            Box::new(SimulatedProvider::with_default_universe(*volatility))
        }
    };

    let symbol_failures = FailureCache::new();
    let state = AppState {
        accounts,
        price_provider: Arc::new(FailureAwareProvider::new(feed, symbol_failures.clone())),
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
        sessions: SessionManager::new(&config.jwt_secret, chrono::Duration::hours(config.session_ttl_hours)),
        symbol_failures,
    };

    spawn_cleanup(state.clone());

    let app = app::create_app(state);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("🚀 Stock trader backend running at http://{}/", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn spawn_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            let sessions = state.sessions.purge_expired();
            state.symbol_failures.cleanup_expired();
            debug!(
                "Cleanup removed {} sessions, {} symbol failures remain",
                sessions,
                state.symbol_failures.len()
            );
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
