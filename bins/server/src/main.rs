//! Investa API Server
//!
//! Main entry point for the investment ledger service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use investa_api::{AppState, create_router};
use investa_core::auth::UserDirectory;
use investa_core::cache::{self, CacheTtls};
use investa_core::policy::AccountAccessPolicy;
use investa_core::reports::AdminReportService;
use investa_core::service::AccountService;
use investa_core::store::{LedgerStore, MemoryStore, UserStore};
use investa_db::migration::Migrator;
use investa_db::{AccountRepository, UserRepository, connect};
use investa_shared::{AppConfig, JwtConfig, JwtService};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "investa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let (ledger, users) = open_stores(&config).await?;

    let cache = cache::from_config(&config.cache);
    let ttls = CacheTtls::from(&config.cache);
    let policy = AccountAccessPolicy::new(config.policy.enforce_ownership);
    info!(
        cache_enabled = config.cache.enabled,
        enforce_ownership = policy.enforces_ownership(),
        "Ledger services configured"
    );

    let state = AppState {
        accounts: Arc::new(AccountService::new(
            ledger.clone(),
            cache.clone(),
            policy,
            ttls,
        )),
        reports: Arc::new(AdminReportService::new(
            ledger,
            users.clone(),
            cache,
            ttls.report,
        )),
        users: Arc::new(UserDirectory::new(users)),
        jwt_service: Arc::new(JwtService::new(JwtConfig::from(&config.jwt))),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn open_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn LedgerStore>, Arc<dyn UserStore>)> {
    if config.database.is_in_memory() {
        warn!("Using the in-memory store; data is lost on shutdown");
        let store = Arc::new(MemoryStore::new());
        return Ok((store.clone(), store));
    }

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Migrations applied");
    }

    Ok((
        Arc::new(AccountRepository::new(db.clone())),
        Arc::new(UserRepository::new(db)),
    ))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        // Keep serving rather than exiting immediately.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
    // Give in-flight requests a moment before the runtime drops.
    tokio::time::sleep(Duration::from_millis(100)).await;
}
