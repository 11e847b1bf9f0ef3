//! Creates a staff user for the admin report.
//!
//! Reads `ADMIN_USERNAME`, `ADMIN_PASSWORD` and optionally `ADMIN_EMAIL`
//! from the environment, and the database from the usual configuration.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::{Context, bail};
use investa_core::auth::{RegisterUser, UserDirectory};
use investa_db::{UserRepository, connect};
use investa_shared::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "investa=info".into()),
        )
        .init();

    let username = std::env::var("ADMIN_USERNAME").context("ADMIN_USERNAME must be set")?;
    let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
    let email = std::env::var("ADMIN_EMAIL").ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.database.is_in_memory() {
        bail!("the seeder needs a persistent database, not {}", config.database.url);
    }

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let repository = UserRepository::new(db);

    if repository.username_exists(&username).await? {
        info!(%username, "Staff user already exists, skipping");
        return Ok(());
    }

    let directory = UserDirectory::new(Arc::new(repository));
    let user = directory
        .register_with_role(
            RegisterUser {
                username,
                email,
                first_name: String::new(),
                last_name: String::new(),
                password,
            },
            true,
        )
        .await?;

    info!(user_id = %user.id, username = %user.username, "Created staff user");
    Ok(())
}
