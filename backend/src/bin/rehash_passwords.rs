//! Maintenance tool: replace stored password hashes that bcrypt cannot parse
//!
//! Usage: `rehash-passwords [DEFAULT_PASSWORD]`, or set `IMS_REHASH_DEFAULT_PASSWORD`.
//! Affected accounts get the default password and must change it afterwards.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use invoice_management_backend::{init_tracing, services::AuthService, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    init_tracing(false);

    let default_password = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("IMS_REHASH_DEFAULT_PASSWORD").ok())
        .context("pass the default password as an argument or set IMS_REHASH_DEFAULT_PASSWORD")?;

    shared::validate_password(&default_password).map_err(anyhow::Error::msg)?;

    let db_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await?;

    let rehashed = AuthService::new(db_pool, &config)
        .rehash_invalid_passwords(&default_password)
        .await?;

    tracing::info!(rehashed, "Password rehash complete");

    Ok(())
}
