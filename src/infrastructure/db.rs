use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::config::Config;

/// Schema migrations embedded from `./migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    MIGRATOR.run(&pool).await?;

    tracing::info!(
        database_url = config.database_url.as_str(),
        max_connections = config.max_connections,
        "Database initialized with WAL mode enabled"
    );

    Ok(pool)
}

pub async fn verify_wal_mode(pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let row = sqlx::query("PRAGMA journal_mode")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<String, _>(0))
}
