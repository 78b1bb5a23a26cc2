use anyhow::Result;
use log::LevelFilter;
use sqlx::{
    ConnectOptions,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use std::path::Path;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS reputation (
    url TEXT PRIMARY KEY,
    date_checked TEXT,
    score REAL,
    snippet TEXT
)";

/// Open (creating if absent) the SQLite file at `path` and make sure the reputation table exists.
pub async fn init_database(path: impl AsRef<Path>) -> Result<SqlitePool> {
    let connect_options =
        SqliteConnectOptions::new().filename(path.as_ref()).create_if_missing(true).log_statements(LevelFilter::Debug);

    let pool = SqlitePoolOptions::new().max_connections(5).connect_with(connect_options).await?;

    sqlx::query(SCHEMA).execute(&pool).await?;

    Ok(pool)
}
