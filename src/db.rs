use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;
use crate::error::Result;

/// Opens the store described by `config.db`, creating the file and its
/// parent directory if needed. Callers close the pool when the operation
/// is done; nothing holds a connection between commands or requests.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Opens the store and makes sure the schema exists. Every command and
/// request goes through this before touching the `startups` table.
pub async fn open(config: &Config) -> Result<SqlitePool> {
    let pool = connect(config).await?;
    if let Err(e) = crate::migrate::ensure_schema(&pool).await {
        pool.close().await;
        return Err(e);
    }
    Ok(pool)
}
