use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::Result;

/// Creates the `startups` table if it does not exist. Safe to call any
/// number of times.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS startups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL CHECK (length(trim(company_name)) > 0),
            website_url TEXT,
            founding_year INTEGER,
            founders TEXT NOT NULL DEFAULT '[]',
            business_model TEXT,
            industry_sector TEXT,
            funding_rounds TEXT NOT NULL DEFAULT '[]',
            total_capital_raised TEXT,
            current_revenue_estimates TEXT,
            employee_count INTEGER,
            customer_user_base_size TEXT,
            key_partnerships TEXT NOT NULL DEFAULT '[]',
            major_competitors TEXT NOT NULL DEFAULT '[]',
            recent_news_developments TEXT,
            created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_startups_created_at ON startups(created_at DESC, id DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// `srdb init`: open the store, ensure the schema, close.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = ensure_schema(&pool).await;
    pool.close().await;
    result
}
