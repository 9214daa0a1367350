//! Filtered listing of stored records, newest first.
//!
//! Backs `srdb list` and `GET /startups`.

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::models::{StartupRecord, SELECT_COLUMNS};

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilter {
    /// Case-insensitive substring of `industry_sector`.
    pub industry: Option<String>,
    /// Exact `founding_year`.
    pub founding_year: Option<i64>,
    /// Applied after filtering; defaults to [`DEFAULT_LIMIT`].
    pub limit: Option<usize>,
}

pub async fn list_startups(pool: &SqlitePool, filter: &ListFilter) -> Result<Vec<StartupRecord>> {
    let industry = filter
        .industry
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let limit = filter.limit.unwrap_or(DEFAULT_LIMIT);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let sql = format!(
        "SELECT {} FROM startups \
         WHERE (?1 IS NULL OR instr(lower(coalesce(industry_sector, '')), ?1) > 0) \
           AND (?2 IS NULL OR founding_year = ?2) \
         ORDER BY created_at DESC, id DESC \
         LIMIT ?3",
        SELECT_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(industry)
        .bind(filter.founding_year)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    let records = rows
        .iter()
        .map(StartupRecord::from_row)
        .collect::<sqlx::Result<Vec<_>>>()?;
    Ok(records)
}

/// `srdb list`: prints a console summary.
pub async fn run_list(config: &Config, filter: &ListFilter) -> Result<()> {
    let pool = db::open(config).await?;
    let result = list_startups(&pool, filter).await;
    pool.close().await;
    let records = result?;

    if records.is_empty() {
        println!("No startups found.");
        return Ok(());
    }

    println!("Startups ({})", records.len());
    println!("{}", "-".repeat(80));
    for (i, r) in records.iter().enumerate() {
        let f = &r.fields;
        println!("{}. {}  [id {}]", i + 1, f.company_name, r.id);
        println!("   Industry: {}", f.industry_sector.as_deref().unwrap_or("-"));
        println!(
            "   Founded:  {}",
            f.founding_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!("   Funding:  {}", f.total_capital_raised.as_deref().unwrap_or("-"));
        println!("   Website:  {}", f.website_url.as_deref().unwrap_or("-"));
        println!("   Added:    {}", r.created_at.format("%Y-%m-%d %H:%M:%S"));
        println!();
    }

    Ok(())
}
