//! Aggregate statistics over the store.
//!
//! Gives a quick picture of what has been ingested: record count, the
//! industries represented, the average founding year, and how many
//! records disclose their funding. Used by `srdb stats`, `GET /stats`,
//! and as context for analytics questions.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::Result;

/// Literal the research producer writes when funding is unknown.
pub const NOT_DISCLOSED: &str = "Not disclosed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_startups: i64,
    /// Distinct non-empty industry sectors, sorted.
    pub industries: Vec<String>,
    /// Mean over records with a founding year; `None` when there are none.
    pub avg_founding_year: Option<f64>,
    pub total_funding_disclosed: i64,
}

pub async fn compute_stats(pool: &SqlitePool) -> Result<StoreStats> {
    let total_startups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM startups")
        .fetch_one(pool)
        .await?;

    let industries: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT industry_sector FROM startups \
         WHERE industry_sector IS NOT NULL AND trim(industry_sector) != '' \
         ORDER BY industry_sector",
    )
    .fetch_all(pool)
    .await?;

    let avg_founding_year: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(founding_year) FROM startups WHERE founding_year IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    let total_funding_disclosed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM startups \
         WHERE total_capital_raised IS NOT NULL \
           AND trim(total_capital_raised) != '' \
           AND total_capital_raised != ?",
    )
    .bind(NOT_DISCLOSED)
    .fetch_one(pool)
    .await?;

    Ok(StoreStats {
        total_startups,
        industries,
        avg_founding_year,
        total_funding_disclosed,
    })
}

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::open(config).await?;
    let result = compute_stats(&pool).await;
    pool.close().await;
    let stats = result?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Startup Research — Database Stats");
    println!("=================================");
    println!();
    println!("  Database:          {}", config.db.path.display());
    println!("  Size:              {}", format_bytes(db_size));
    println!();
    println!("  Startups:          {}", stats.total_startups);
    println!(
        "  Avg founding year: {}",
        format_avg_year(stats.avg_founding_year)
    );
    println!("  Funding disclosed: {}", stats.total_funding_disclosed);

    if !stats.industries.is_empty() {
        println!();
        println!("  Industries ({}):", stats.industries.len());
        for industry in &stats.industries {
            println!("    - {}", industry);
        }
    }

    println!();
    Ok(())
}

/// One decimal place, or `N/A` when no record has a founding year.
pub fn format_avg_year(avg: Option<f64>) -> String {
    match avg {
        Some(y) => format!("{:.1}", y),
        None => "N/A".to_string(),
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_avg_year() {
        assert_eq!(format_avg_year(None), "N/A");
        assert_eq!(format_avg_year(Some(2018.66)), "2018.7");
        assert_eq!(format_avg_year(Some(2020.0)), "2020.0");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
    }
}
