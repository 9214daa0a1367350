//! Record retrieval by id.
//!
//! Used by both the `srdb get` CLI command and `GET /startups/{id}`.

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::{Result, StartupError};
use crate::models::{StartupRecord, SELECT_COLUMNS};

pub async fn get_startup(pool: &SqlitePool, id: i64) -> Result<StartupRecord> {
    let sql = format!("SELECT {} FROM startups WHERE id = ?", SELECT_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    match row {
        Some(row) => Ok(StartupRecord::from_row(&row)?),
        None => Err(StartupError::NotFound(format!(
            "startup with id {} not found",
            id
        ))),
    }
}

/// CLI entry point: fetches the record and prints every field.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let pool = db::open(config).await?;
    let result = get_startup(&pool, id).await;
    pool.close().await;
    let record = result?;
    let f = &record.fields;

    println!("--- Startup ---");
    println!("id:                        {}", record.id);
    println!("company_name:              {}", f.company_name);
    print_opt("website_url", f.website_url.as_deref());
    print_opt("founding_year", f.founding_year.map(|y| y.to_string()).as_deref());
    print_list("founders", &f.founders);
    print_opt("business_model", f.business_model.as_deref());
    print_opt("industry_sector", f.industry_sector.as_deref());
    if !f.funding_rounds.is_empty() {
        println!("funding_rounds:");
        for round in &f.funding_rounds {
            println!("  - {}", round);
        }
    }
    print_opt("total_capital_raised", f.total_capital_raised.as_deref());
    print_opt("current_revenue_estimates", f.current_revenue_estimates.as_deref());
    print_opt("employee_count", f.employee_count.map(|n| n.to_string()).as_deref());
    print_opt("customer_user_base_size", f.customer_user_base_size.as_deref());
    print_list("key_partnerships", &f.key_partnerships);
    print_list("major_competitors", &f.major_competitors);
    print_opt("recent_news_developments", f.recent_news_developments.as_deref());
    println!(
        "created_at:                {}",
        record.created_at.format("%Y-%m-%dT%H:%M:%SZ")
    );

    Ok(())
}

fn print_opt(label: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("{:<27}{}", format!("{}:", label), v);
    }
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("{:<27}{}", format!("{}:", label), items.join(", "));
    }
}
