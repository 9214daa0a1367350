//! Core data types for startup records.
//!
//! [`NewStartup`] is what the normalizer produces and ingestion inserts;
//! [`StartupRecord`] is what the store hands back, with the store-assigned
//! `id` and `created_at`. Sequence fields live in SQLite as JSON text and
//! are decoded back into the same ordered vectors on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Column list shared by every query that reads full records.
///
/// `created_at` is epoch seconds. Tables created with a
/// `TIMESTAMP DEFAULT CURRENT_TIMESTAMP` column hold `YYYY-MM-DD HH:MM:SS`
/// text instead, which is converted here so both read the same.
pub(crate) const SELECT_COLUMNS: &str = "id, company_name, website_url, founding_year, founders, \
     business_model, industry_sector, funding_rounds, total_capital_raised, \
     current_revenue_estimates, employee_count, customer_user_base_size, key_partnerships, \
     major_competitors, recent_news_developments, \
     CASE WHEN typeof(created_at) = 'integer' THEN created_at \
          ELSE coalesce(CAST(strftime('%s', created_at) AS INTEGER), 0) END AS created_at";

/// A normalized record ready for insertion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewStartup {
    pub company_name: String,
    pub website_url: Option<String>,
    pub founding_year: Option<i64>,
    pub founders: Vec<String>,
    pub business_model: Option<String>,
    pub industry_sector: Option<String>,
    /// Funding entries (typically `{"amount": .., "date": ..}`), kept as
    /// the JSON objects they arrived as.
    pub funding_rounds: Vec<Value>,
    pub total_capital_raised: Option<String>,
    pub current_revenue_estimates: Option<String>,
    pub employee_count: Option<i64>,
    pub customer_user_base_size: Option<String>,
    pub key_partnerships: Vec<String>,
    pub major_competitors: Vec<String>,
    pub recent_news_developments: Option<String>,
}

/// A persisted startup record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartupRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: NewStartup,
    pub created_at: DateTime<Utc>,
}

impl StartupRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let created_at: i64 = row.try_get("created_at")?;

        Ok(Self {
            id: row.try_get("id")?,
            fields: NewStartup {
                company_name: row.try_get("company_name")?,
                website_url: row.try_get("website_url")?,
                founding_year: row.try_get("founding_year")?,
                founders: decode_list(row.try_get("founders")?),
                business_model: row.try_get("business_model")?,
                industry_sector: row.try_get("industry_sector")?,
                funding_rounds: decode_list(row.try_get("funding_rounds")?),
                total_capital_raised: row.try_get("total_capital_raised")?,
                current_revenue_estimates: row.try_get("current_revenue_estimates")?,
                employee_count: row.try_get("employee_count")?,
                customer_user_base_size: row.try_get("customer_user_base_size")?,
                key_partnerships: decode_list(row.try_get("key_partnerships")?),
                major_competitors: decode_list(row.try_get("major_competitors")?),
                recent_news_developments: row.try_get("recent_news_developments")?,
            },
            created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
        })
    }
}

/// Encodes a sequence field for storage.
pub fn encode_list<T: Serialize>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

/// Decodes a stored sequence field. NULL, empty, or unreadable text
/// decodes to an empty sequence.
pub fn decode_list<T: for<'de> Deserialize<'de>>(stored: Option<String>) -> Vec<T> {
    match stored.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable stored list {:?}: {}", text, e);
            Vec::new()
        }),
    }
}
