//! Export stored records as a timestamped JSON file.
//!
//! Produces `startup_export_<YYYYMMDD_HHMMSS>.json`: an array of records
//! with the store-internal `id` and `created_at` stripped. Keys are the
//! canonical ones the normalizer accepts, so an export can be ingested
//! again as-is.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::list::{list_startups, ListFilter};
use crate::models::{NewStartup, StartupRecord};

/// File name for an export generated now.
pub fn export_file_name() -> String {
    format!("startup_export_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Writes `records` into `dir` and returns the path of the new file.
pub fn export_records(records: &[StartupRecord], dir: &Path) -> Result<PathBuf> {
    let cleaned: Vec<&NewStartup> = records.iter().map(|r| &r.fields).collect();
    let json = serde_json::to_string_pretty(&cleaned)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name());
    std::fs::write(&path, json)?;
    Ok(path)
}

/// `srdb export`: every record, newest first. Nothing is written when the
/// store is empty.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<Option<PathBuf>> {
    let pool = db::open(config).await?;
    let filter = ListFilter {
        limit: Some(usize::MAX),
        ..Default::default()
    };
    let result = list_startups(&pool, &filter).await;
    pool.close().await;
    let records = result?;

    if records.is_empty() {
        println!("No startups to export.");
        return Ok(None);
    }

    let path = export_records(&records, output.unwrap_or_else(|| Path::new(".")))?;
    println!("Exported {} startups to {}", records.len(), path.display());
    Ok(Some(path))
}
