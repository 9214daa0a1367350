//! Ingestion pipeline.
//!
//! Coordinates the flow: source resolution → file parsing (with recovery)
//! → normalization → insert. Every accepted record is written in its own
//! transaction, so one bad row never takes the batch down with it.

use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db;
use crate::error::{Result, StartupError};
use crate::migrate;
use crate::models::{encode_list, NewStartup};
use crate::normalize::{normalize_value, Rejection};
use crate::sources::{self, ALL_SOURCES};

/// Outcome of one `ingest` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Candidates found across all files.
    pub attempted: usize,
    pub saved: usize,
    /// Candidates rejected by the normalizer.
    pub skipped: usize,
    pub files: Vec<FileReport>,
    pub errors: Vec<ItemError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub found: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A candidate that was accepted by the normalizer but failed to insert.
#[derive(Debug, Clone, Serialize)]
pub struct ItemError {
    pub filename: String,
    /// Zero-based position of the candidate within its file.
    pub index: usize,
    pub company_name: String,
    pub message: String,
}

/// Ingests `source` (a path, a file-name glob, or `all`) into the store behind `pool`.
///
/// Errors only for conditions that concern the whole request: nothing to
/// read (`NotFound`), a single named file without any candidates
/// (`Validation`), or a schema failure. Per-file and per-record problems
/// are recorded in the report.
pub async fn ingest(pool: &SqlitePool, config: &Config, source: &str) -> Result<IngestReport> {
    let files = sources::resolve_source(config, source)?;
    migrate::ensure_schema(pool).await?;

    let single = source != ALL_SOURCES && !sources::is_pattern(config, source);
    let mut report = IngestReport::default();

    for path in &files {
        let candidates = read_candidates(path);
        if single && candidates.is_empty() {
            return Err(StartupError::Validation(format!(
                "no valid startup data found in {}",
                path.display()
            )));
        }
        ingest_candidates(pool, &path.display().to_string(), &candidates, &mut report).await;
    }

    Ok(report)
}

async fn ingest_candidates(
    pool: &SqlitePool,
    filename: &str,
    candidates: &[Value],
    report: &mut IngestReport,
) {
    let mut file = FileReport {
        filename: filename.to_string(),
        found: candidates.len(),
        saved: 0,
        skipped: 0,
        failed: 0,
    };

    for (index, candidate) in candidates.iter().enumerate() {
        let startup = match normalize_value(candidate) {
            Ok(s) => s,
            Err(rejection) => {
                match rejection {
                    Rejection::NotAnObject => {
                        tracing::debug!("{} item {}: not an object, skipping", filename, index)
                    }
                    Rejection::MissingCompanyName => {
                        tracing::debug!("{} item {}: missing company name, skipping", filename, index)
                    }
                }
                file.skipped += 1;
                continue;
            }
        };

        match insert_startup(pool, &startup).await {
            Ok(id) => {
                tracing::debug!("saved {} as id {}", startup.company_name, id);
                file.saved += 1;
            }
            Err(e) => {
                tracing::warn!("failed to save {}: {}", startup.company_name, e);
                file.failed += 1;
                report.errors.push(ItemError {
                    filename: filename.to_string(),
                    index,
                    company_name: startup.company_name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    report.attempted += file.found;
    report.saved += file.saved;
    report.skipped += file.skipped;
    report.files.push(file);
}

/// Inserts one record in its own transaction and returns its id. On any
/// failure the transaction is dropped, which rolls it back.
pub async fn insert_startup(pool: &SqlitePool, startup: &NewStartup) -> Result<i64> {
    if startup.company_name.trim().is_empty() {
        return Err(StartupError::Validation("company_name must not be empty".into()));
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO startups (
            company_name, website_url, founding_year, founders, business_model,
            industry_sector, funding_rounds, total_capital_raised, current_revenue_estimates,
            employee_count, customer_user_base_size, key_partnerships, major_competitors,
            recent_news_developments
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&startup.company_name)
    .bind(&startup.website_url)
    .bind(startup.founding_year)
    .bind(encode_list(&startup.founders)?)
    .bind(&startup.business_model)
    .bind(&startup.industry_sector)
    .bind(encode_list(&startup.funding_rounds)?)
    .bind(&startup.total_capital_raised)
    .bind(&startup.current_revenue_estimates)
    .bind(startup.employee_count)
    .bind(&startup.customer_user_base_size)
    .bind(encode_list(&startup.key_partnerships)?)
    .bind(encode_list(&startup.major_competitors)?)
    .bind(&startup.recent_news_developments)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(result.last_insert_rowid())
}

/// Reads a result file and extracts its candidates. Unreadable files
/// contribute nothing.
pub fn read_candidates(path: &Path) -> Vec<Value> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_candidates(&content),
        Err(e) => {
            tracing::warn!("could not read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Extracts candidate records from file text.
///
/// Strict JSON first; if that fails, the span from the first `[` to the
/// last `]` is parsed instead, which recovers an array wrapped in log or
/// explanatory text. Arrays yield their elements, an object yields
/// itself, anything else yields nothing.
pub fn parse_candidates(content: &str) -> Vec<Value> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    let parsed = match serde_json::from_str::<Value>(content) {
        Ok(v) => v,
        Err(strict_err) => match recover_array(content) {
            Some(v) => {
                tracing::debug!("strict parse failed ({}), recovered embedded array", strict_err);
                v
            }
            None => {
                tracing::warn!("no JSON found: {}", strict_err);
                return Vec::new();
            }
        },
    };

    match parsed {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => Vec::new(),
    }
}

fn recover_array(content: &str) -> Option<Value> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}

/// `srdb ingest <source>`: runs the pipeline and prints the report.
pub async fn run_ingest(config: &Config, source: &str) -> Result<IngestReport> {
    let pool = db::connect(config).await?;
    let result = ingest(&pool, config, source).await;
    pool.close().await;
    let report = result?;

    println!("ingest {}", source);
    if report.files.len() > 1 {
        for f in &report.files {
            println!(
                "  {:<48} found {:>4}  saved {:>4}",
                display_name(&f.filename),
                f.found,
                f.saved
            );
        }
    }
    println!("  candidates found: {}", report.attempted);
    println!("  saved: {}", report.saved);
    println!("  skipped: {}", report.skipped);
    if !report.errors.is_empty() {
        println!("  failed: {}", report.errors.len());
        for e in &report.errors {
            println!("    {} #{} ({}): {}", e.filename, e.index, e.company_name, e.message);
        }
    }
    println!("ok");

    Ok(report)
}

fn display_name(filename: &str) -> String {
    PathBuf::from(filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_array() {
        let items = parse_candidates(r#"[{"name": "A"}, {"name": "B"}, 3]"#);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], json!({"name": "B"}));
    }

    #[test]
    fn test_single_object() {
        let items = parse_candidates(r#"{"company_name": "Solo"}"#);
        assert_eq!(items, vec![json!({"company_name": "Solo"})]);
    }

    #[test]
    fn test_scalar_yields_nothing() {
        assert!(parse_candidates("42").is_empty());
        assert!(parse_candidates(r#""just a string""#).is_empty());
        assert!(parse_candidates("null").is_empty());
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates("  \n\t ").is_empty());
    }

    #[test]
    fn test_recovers_array_from_prose() {
        let text = "Research complete. Here are the results:\n\
                    [{\"Company Name\": \"Acme\"}, {\"Company Name\": \"Beta\"}]\n\
                    Let me know if you need anything else.";
        let items = parse_candidates(text);
        assert_eq!(
            items,
            vec![json!({"Company Name": "Acme"}), json!({"Company Name": "Beta"})]
        );
    }

    #[test]
    fn test_recovery_spans_nested_brackets() {
        let text = "log: begin\n[{\"name\": \"A\", \"founders\": [\"x\", \"y\"]}]\nlog: end";
        let items = parse_candidates(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["founders"], json!(["x", "y"]));
    }

    #[test]
    fn test_unrecoverable_text() {
        assert!(parse_candidates("no json here at all").is_empty());
        assert!(parse_candidates("] backwards [").is_empty());
        assert!(parse_candidates("prefix [not, valid json] suffix").is_empty());
    }

    #[test]
    fn test_recovery_ignores_embedded_object_without_array() {
        assert!(parse_candidates("Result: {\"name\": \"A\"} done").is_empty());
    }
}
