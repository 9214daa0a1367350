//! Natural-language questions over the store.
//!
//! Builds a bounded context (stats, up to ten industries, five newest
//! records) around the user's question and hands it to a
//! [`CompletionClient`]. The completion text comes back unmodified next to
//! the stats snapshot it was based on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::completion::{CompletionClient, CompletionRequest, OpenAiClient};
use crate::config::{AnalyticsConfig, Config};
use crate::db;
use crate::error::{Result, StartupError};
use crate::list::{list_startups, ListFilter};
use crate::models::StartupRecord;
use crate::stats::{compute_stats, format_avg_year, StoreStats};

pub const ANALYST_SYSTEM_PROMPT: &str =
    "You are a startup research analyst providing insights based on database information.";

const MAX_INDUSTRIES: usize = 10;
const MAX_SAMPLES: usize = 5;
const BUSINESS_MODEL_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsAnswer {
    pub question: String,
    pub answer: String,
    pub stats: StoreStats,
    pub timestamp: DateTime<Utc>,
}

pub async fn answer_question(
    pool: &SqlitePool,
    client: &dyn CompletionClient,
    settings: &AnalyticsConfig,
    question: &str,
) -> Result<AnalyticsAnswer> {
    let question = question.trim();
    if question.is_empty() {
        return Err(StartupError::Validation("question must not be empty".into()));
    }

    let stats = compute_stats(pool).await?;
    let samples = list_startups(
        pool,
        &ListFilter {
            limit: Some(MAX_SAMPLES),
            ..Default::default()
        },
    )
    .await?;

    let request = CompletionRequest {
        system: ANALYST_SYSTEM_PROMPT.to_string(),
        prompt: build_prompt(&stats, &samples, question),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    };
    let answer = client.complete(&request).await?;

    Ok(AnalyticsAnswer {
        question: question.to_string(),
        answer,
        stats,
        timestamp: Utc::now(),
    })
}

/// Renders the user prompt. Only the first [`MAX_SAMPLES`] of `samples`
/// are used.
pub fn build_prompt(stats: &StoreStats, samples: &[StartupRecord], question: &str) -> String {
    let mut industries = stats
        .industries
        .iter()
        .take(MAX_INDUSTRIES)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if stats.industries.len() > MAX_INDUSTRIES {
        industries.push_str("...");
    }

    let mut prompt = format!(
        "You are an AI assistant analyzing a startup research database. \
         Here's the current database information:\n\n\
         Database Statistics:\n\
         - Total startups: {}\n\
         - Industries represented: {}\n\
         - Average founding year: {}\n\
         - Startups with disclosed funding: {}\n\n\
         Sample startup data (first {} companies):\n",
        stats.total_startups,
        industries,
        format_avg_year(stats.avg_founding_year),
        stats.total_funding_disclosed,
        MAX_SAMPLES,
    );

    for (i, record) in samples.iter().take(MAX_SAMPLES).enumerate() {
        let f = &record.fields;
        prompt.push_str(&format!(
            "\n{}. {}\n   - Industry: {}\n   - Founded: {}\n   - Funding: {}\n   - Employees: {}\n   - Business Model: {}\n",
            i + 1,
            f.company_name,
            f.industry_sector.as_deref().unwrap_or("N/A"),
            f.founding_year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".into()),
            f.total_capital_raised.as_deref().unwrap_or("N/A"),
            f.employee_count.map(|n| n.to_string()).unwrap_or_else(|| "N/A".into()),
            truncate(f.business_model.as_deref().unwrap_or("N/A"), BUSINESS_MODEL_CHARS),
        ));
    }

    prompt.push_str(&format!(
        "\nBased on this startup database information, please answer the following question: {}\n\n\
         Provide specific insights based on the data available. If you need more specific data \
         to answer accurately, mention what additional information would be helpful.\n",
        question
    ));

    prompt
}

/// First `max_chars` characters, with `...` appended when anything was cut.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `srdb ask`: answers one question and prints it.
pub async fn run_ask(config: &Config, question: &str) -> Result<AnalyticsAnswer> {
    let client = OpenAiClient::new(&config.analytics)?;
    let pool = db::open(config).await?;
    let result = answer_question(&pool, &client, &config.analytics, question).await;
    pool.close().await;
    let answer = result?;

    println!("Q: {}", answer.question);
    println!();
    println!("{}", answer.answer);
    println!();
    println!(
        "(based on {} startups, generated {})",
        answer.stats.total_startups,
        answer.timestamp.to_rfc3339()
    );

    Ok(answer)
}
