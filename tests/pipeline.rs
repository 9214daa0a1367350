//! Library-level tests for the ingestion pipeline, read paths, analytics,
//! and the HTTP API.
//!
//! The completion service is replaced by an in-process stub so nothing
//! leaves the machine.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use startup_research::analytics::{answer_question, ANALYST_SYSTEM_PROMPT};
use startup_research::completion::{CompletionClient, CompletionRequest};
use startup_research::config::Config;
use startup_research::db;
use startup_research::error::{Result, StartupError};
use startup_research::get::get_startup;
use startup_research::ingest::{ingest, insert_startup};
use startup_research::list::{list_startups, ListFilter};
use startup_research::migrate;
use startup_research::models::NewStartup;
use startup_research::normalize::normalize;
use startup_research::server::run_server_with_client;
use startup_research::stats::compute_stats;

// ─── Stub completion client ─────────────────────────────────────────

/// Records every request and answers with a fixed string, or fails.
struct StubCompletion {
    reply: Option<String>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl StubCompletion {
    fn answering(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| StartupError::Upstream("stub is offline".to_string()))
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config(tmp: &TempDir) -> Config {
    let root = tmp.path();
    fs::create_dir_all(root.join("results")).unwrap();
    let config_content = format!(
        r#"
[db]
path = "{}"

[ingest]
root = "{}"

[server]
bind = "127.0.0.1:0"
"#,
        root.join("srdb.sqlite").display(),
        root.join("results").display()
    );
    toml::from_str(&config_content).unwrap()
}

async fn open_store(cfg: &Config) -> SqlitePool {
    let pool = db::connect(cfg).await.unwrap();
    migrate::ensure_schema(&pool).await.unwrap();
    pool
}

fn write_result(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let dir = tmp.path().join("results");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

async fn seed(pool: &SqlitePool, raw: Value) -> i64 {
    let startup = normalize(raw.as_object().unwrap()).unwrap();
    insert_startup(pool, &startup).await.unwrap()
}

// ─── Schema ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ensure_schema_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    seed(&pool, json!({"name": "Keeper"})).await;
    migrate::ensure_schema(&pool).await.unwrap();
    migrate::ensure_schema(&pool).await.unwrap();

    let stats = compute_stats(&pool).await.unwrap();
    assert_eq!(stats.total_startups, 1);
    pool.close().await;
}

#[tokio::test]
async fn test_reads_tables_with_text_timestamps() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = db::connect(&cfg).await.unwrap();

    sqlx::query(
        "CREATE TABLE startups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL,
            website_url TEXT,
            founding_year INTEGER,
            founders TEXT,
            business_model TEXT,
            industry_sector TEXT,
            funding_rounds TEXT,
            total_capital_raised TEXT,
            current_revenue_estimates TEXT,
            employee_count INTEGER,
            customer_user_base_size TEXT,
            key_partnerships TEXT,
            major_competitors TEXT,
            recent_news_developments TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO startups (company_name, founders, created_at) \
         VALUES ('Legacy Co', '[\"Ann\"]', '2024-01-02 03:04:05')",
    )
    .execute(&pool)
    .await
    .unwrap();
    migrate::ensure_schema(&pool).await.unwrap();

    let newer = seed(&pool, json!({"name": "Fresh Co"})).await;

    let legacy = get_startup(&pool, 1).await.unwrap();
    assert_eq!(legacy.fields.founders, vec!["Ann"]);
    assert_eq!(
        legacy.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-01-02 03:04:05"
    );

    let names: Vec<String> = list_startups(&pool, &ListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.fields.company_name)
        .collect();
    assert_eq!(names, vec!["Fresh Co", "Legacy Co"]);
    assert!(get_startup(&pool, newer).await.unwrap().created_at > legacy.created_at);
    pool.close().await;
}

// ─── Round trip ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_normalize_persist_read_back() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let id = seed(
        &pool,
        json!({"company_name": "Acme", "founders": ["A", "B"], "founding_year": 2021}),
    )
    .await;

    let record = get_startup(&pool, id).await.unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.fields.company_name, "Acme");
    assert_eq!(record.fields.founders, vec!["A", "B"]);
    assert_eq!(record.fields.founding_year, Some(2021));
    assert_eq!(record.fields.website_url, None);
    assert!(record.fields.funding_rounds.is_empty());
    assert!(record.fields.major_competitors.is_empty());
    pool.close().await;
}

#[tokio::test]
async fn test_sequence_fields_round_trip_in_order() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let rounds = vec![
        json!({"amount": "$500K", "date": "2019-06"}),
        json!({"amount": "$3M", "date": "2020-11", "round": "Seed"}),
        json!({"amount": "$15M", "date": "2022-02"}),
    ];
    let id = seed(
        &pool,
        json!({
            "Company Name": "Orderly",
            "Founders": ["Zoe", "Adam", "Mia"],
            "Funding Rounds": rounds,
            "Key Partnerships": ["Visa", "AWS"],
            "Major Competitors": ["Zeta", "Alpha", "Zeta"]
        }),
    )
    .await;

    let record = get_startup(&pool, id).await.unwrap();
    assert_eq!(record.fields.founders, vec!["Zoe", "Adam", "Mia"]);
    assert_eq!(record.fields.funding_rounds, rounds);
    assert_eq!(record.fields.key_partnerships, vec!["Visa", "AWS"]);
    assert_eq!(record.fields.major_competitors, vec!["Zeta", "Alpha", "Zeta"]);
    pool.close().await;
}

#[tokio::test]
async fn test_free_text_funding_rounds_round_trip() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let id = seed(
        &pool,
        json!({"name": "Acme", "Funding Rounds": "Seed $2M (2020); Series A $10M (2022)"}),
    )
    .await;

    let record = get_startup(&pool, id).await.unwrap();
    assert_eq!(
        record.fields.funding_rounds,
        vec![json!("Seed $2M (2020); Series A $10M (2022)")]
    );
    pool.close().await;
}

#[tokio::test]
async fn test_ids_are_not_reused() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let first = seed(&pool, json!({"name": "One"})).await;
    sqlx::query("DELETE FROM startups WHERE id = ?")
        .bind(first)
        .execute(&pool)
        .await
        .unwrap();
    let second = seed(&pool, json!({"name": "Two"})).await;
    assert!(second > first);
    pool.close().await;
}

#[tokio::test]
async fn test_insert_rejects_empty_company_name() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let err = insert_startup(&pool, &NewStartup::default()).await.unwrap_err();
    assert!(matches!(err, StartupError::Validation(_)));
    assert_eq!(compute_stats(&pool).await.unwrap().total_startups, 0);
    pool.close().await;
}

// ─── Ingestion ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_ingest_counts_attempted_and_saved() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let file = write_result(
        &tmp,
        "research_results.json",
        r#"[
            {"company_name": "One"},
            {"Company Name": "Two"},
            {"name": "Three"},
            {"industry": "No name"},
            "not an object",
            {"company_name": "   "}
        ]"#,
    );

    let report = ingest(&pool, &cfg, file.to_str().unwrap()).await.unwrap();
    assert_eq!(report.attempted, 6);
    assert_eq!(report.saved, 3);
    assert_eq!(report.skipped, 3);
    assert!(report.errors.is_empty());
    assert_eq!(report.files.len(), 1);

    assert_eq!(compute_stats(&pool).await.unwrap().total_startups, 3);
    pool.close().await;
}

#[tokio::test]
async fn test_ingest_without_company_names_inserts_nothing() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let file = write_result(
        &tmp,
        "research_results.json",
        r#"[{"industry": "Fintech"}, {"Website URL": "https://x.example"}]"#,
    );
    let report = ingest(&pool, &cfg, file.to_str().unwrap()).await.unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.saved, 0);
    assert_eq!(compute_stats(&pool).await.unwrap().total_startups, 0);
    pool.close().await;
}

#[tokio::test]
async fn test_ingest_single_file_without_candidates_is_validation_error() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let file = write_result(&tmp, "research_results.json", "the agent crashed, sorry");
    let err = ingest(&pool, &cfg, file.to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, StartupError::Validation(_)));
    pool.close().await;
}

#[tokio::test]
async fn test_ingest_all_with_no_sources_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let err = ingest(&pool, &cfg, "all").await.unwrap_err();
    assert!(matches!(err, StartupError::NotFound(_)));
    pool.close().await;
}

#[tokio::test]
async fn test_ingest_all_continues_past_bad_files() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    write_result(&tmp, "research_results.json", r#"[{"name": "A"}, {"name": "B"}]"#);
    write_result(&tmp, "batch_results_1.json", "{ truncated");
    write_result(
        &tmp,
        "batch_results_2.json",
        "Here you go:\n[{\"name\": \"C\"}]\nThanks!",
    );

    let report = ingest(&pool, &cfg, "all").await.unwrap();
    assert_eq!(report.files.len(), 3);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.saved, 3);

    let per_file: Vec<(String, usize)> = report
        .files
        .iter()
        .map(|f| {
            let name = PathBuf::from(&f.filename)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string();
            (name, f.saved)
        })
        .collect();
    assert_eq!(
        per_file,
        vec![
            ("batch_results_1.json".to_string(), 0),
            ("batch_results_2.json".to_string(), 1),
            ("research_results.json".to_string(), 2),
        ]
    );
    pool.close().await;
}

#[tokio::test]
async fn test_ingest_failed_insert_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    // Reject one specific company at the store level.
    sqlx::query(
        "CREATE TRIGGER reject_doomed BEFORE INSERT ON startups \
         WHEN NEW.company_name = 'Doomed' \
         BEGIN SELECT RAISE(ABORT, 'doomed row'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let file = write_result(
        &tmp,
        "research_results.json",
        r#"[{"name": "Fine"}, {"name": "Doomed"}, {"name": "Also Fine"}]"#,
    );
    let report = ingest(&pool, &cfg, file.to_str().unwrap()).await.unwrap();
    assert_eq!(report.attempted, 3);
    assert_eq!(report.saved, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].company_name, "Doomed");
    assert_eq!(report.errors[0].index, 1);

    let names: Vec<String> = list_startups(&pool, &ListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.fields.company_name)
        .collect();
    assert_eq!(names, vec!["Also Fine", "Fine"]);
    pool.close().await;
}

// ─── Query layer ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_filters_and_limit() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    seed(&pool, json!({"name": "PayCo", "industry": "FinTech", "founded": 2021})).await;
    seed(&pool, json!({"name": "Refine", "industry": "Oil Refining", "founded": 2015})).await;
    seed(&pool, json!({"name": "Medi", "industry": "HealthTech", "founded": 2021})).await;
    seed(&pool, json!({"name": "Blank", "founded": 2021})).await;

    let fin = list_startups(
        &pool,
        &ListFilter {
            industry: Some("fin".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let fin_names: Vec<&str> = fin.iter().map(|r| r.fields.company_name.as_str()).collect();
    assert_eq!(fin_names, vec!["Refine", "PayCo"]);

    let year = list_startups(
        &pool,
        &ListFilter {
            founding_year: Some(2021),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(year.len(), 3);
    assert!(year.iter().all(|r| r.fields.founding_year == Some(2021)));

    let limited = list_startups(
        &pool,
        &ListFilter {
            founding_year: Some(2021),
            limit: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let limited_names: Vec<&str> = limited
        .iter()
        .map(|r| r.fields.company_name.as_str())
        .collect();
    assert_eq!(limited_names, vec!["Blank", "Medi"]);
    pool.close().await;
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let err = get_startup(&pool, 404).await.unwrap_err();
    assert!(matches!(err, StartupError::NotFound(_)));
    pool.close().await;
}

#[tokio::test]
async fn test_stats_empty_store() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let stats = compute_stats(&pool).await.unwrap();
    assert_eq!(stats.total_startups, 0);
    assert!(stats.industries.is_empty());
    assert_eq!(stats.avg_founding_year, None);
    assert_eq!(stats.total_funding_disclosed, 0);
    pool.close().await;
}

#[tokio::test]
async fn test_stats_aggregates() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    seed(&pool, json!({"name": "A", "industry": "Fintech", "founded": 2018, "total_funding": "$1M"})).await;
    seed(&pool, json!({"name": "B", "industry": "Fintech", "founded": 2020, "total_funding": "Not disclosed"})).await;
    seed(&pool, json!({"name": "C", "industry": "AI", "total_funding": ""})).await;
    seed(&pool, json!({"name": "D", "industry": "  "})).await;

    let stats = compute_stats(&pool).await.unwrap();
    assert_eq!(stats.total_startups, 4);
    assert_eq!(stats.industries, vec!["AI", "Fintech"]);
    assert_eq!(stats.avg_founding_year, Some(2019.0));
    assert_eq!(stats.total_funding_disclosed, 1);
    pool.close().await;
}

// ─── Analytics ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_answer_question_uses_stub_and_settings() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;
    seed(&pool, json!({"name": "Acme", "industry": "Fintech", "business_model": "Payments API"})).await;

    let stub = StubCompletion::answering("Fintech dominates.");
    let answer = answer_question(&pool, &stub, &cfg.analytics, "  What dominates?  ")
        .await
        .unwrap();

    assert_eq!(answer.question, "What dominates?");
    assert_eq!(answer.answer, "Fintech dominates.");
    assert_eq!(answer.stats.total_startups, 1);

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].system, ANALYST_SYSTEM_PROMPT);
    assert_eq!(seen[0].max_tokens, 1000);
    assert!((seen[0].temperature - 0.7).abs() < f32::EPSILON);
    assert!(seen[0].prompt.contains("1. Acme"));
    assert!(seen[0].prompt.contains("Business Model: Payments API"));
    assert!(seen[0].prompt.ends_with(
        "mention what additional information would be helpful.\n"
    ));
    pool.close().await;
}

#[tokio::test]
async fn test_answer_question_upstream_failure() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let stub = StubCompletion::failing();
    let err = answer_question(&pool, &stub, &cfg.analytics, "anything")
        .await
        .unwrap_err();
    assert!(matches!(err, StartupError::Upstream(_)));
    pool.close().await;
}

#[tokio::test]
async fn test_answer_question_rejects_blank_question() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let pool = open_store(&cfg).await;

    let stub = StubCompletion::answering("unused");
    let err = answer_question(&pool, &stub, &cfg.analytics, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, StartupError::Validation(_)));
    assert!(stub.seen.lock().unwrap().is_empty());
    pool.close().await;
}

// ─── HTTP API ───────────────────────────────────────────────────────

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start_server(tmp: &TempDir, completion: Arc<dyn CompletionClient>) -> String {
    let port = find_free_port();
    let mut cfg = test_config(tmp);
    cfg.server.bind = format!("127.0.0.1:{}", port);

    tokio::spawn(async move {
        run_server_with_client(&cfg, completion).await.unwrap();
    });
    wait_for_server(port).await;
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_http_ingest_list_get_stats() {
    let tmp = TempDir::new().unwrap();
    write_result(
        &tmp,
        "research_results.json",
        r#"[{"Company Name": "Acme", "Industry Sector": "Fintech", "Founding Year": 2021},
            {"name": "Beta", "industry": "Health", "founded": 2019},
            {"industry": "nameless"}]"#,
    );
    let base = start_server(&tmp, Arc::new(StubCompletion::answering("ok"))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/save-from-file", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["attempted"], 3);
    assert_eq!(body["saved"], 2);

    let body: Value = client
        .get(format!("{}/startups?industry=FIN", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_returned"], 1);
    assert_eq!(body["startups"][0]["company_name"], "Acme");
    let id = body["startups"][0]["id"].as_i64().unwrap();

    let resp = client
        .get(format!("{}/startups/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let record: Value = resp.json().await.unwrap();
    assert_eq!(record["founding_year"], 2021);
    assert_eq!(record["founders"], json!([]));

    let stats: Value = client
        .get(format!("{}/stats", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total_startups"], 2);
    assert_eq!(stats["industries"], json!(["Fintech", "Health"]));
    assert_eq!(stats["avg_founding_year"], 2020.0);
}

#[tokio::test]
async fn test_http_error_statuses() {
    let tmp = TempDir::new().unwrap();
    write_result(&tmp, "empty.json", "nothing useful");
    let base = start_server(&tmp, Arc::new(StubCompletion::failing())).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/startups/999", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    let resp = client
        .post(format!("{}/save-from-file?filename=missing.json", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{}/save-from-file?filename=all", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{}/save-from-file?filename=empty.json", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"question": "How many?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "upstream");
}

#[tokio::test]
async fn test_http_malformed_input_is_json_bad_request() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp, Arc::new(StubCompletion::answering("unused"))).await;
    let client = reqwest::Client::new();

    let requests = vec![
        client.get(format!("{}/startups?limit=abc", base)),
        client.get(format!("{}/startups?founding_year=twenty", base)),
        client.get(format!("{}/startups/not-a-number", base)),
        client.post(format!("{}/query", base)).json(&json!({})),
        client.post(format!("{}/query", base)).json(&json!({"q": "x"})),
        client
            .post(format!("{}/query", base))
            .header("content-type", "application/json")
            .body("{not json"),
    ];

    for request in requests {
        let resp = request.send().await.unwrap();
        let url = resp.url().to_string();
        assert_eq!(resp.status(), 400, "{}", url);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request", "{}", url);
        assert!(body["error"]["message"].as_str().is_some(), "{}", url);
    }
}

#[tokio::test]
async fn test_http_query_returns_answer_and_stats() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp, Arc::new(StubCompletion::answering("No data yet."))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"question": "What is trending?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["question"], "What is trending?");
    assert_eq!(body["answer"], "No data yet.");
    assert_eq!(body["stats"]["total_startups"], 0);
    assert!(body["timestamp"].as_str().is_some());
}
