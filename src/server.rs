//! HTTP service.
//!
//! Exposes ingestion, listing, stats, lookup, and analytics as a JSON API.
//! Each request opens its own store connection and closes it before
//! responding; the only state shared between requests is the config and
//! the completion client.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Service info and endpoint map |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/save-from-file?filename=<f>` | Ingest a result file, or `all` |
//! | `GET`  | `/startups?limit&industry&founding_year` | Filtered listing |
//! | `GET`  | `/startups/{id}` | One record |
//! | `GET`  | `/stats` | Aggregate statistics |
//! | `POST` | `/query` | Natural-language question `{ "question": "..." }` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "file batch_results_9.json not found" } }
//! ```
//!
//! Malformed query strings, path ids, and JSON bodies are `bad_request`.
//!
//! Codes: `not_found` (404), `bad_request` (400), `persistence`,
//! `upstream`, `internal` (500).

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::analytics::{answer_question, AnalyticsAnswer};
use crate::completion::{CompletionClient, OpenAiClient};
use crate::config::Config;
use crate::db;
use crate::error::StartupError;
use crate::get::get_startup;
use crate::ingest::{ingest, IngestReport};
use crate::list::{list_startups, ListFilter};
use crate::models::StartupRecord;
use crate::stats::{compute_stats, StoreStats};

const DEFAULT_RESULT_FILE: &str = "research_results.json";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    completion: Arc<dyn CompletionClient>,
}

/// Starts the service with the OpenAI-compatible completion client.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let completion = Arc::new(OpenAiClient::new(&config.analytics)?);
    run_server_with_client(config, completion).await
}

/// Starts the service with a caller-supplied completion client. Runs until
/// the process is terminated.
pub async fn run_server_with_client(
    config: &Config,
    completion: Arc<dyn CompletionClient>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    // Fail before binding if the store is unusable.
    let pool = db::open(config).await?;
    pool.close().await;

    let app = router(config.clone(), completion);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    println!("Startup research API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router without binding a socket.
pub fn router(config: Config, completion: Arc<dyn CompletionClient>) -> Router {
    let state = AppState {
        config: Arc::new(config),
        completion,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/save-from-file", post(handle_save_from_file))
        .route("/startups", get(handle_list))
        .route("/startups/{id}", get(handle_get))
        .route("/stats", get(handle_stats))
        .route("/query", post(handle_query))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError(StartupError);

impl From<StartupError> for AppError {
    fn from(err: StartupError) -> Self {
        AppError(err)
    }
}

/// Malformed query strings, paths, and bodies are client errors and use
/// the same JSON body as every other failure.
macro_rules! rejection_as_bad_request {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    AppError(StartupError::Validation(rejection.body_text()))
                }
            }
        )*
    };
}

rejection_as_bad_request!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.0.code().to_string(),
                message: self.0.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Opens a store for the duration of one request.
async fn with_store<T, F, Fut>(config: &Config, op: F) -> Result<T, AppError>
where
    F: FnOnce(SqlitePool) -> Fut,
    Fut: Future<Output = (SqlitePool, Result<T, StartupError>)>,
{
    let pool = db::open(config).await?;
    let (pool, result) = op(pool).await;
    pool.close().await;
    Ok(result?)
}

// ============ GET / and /health ============

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    endpoints: serde_json::Value,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Startup Research API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: serde_json::json!({
            "save_from_file": "/save-from-file",
            "view_data": "/startups",
            "database_stats": "/stats",
            "query_analytics": "/query",
        }),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /save-from-file ============

#[derive(Deserialize)]
struct SaveParams {
    filename: Option<String>,
}

#[derive(Serialize)]
struct SaveResponse {
    message: String,
    #[serde(flatten)]
    report: IngestReport,
}

async fn handle_save_from_file(
    State(state): State<AppState>,
    params: Result<Query<SaveParams>, QueryRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let Query(params) = params?;
    let filename = params
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RESULT_FILE.to_string());

    let config = state.config.clone();
    let report = with_store(&state.config, |pool| async move {
        let result = ingest(&pool, &config, &filename).await;
        (pool, result)
    })
    .await?;

    let message = if report.files.len() == 1 {
        format!("Successfully processed {}", report.files[0].filename)
    } else {
        format!("Successfully processed {} files", report.files.len())
    };

    Ok(Json(SaveResponse { message, report }))
}

// ============ GET /startups ============

#[derive(Serialize)]
struct ListResponse {
    total_returned: usize,
    startups: Vec<StartupRecord>,
}

async fn handle_list(
    State(state): State<AppState>,
    filter: Result<Query<ListFilter>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(filter) = filter?;
    let startups = with_store(&state.config, |pool| async move {
        let result = list_startups(&pool, &filter).await;
        (pool, result)
    })
    .await?;

    Ok(Json(ListResponse {
        total_returned: startups.len(),
        startups,
    }))
}

// ============ GET /startups/{id} ============

async fn handle_get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<StartupRecord>, AppError> {
    let Path(id) = id?;
    let record = with_store(&state.config, |pool| async move {
        let result = get_startup(&pool, id).await;
        (pool, result)
    })
    .await?;
    Ok(Json(record))
}

// ============ GET /stats ============

async fn handle_stats(State(state): State<AppState>) -> Result<Json<StoreStats>, AppError> {
    let stats = with_store(&state.config, |pool| async move {
        let result = compute_stats(&pool).await;
        (pool, result)
    })
    .await?;
    Ok(Json(stats))
}

// ============ POST /query ============

#[derive(Deserialize)]
struct QueryRequest {
    question: String,
}

async fn handle_query(
    State(state): State<AppState>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AnalyticsAnswer>, AppError> {
    let Json(request) = request?;
    let completion = state.completion.clone();
    let settings = state.config.analytics.clone();
    let answer = with_store(&state.config, |pool| async move {
        let result =
            answer_question(&pool, completion.as_ref(), &settings, &request.question).await;
        (pool, result)
    })
    .await?;
    Ok(Json(answer))
}
