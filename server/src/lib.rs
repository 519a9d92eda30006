use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use storyline_core::{Engine, EngineError, IndexStats, Recommendation, Weighting, DEFAULT_TOP_N};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

/// Runtime settings for the HTTP front door.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub corpus: PathBuf,
    pub top_n: usize,
    pub weighting: Weighting,
    pub admin_token: Option<String>,
    pub cors_allow_origin: Option<String>,
}

impl ServerConfig {
    pub fn new(corpus: impl Into<PathBuf>) -> Self {
        Self {
            corpus: corpus.into(),
            top_n: DEFAULT_TOP_N,
            weighting: Weighting::default(),
            admin_token: None,
            cors_allow_origin: None,
        }
    }

    /// Fill `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` from the environment.
    pub fn with_env(mut self) -> Self {
        self.admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
        self.cors_allow_origin = std::env::var("CORS_ALLOW_ORIGIN").ok();
        self
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub corpus: PathBuf,
    pub top_n: usize,
    pub admin_token: Option<String>,
}

/// A missing `q` reads as blank; `k <= 0` asks for nothing. Neither is an error.
#[derive(Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub q: String,
    pub k: Option<i64>,
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: String,
    pub took_s: f64,
    pub total_docs: u32,
    pub results: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub reloaded: bool,
    #[serde(flatten)]
    pub stats: IndexStats,
}

/// Maps engine failures onto HTTP responses.
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            EngineError::SourceUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::EmptyCorpus => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::EngineNotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Build the router and attempt the initial index build. A failed build is
/// logged and the server answers 503 until `/admin/reload` succeeds.
pub async fn build_app(config: ServerConfig) -> Result<Router> {
    let engine = Arc::new(Engine::new(config.weighting));
    {
        let engine = Arc::clone(&engine);
        let corpus = config.corpus.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || engine.build(corpus)).await? {
            tracing::warn!(error = %e, "starting without an index");
        }
    }
    Ok(router(engine, &config))
}

/// Router over an existing engine.
pub fn router(engine: Arc<Engine>, config: &ServerConfig) -> Router {
    let app_state = AppState {
        engine,
        corpus: config.corpus.clone(),
        top_n: config.top_n,
        admin_token: config.admin_token.clone(),
    };

    // CORS: comma-separated origins, or any origin by default
    let origins: Vec<_> = config
        .cors_allow_origin
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let index = state.engine.snapshot().ok_or(EngineError::EngineNotInitialized)?;
    let k = match params.k {
        Some(k) => k.clamp(0, MAX_K as i64) as usize,
        None => state.top_n.min(MAX_K),
    };
    let results = index.recommend(&params.q, k);
    let elapsed = start.elapsed();
    tracing::debug!(k, hits = results.len(), "recommend");
    Ok(Json(RecommendResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_docs: index.len() as u32, results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Result<Response, ApiError> {
    let index = state.engine.snapshot().ok_or(EngineError::EngineNotInitialized)?;
    let resp = match index.document(doc_id) {
        Some(doc) => Json(serde_json::json!({
            "doc_id": doc_id,
            "Movie Name": doc.title,
            "Storyline": doc.raw_text,
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))).into_response(),
    };
    Ok(resp)
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<IndexStats>, ApiError> {
    Ok(Json(state.engine.stats()?))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let engine = Arc::clone(&state.engine);
    let corpus = state.corpus.clone();
    let outcome = tokio::task::spawn_blocking(move || engine.build(corpus))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(match outcome {
        Ok(stats) => Json(ReloadResponse { reloaded: true, stats }).into_response(),
        Err(e) => ApiError(e).into_response(),
    })
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
