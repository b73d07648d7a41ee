use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, HeaderValue, StatusCode}, routing::{get, post}, Json, Router};
use faq_core::rules::{RuleBook, DEFAULT_FUZZY_THRESHOLD};
use faq_core::{DocId, Document, FaqIndex, DEFAULT_THRESHOLD, FALLBACK_REPLY};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub threshold: f64,
    pub fuzzy_threshold: f64,
    pub admin_token: Option<String>,
    /// Comma-separated origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD, admin_token: None, cors_allow_origin: None }
    }
}

impl ServerConfig {
    /// Defaults plus `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` from the environment.
    pub fn from_env() -> Self {
        Self {
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RwLock<FaqIndex>>,
    pub rules: Arc<RuleBook>,
    pub config: Arc<ServerConfig>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    /// Missing is treated as an empty question.
    #[serde(default, alias = "massage")]
    pub message: String,
}

#[derive(Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Semantic,
    Fuzzy,
}

#[derive(Deserialize)]
pub struct ChatParams {
    #[serde(default)]
    pub engine: Engine,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// 0..=1 for both engines
    pub confidence: f64,
    pub matched: bool,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 5 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
}

/// Listed origins only, or any origin when none parse.
fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allow_origin
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let allow = if origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any)
}

pub fn build_app(index: FaqIndex, rules: RuleBook, config: ServerConfig) -> Router {
    let cors = cors_layer(config.cors_allow_origin.as_deref());

    let state = AppState { index: Arc::new(RwLock::new(index)), rules: Arc::new(rules), config: Arc::new(config) };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/chat", post(chat_handler))
        .route("/search", get(search_handler))
        .route("/faq", post(add_faq))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn chat_handler(State(state): State<AppState>, Query(params): Query<ChatParams>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let (reply, confidence) = match params.engine {
        Engine::Semantic => {
            let index = state.index.read();
            let r = index.best_match(&req.message, state.config.threshold);
            (r.answer().map(str::to_string), r.score)
        }
        Engine::Fuzzy => {
            let m = state.rules.respond(&req.message, state.config.fuzzy_threshold);
            (m.response.map(str::to_string), m.score / 100.0)
        }
    };
    let matched = reply.is_some();
    Json(ChatResponse { reply: reply.unwrap_or_else(|| FALLBACK_REPLY.to_string()), confidence, matched })
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 50);
    let index = state.index.read();
    let results = index
        .rank(&params.q, k)
        .into_iter()
        .filter_map(|s| {
            index.document(s.doc_id).map(|d| SearchHit { doc_id: s.doc_id, score: s.score, question: d.question.clone(), answer: d.answer.clone() })
        })
        .collect();
    Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), results })
}

async fn add_faq(State(state): State<AppState>, headers: HeaderMap, Json(faq): Json<NewFaq>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    if faq.question.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "question must not be empty".into()));
    }
    let doc_id = state.index.write().push(Document::new(faq.question, faq.answer));
    tracing::info!(doc_id, "faq added");
    Ok(Json(serde_json::json!({ "doc_id": doc_id })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let Some(required) = state.config.admin_token.as_deref() else {
        return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into()));
    };
    match headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()) {
        Some(provided) if provided == required => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "invalid admin token".into())),
    }
}
