use crate::error::SearchError;
use crate::scorer::SearchResult;
use crate::service::RankingService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub mode: Option<String>, // "basic", "medium" or "advanced"
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub loaded: bool,
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub total_links: usize,
    pub avg_words_per_document: f64,
}

// ========== Error Handling ==========

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            let status = rejection.status();
            tracing::debug!(%status, "rejected request body: {}", rejection.body_text());
            return (status, Json(ErrorResponse { error: rejection.body_text() })).into_response();
        }

        let status = match self.0.downcast_ref::<SearchError>() {
            Some(e) if e.is_user_facing() => StatusCode::BAD_REQUEST,
            Some(SearchError::NotLoaded) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = format!("{:#}", self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("API error: {}", message);
        } else {
            tracing::debug!(%status, "rejected request: {}", message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ========== Handlers ==========

async fn health_check(State(service): State<Arc<RankingService>>) -> impl IntoResponse {
    if service.is_loaded() {
        return Json(serde_json::json!({ "status": "OK" }));
    }
    match service.load_error() {
        Some(error) => Json(serde_json::json!({ "status": "FAILED", "error": error })),
        None => Json(serde_json::json!({ "status": "LOADING" })),
    }
}

async fn search(
    State(service): State<Arc<RankingService>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let mode = req.mode.as_deref().unwrap_or("basic");
    let mut results = service.query(&req.query, mode)?;
    if let Some(limit) = req.limit {
        results.truncate(limit);
    }

    Ok(Json(SearchResponse { results }))
}

async fn get_stats(State(service): State<Arc<RankingService>>) -> impl IntoResponse {
    let response = match service.stats() {
        Some(stats) => StatsResponse {
            loaded: true,
            total_documents: stats.total_documents,
            vocabulary_size: stats.vocabulary_size,
            total_links: stats.total_links,
            avg_words_per_document: stats.avg_words_per_document,
        },
        None => StatsResponse {
            loaded: false,
            total_documents: 0,
            vocabulary_size: 0,
            total_links: 0,
            avg_words_per_document: 0.0,
        },
    };

    Json(response)
}

// ========== Router ==========

pub fn create_router(service: Arc<RankingService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", post(search))
        .route("/stats", get(get_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
