use crate::AppState;
use crate::auth::AuthError;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use eureka_web::{SearchError, SearchRequest, SearchResponse};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 20;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/eureka_search", get(eureka_search))
        .with_state(state)
        // method + path + status + latency only; query strings may carry the token
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Errors ---

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Search(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Search(_) => StatusCode::BAD_GATEWAY,
        };
        if let ApiError::Search(e) = &self {
            warn!(target: "api", error = %e, %status, "search.failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

// --- Handlers ---

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Raw query parameters; validated by hand so bad values map to 422.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    limit: Option<String>,
    date_from: Option<String>,
    token: Option<String>,
}

impl SearchParams {
    fn into_request(self) -> Result<SearchRequest, ApiError> {
        let query = self
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ApiError::Invalid("q is required".into()))?;
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_LIMIT).contains(n))
                .ok_or_else(|| {
                    ApiError::Invalid(format!("limit must be an integer in 1..={MAX_LIMIT}"))
                })?,
        };
        Ok(SearchRequest {
            query,
            limit,
            date_from: self.date_from,
        })
    }
}

async fn eureka_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(mut params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let token = params.token.take();
    let request = params.into_request()?;

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.auth.check(authorization, token.as_deref())?;

    let response = state.search.search(&request).await?;
    Ok(Json(response))
}
