use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::extract::{self, get_meta};
use crate::fetch::{FetchError, PageFetcher};
use crate::models::{DebugHtmlResponse, PageQuery, ParseDebug, ParseResponse};

const PREVIEW_CHARS: usize = 5000;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing URL")]
    MissingUrl,
    #[error("Fetch failed")]
    Fetch(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingUrl => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": "Missing URL"}))).into_response()
            }
            ApiError::Fetch(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Fetch failed",
                    "details": e.to_string(),
                    "success": false,
                })),
            )
                .into_response(),
        }
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

pub fn router(fetcher: PageFetcher) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/parse", get(parse))
        .route("/debug-html", get(debug_html))
        .layer(CorsLayer::permissive())
        .with_state(fetcher)
}

fn required_url(query: PageQuery) -> Result<String, ApiError> {
    query
        .url
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn parse(
    State(fetcher): State<PageFetcher>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ParseResponse>, ApiError> {
    let url = required_url(query)?;

    let html = fetcher.fetch_html(&url).await.map_err(|e| {
        tracing::error!(url = %url, error = %e, "parser error");
        e
    })?;

    let result = extract::extract(&html);
    tracing::info!(url = %url, title = %result.title, image = ?result.image, "parsed page");

    let debug = ParseDebug {
        has_og_image: get_meta(&html, "og:image").is_some(),
        has_og_title: get_meta(&html, "og:title").is_some(),
        html_length: html.chars().count(),
    };

    Ok(Json(ParseResponse { result, debug }))
}

async fn debug_html(
    State(fetcher): State<PageFetcher>,
    Query(query): Query<PageQuery>,
) -> Response {
    let url = match required_url(query) {
        Ok(url) => url,
        Err(e) => return e.into_response(),
    };

    match fetcher.fetch_html(&url).await {
        Ok(html) => Json(DebugHtmlResponse {
            html_preview: html.chars().take(PREVIEW_CHARS).collect(),
            full_length: html.chars().count(),
            contains_og_image: html.contains("og:image"),
            contains_og_title: html.contains("og:title"),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(url = %url, error = %e, "debug fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
