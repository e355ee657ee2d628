//! Library API routes.
//!
//! - `POST /scan` - scan the configured root directory
//! - `GET /movies` - the whole catalog

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cinevault_common::MovieId;
use cinevault_db::{models::Movie, pool::get_conn, queries::movies};
use serde::Serialize;
use serde_json::json;

use super::error::AppError;
use super::AppContext;

/// Create library routes.
pub fn library_routes() -> Router<AppContext> {
    Router::new()
        .route("/scan", post(scan_library))
        .route("/movies", get(list_movies))
}

/// Catalog entry as served to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieResponse {
    pub id: MovieId,
    pub title: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "fileSize")]
    pub file_size: i64,
    pub format: String,
    pub overview: Option<String>,
    #[serde(rename = "posterURL")]
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
}

impl From<Movie> for MovieResponse {
    fn from(m: Movie) -> Self {
        Self {
            id: m.id,
            title: m.title,
            file_name: m.file_name,
            file_path: m.file_path,
            file_size: m.file_size,
            format: m.format,
            overview: m.overview,
            poster_url: m.poster_url,
            release_date: m.release_date,
        }
    }
}

/// Trigger a scan of the configured library root.
async fn scan_library(State(ctx): State<AppContext>) -> Response {
    let Some(root) = ctx.config.library.root_dir.clone() else {
        tracing::info!("Scan requested but no library root is configured");
        return StatusCode::NO_CONTENT.into_response();
    };

    match ctx.scanner.scan(&root).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "msg": "Movies scanned successfully!",
                "summary": summary,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(root = %root.display(), error = %e, "Scan failed, rolled back");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "msg": "Scanning Failed" })),
            )
                .into_response()
        }
    }
}

/// List every catalog entry.
async fn list_movies(State(ctx): State<AppContext>) -> Result<Json<Vec<MovieResponse>>, AppError> {
    let conn = get_conn(&ctx.db)?;
    let movies = movies::list_movies(&conn)?;
    Ok(Json(movies.into_iter().map(MovieResponse::from).collect()))
}
