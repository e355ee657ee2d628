//! Direct streaming with HTTP range requests.
//!
//! Serves cataloged files as-is, honouring a single `Range: bytes=` window.

use std::io::SeekFrom;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use cinevault_common::{paths::content_type, Error, MovieId};
use cinevault_db::{pool::get_conn, queries::movies};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::copy::tracked_body;
use super::range::parse_range;
use crate::server::{error::AppError, AppContext};

/// Serve a cataloged movie with range request support.
///
/// The catalog is only consulted for the id-to-path lookup; the connection
/// goes back to the pool before the file is opened. Sizes come from the file
/// itself, not from the catalog row.
pub async fn stream_movie(
    State(ctx): State<AppContext>,
    Path(movie_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id: MovieId = movie_id
        .parse()
        .map_err(|_| Error::not_found(format!("movie {movie_id}")))?;

    let conn = get_conn(&ctx.db)?;
    let file_path = movies::get_movie_path(&conn, id)?
        .ok_or_else(|| Error::not_found(format!("movie {id}")))?;
    drop(conn);

    let mut file = File::open(&file_path).await.map_err(|e| {
        Error::internal(format!("cannot open {}: {e}", file_path.display()))
    })?;

    let file_size = file
        .metadata()
        .await
        .map_err(|e| Error::internal(format!("cannot stat {}: {e}", file_path.display())))?
        .len();

    let range = headers
        .get(header::RANGE)
        .map(|value| {
            let value = value
                .to_str()
                .map_err(|_| Error::invalid_range("header is not valid ASCII"))?;
            parse_range(value, file_size).map_err(Error::from)
        })
        .transpose()?;

    let mime = content_type(&file_path);
    let label = file_path.display().to_string();

    let response = match range {
        Some(range) => {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(|e| Error::internal(format!("Seek failed: {e}")))?;

            let body = tracked_body(file.take(range.len()), range.len(), label);

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, range.len().to_string())
                .header(header::CONTENT_RANGE, range.content_range())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(body)
        }
        None => {
            let body = tracked_body(file.take(file_size), file_size, label);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(body)
        }
    };

    response.map_err(|e| AppError::from(Error::internal(e.to_string())))
}
