//! Catalog query operations.
//!
//! Writes are keyed on the unique `file_path`; reads serve the listing and
//! streaming paths.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use cinevault_common::{Error, MovieId, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Movie, NewMovie};

const MOVIE_COLUMNS: &str = "id, title, file_name, file_path, file_size, format, overview,
                             poster_url, release_date, created_at, updated_at";

fn parse_timestamp(value: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_movie(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: MovieId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        file_name: row.get(2)?,
        file_path: row.get(3)?,
        file_size: row.get(4)?,
        format: row.get(5)?,
        overview: row.get(6)?,
        poster_url: row.get(7)?,
        release_date: row.get(8)?,
        created_at: parse_timestamp(row.get(9)?),
        updated_at: parse_timestamp(row.get(10)?),
    })
}

/// Insert a catalog entry, or overwrite the existing entry with the same path.
///
/// Every ingestible column is replaced on conflict; the surrogate id and
/// `created_at` are kept. Returns the id of the inserted or updated row.
pub fn upsert_movie(conn: &Connection, movie: &NewMovie) -> Result<MovieId> {
    let now = Utc::now().to_rfc3339();

    conn.query_row(
        "INSERT INTO movies (title, file_name, file_path, file_size, format, overview,
                             poster_url, release_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
         ON CONFLICT (file_path) DO UPDATE SET
             title = excluded.title,
             file_name = excluded.file_name,
             file_size = excluded.file_size,
             format = excluded.format,
             overview = excluded.overview,
             poster_url = excluded.poster_url,
             release_date = excluded.release_date,
             updated_at = excluded.updated_at
         RETURNING id",
        params![
            movie.title,
            movie.file_name,
            movie.file_path,
            movie.file_size,
            movie.format,
            movie.overview,
            movie.poster_url,
            movie.release_date,
            now,
        ],
        |row| row.get::<_, i64>(0),
    )
    .map(MovieId::from)
    .map_err(|e| Error::database(format!("upsert of {} failed: {}", movie.file_path, e)))
}

/// List the whole catalog, oldest entry first.
pub fn list_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;

    let movies = stmt
        .query_map([], row_to_movie)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}

/// Get a catalog entry by id.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<Movie>> {
    conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?"),
        [id.get()],
        row_to_movie,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Resolve a catalog id to the file it was indexed from.
pub fn get_movie_path(conn: &Connection, id: MovieId) -> Result<Option<PathBuf>> {
    conn.query_row(
        "SELECT file_path FROM movies WHERE id = ?",
        [id.get()],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map(|path| path.map(PathBuf::from))
    .map_err(|e| Error::database(e.to_string()))
}

/// Number of entries in the catalog.
pub fn count_movies(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
