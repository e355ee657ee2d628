//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use cinevault_common::MovieId;
use serde::{Deserialize, Serialize};

/// A persisted catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub file_name: String,
    /// Absolute path on disk; unique across the catalog.
    pub file_path: String,
    pub file_size: i64,
    /// Lower-cased extension including the leading dot, e.g. `".mkv"`.
    pub format: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingestible columns of a catalog entry, as produced by a scan.
///
/// Upserting a `NewMovie` overwrites every one of these columns when a row
/// with the same `file_path` already exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub format: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
}

impl NewMovie {
    /// Locally-derived fields only; enrichment fields start empty.
    pub fn new(
        title: impl Into<String>,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_size: i64,
        format: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size,
            format: format.into(),
            ..Self::default()
        }
    }
}
