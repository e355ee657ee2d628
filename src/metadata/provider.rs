//! Trait definition and types for metadata providers.
//!
//! The scanner only depends on [`MetadataProvider`], so tests and alternative
//! backends can stand in for TMDB.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Best-match record returned by a title lookup.
///
/// Every field is optional; providers normalise empty strings to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieMetadata {
    /// Display title according to the provider.
    pub title: Option<String>,
    /// Synopsis / overview text.
    pub overview: Option<String>,
    /// Fully-qualified poster image URL.
    pub poster_url: Option<String>,
    /// Release date as reported by the provider (usually `YYYY-MM-DD`).
    pub release_date: Option<String>,
}

/// Failure of a single lookup. Callers treat every variant as non-fatal.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The request never produced a response (connect error, timeout, ...).
    #[error("metadata request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("metadata provider returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not the expected JSON.
    #[error("failed to decode metadata response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build metadata client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Async lookup of external metadata by free-text title.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has credentials and can serve lookups.
    fn is_available(&self) -> bool;

    /// Look up `title` and return the provider's first result, or `None` when
    /// nothing matched.
    async fn lookup(&self, title: &str) -> Result<Option<MovieMetadata>, MetadataError>;
}

/// Provider used when no credential is configured. Never matches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl MetadataProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn lookup(&self, _title: &str) -> Result<Option<MovieMetadata>, MetadataError> {
        Ok(None)
    }
}
