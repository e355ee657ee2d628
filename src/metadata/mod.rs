//! External metadata lookup used to enrich catalog entries during a scan.
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - [`providers`] -- Concrete provider implementations (TMDB).

pub mod provider;
pub mod providers;

use std::sync::Arc;

use crate::config::MetadataConfig;

pub use provider::{DisabledProvider, MetadataError, MetadataProvider, MovieMetadata};
pub use providers::TmdbProvider;

/// Build the provider described by `config`.
///
/// Without an API key the scanner still runs, it just never enriches.
pub fn provider_from_config(
    config: &MetadataConfig,
) -> Result<Arc<dyn MetadataProvider>, MetadataError> {
    let tmdb = TmdbProvider::new(config)?;
    if tmdb.is_available() {
        Ok(Arc::new(tmdb))
    } else {
        tracing::info!("No TMDB API key configured, metadata enrichment disabled");
        Ok(Arc::new(DisabledProvider))
    }
}
