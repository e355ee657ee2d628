//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the TMDB v3 `search/movie`
//! endpoint and keeping only the first result.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Retry on transport errors, HTTP 429 (honouring `Retry-After`) and 5xx.
//! - Per-request timeout from [`MetadataConfig`].

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MetadataConfig;
use crate::metadata::provider::{MetadataError, MetadataProvider, MovieMetadata};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_AFTER_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovieSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use cinevault::config::MetadataConfig;
/// use cinevault::metadata::providers::TmdbProvider;
///
/// let config = MetadataConfig {
///     api_key: Some("your-api-key".into()),
///     ..MetadataConfig::default()
/// };
/// let provider = TmdbProvider::new(&config).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    language: String,
    base_url: String,
    image_base_url: String,
    max_retries: u32,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Build a provider from the `[metadata]` config section.
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(MetadataError::Client)?;

        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            language: config.language.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            rate_limiter,
        })
    }

    fn search_url(&self, api_key: &str, title: &str) -> String {
        format!(
            "{}/search/movie?api_key={}&language={}&query={}",
            self.base_url,
            urlencoded(api_key),
            urlencoded(&self.language),
            urlencoded(title)
        )
    }

    /// Execute a GET request with rate limiting and retry logic.
    async fn get(&self, url: &str) -> Result<reqwest::Response, MetadataError> {
        let mut attempt = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let wait = match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let retryable = status == StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    if !retryable || attempt >= self.max_retries {
                        return Err(MetadataError::Status(status));
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        retry_after(&resp).unwrap_or_else(|| backoff(attempt))
                    } else {
                        backoff(attempt)
                    }
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(MetadataError::Transport(e));
                    }
                    debug!(error = %e, "TMDB transport error");
                    backoff(attempt)
                }
            };

            attempt += 1;
            warn!(
                retry = attempt,
                wait_ms = wait.as_millis() as u64,
                "TMDB request failed, backing off"
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn to_metadata(&self, result: TmdbMovieSearchResult) -> MovieMetadata {
        MovieMetadata {
            title: non_empty(result.title),
            overview: non_empty(result.overview),
            poster_url: non_empty(result.poster_path)
                .map(|path| format!("{}{}", self.image_base_url, path)),
            release_date: non_empty(result.release_date),
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn lookup(&self, title: &str) -> Result<Option<MovieMetadata>, MetadataError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let url = self.search_url(api_key, title);
        debug!(title, "TMDB search");

        let body: TmdbSearchResponse = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(MetadataError::Decode)?;

        Ok(body
            .results
            .into_iter()
            .next()
            .map(|result| self.to_metadata(result)))
    }
}

fn retry_after(resp: &reqwest::Response) -> Option<Duration> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}

fn backoff(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.saturating_pow(attempt.min(5))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Percent-encoding for query parameter values. Spaces become `%20`.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";
