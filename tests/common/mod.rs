//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a library directory, a file-backed
//! catalog in a temp directory, and a full [`AppContext`]. The
//! [`TestHarness::with_server`] constructor starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cinevault::config::Config;
use cinevault::metadata::{MetadataError, MetadataProvider, MovieMetadata};
use cinevault::scanner::{ScanError, ScanSummary, Scanner};
use cinevault::server::{create_router, AppContext};
use cinevault_common::MovieId;
use cinevault_db::models::Movie;
use cinevault_db::pool::{get_conn, init_pool, DbPool, PooledConnection};
use cinevault_db::queries::movies;
use tempfile::TempDir;

/// Metadata provider answering from a fixed table.
///
/// Titles listed in `failing` return an error; unknown titles match nothing.
#[derive(Default)]
pub struct StaticProvider {
    answers: HashMap<String, MovieMetadata>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, title: &str, metadata: MovieMetadata) -> Self {
        self.answers.insert(title.to_string(), metadata);
        self
    }

    pub fn fail(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn lookup(&self, title: &str) -> Result<Option<MovieMetadata>, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(title) {
            return Err(MetadataError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ));
        }
        Ok(self.answers.get(title).cloned())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// SQLite file in a temp directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub scanner: Scanner,
    library: TempDir,
    _db_dir: TempDir,
}

impl TestHarness {
    /// Harness whose provider never matches anything.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(StaticProvider::new()))
    }

    pub fn with_provider(provider: Arc<dyn MetadataProvider>) -> Self {
        let library = tempfile::tempdir().expect("failed to create library dir");
        let mut config = Config::default();
        config.library.root_dir = Some(library.path().to_path_buf());
        Self::build(config, library, provider)
    }

    /// Harness with a custom configuration. The library directory is still
    /// created but only used as root if `config` does not name one.
    pub fn with_config(config: Config) -> Self {
        let library = tempfile::tempdir().expect("failed to create library dir");
        Self::build(config, library, Arc::new(StaticProvider::new()))
    }

    fn build(mut config: Config, library: TempDir, provider: Arc<dyn MetadataProvider>) -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create db dir");
        let db_path = db_dir.path().join("catalog.db");
        config.database.path = db_path.clone();

        let db = init_pool(db_path.to_str().expect("utf-8 temp path"))
            .expect("failed to create pool");
        let scanner = Scanner::new(db.clone(), provider);
        let ctx = AppContext::new(config, db.clone(), scanner.clone());

        Self {
            ctx,
            db,
            scanner,
            library,
            _db_dir: db_dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    pub fn library(&self) -> &Path {
        self.library.path()
    }

    /// Write `data` to `rel` under the library directory.
    pub fn write_file(&self, rel: &str, data: &[u8]) -> PathBuf {
        let path = self.library.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dirs");
        }
        std::fs::write(&path, data).expect("failed to write file");
        path
    }

    pub async fn scan(&self) -> Result<ScanSummary, ScanError> {
        self.scanner.scan(self.library.path()).await
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn movies(&self) -> Vec<Movie> {
        movies::list_movies(&self.conn()).expect("failed to list movies")
    }

    pub fn movie_named(&self, file_name: &str) -> Movie {
        self.movies()
            .into_iter()
            .find(|m| m.file_name == file_name)
            .unwrap_or_else(|| panic!("{file_name} not cataloged"))
    }

    pub fn movie_id(&self, file_name: &str) -> MovieId {
        self.movie_named(file_name).id
    }
}

/// Deterministic bytes so range bodies can be checked by content.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
