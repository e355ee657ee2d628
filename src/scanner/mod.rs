//! Media library scanner.
//!
//! Walks a directory tree, keeps the supported video files, looks each title
//! up with the configured [`MetadataProvider`] and upserts one catalog row per
//! file. The whole walk runs inside a single transaction: either every file
//! of a scan lands in the catalog or none does.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cinevault_common::paths::video_format;
use cinevault_db::{models::NewMovie, pool::DbPool, queries::movies};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::metadata::{MetadataProvider, MovieMetadata};

/// Errors that abort a scan. The transaction is rolled back in every case.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot resolve scan root {path:?}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk failed at {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot stat {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to catalog {path:?}: {source}")]
    Upsert {
        path: PathBuf,
        #[source]
        source: cinevault_common::Error,
    },

    #[error("transaction {op} failed: {source}")]
    Transaction {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error(transparent)]
    Database(#[from] cinevault_common::Error),

    #[error("scan task failed: {0}")]
    Task(String),
}

/// Counters reported once a scan has committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Non-directory entries encountered by the walk.
    pub files_seen: usize,
    /// Files upserted into the catalog.
    pub cataloged: usize,
    /// Entries left out of the catalog: unsupported extensions, symlinks and
    /// other non-regular files, and paths that are not valid UTF-8.
    pub skipped: usize,
    /// Cataloged files that received provider metadata.
    pub enriched: usize,
    /// Lookups that failed; those files were cataloged without enrichment.
    pub enrichment_failures: usize,
}

/// Scanner for discovering and importing video files.
#[derive(Clone)]
pub struct Scanner {
    pool: DbPool,
    provider: Arc<dyn MetadataProvider>,
}

impl Scanner {
    /// Create a new scanner with database pool and metadata provider.
    pub fn new(pool: DbPool, provider: Arc<dyn MetadataProvider>) -> Self {
        Self { pool, provider }
    }

    /// Scan `root` recursively and commit the result as one transaction.
    ///
    /// The walk and the database work happen on a blocking thread; provider
    /// lookups are driven from there through the current runtime.
    pub async fn scan(&self, root: &Path) -> Result<ScanSummary, ScanError> {
        let scanner = self.clone();
        let root = root.to_path_buf();
        let handle = Handle::current();

        tokio::task::spawn_blocking(move || scanner.scan_blocking(&root, &handle))
            .await
            .map_err(|e| ScanError::Task(e.to_string()))?
    }

    fn scan_blocking(&self, root: &Path, handle: &Handle) -> Result<ScanSummary, ScanError> {
        let root = root.canonicalize().map_err(|source| ScanError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        info!("Scanning directory: {:?}", root);

        let mut conn = cinevault_db::pool::get_conn(&self.pool)?;
        let tx = conn
            .transaction()
            .map_err(|source| ScanError::Transaction { op: "begin", source })?;

        let mut summary = ScanSummary::default();
        let mut lookups: HashMap<String, Option<MovieMetadata>> = HashMap::new();

        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone()),
                source,
            })?;

            let path = entry.path();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            summary.files_seen += 1;

            if !file_type.is_file() {
                debug!(path = %path.display(), "Skipping non-regular file");
                summary.skipped += 1;
                continue;
            }

            // Catalog paths must name the file exactly; lossy conversion
            // would merge distinct files into one row.
            let (Some(path_str), Some(file_name)) = (path.to_str(), entry.file_name().to_str())
            else {
                warn!(path = %path.display(), "Skipping file with non UTF-8 path");
                summary.skipped += 1;
                continue;
            };

            let Some(format) = video_format(path) else {
                debug!(path = %path.display(), "Skipping unsupported file");
                summary.skipped += 1;
                continue;
            };

            let size = entry
                .metadata()
                .map_err(|source| ScanError::Metadata {
                    path: path.to_path_buf(),
                    source,
                })?
                .len();

            let mut movie = NewMovie::new(
                derive_title(file_name),
                file_name,
                path_str,
                i64::try_from(size).unwrap_or(i64::MAX),
                format,
            );

            if let Some(meta) = self.enrich(handle, &mut lookups, &mut summary, &movie.title) {
                apply_metadata(&mut movie, meta);
                summary.enriched += 1;
            }

            movies::upsert_movie(&tx, &movie).map_err(|source| ScanError::Upsert {
                path: path.to_path_buf(),
                source,
            })?;
            summary.cataloged += 1;

            info!(
                path = %path.display(),
                title = %movie.title,
                size,
                "Cataloged file"
            );
        }

        tx.commit()
            .map_err(|source| ScanError::Transaction { op: "commit", source })?;

        info!(
            files = summary.files_seen,
            cataloged = summary.cataloged,
            skipped = summary.skipped,
            enriched = summary.enriched,
            enrichment_failures = summary.enrichment_failures,
            "Scan complete: {:?}",
            root
        );

        Ok(summary)
    }

    /// Best-effort lookup. Successful answers (including "no match") are
    /// remembered for the rest of the scan; failures are not.
    fn enrich(
        &self,
        handle: &Handle,
        lookups: &mut HashMap<String, Option<MovieMetadata>>,
        summary: &mut ScanSummary,
        title: &str,
    ) -> Option<MovieMetadata> {
        if title.is_empty() || !self.provider.is_available() {
            return None;
        }
        if let Some(known) = lookups.get(title) {
            return known.clone();
        }

        match handle.block_on(self.provider.lookup(title)) {
            Ok(found) => {
                if found.is_none() {
                    debug!(title, provider = self.provider.name(), "No metadata match");
                }
                lookups.insert(title.to_string(), found.clone());
                found
            }
            Err(e) => {
                warn!(
                    title,
                    provider = self.provider.name(),
                    error = %e,
                    "Metadata lookup failed, cataloging without enrichment"
                );
                summary.enrichment_failures += 1;
                None
            }
        }
    }
}

/// Candidate title: the file name up to its first `.`.
///
/// `"Movie.Title.2020.mkv"` yields `"Movie"`. Dotted release names are
/// truncated; this is the catalog's long-standing behaviour.
pub fn derive_title(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or_default()
}

fn apply_metadata(movie: &mut NewMovie, meta: MovieMetadata) {
    if let Some(title) = meta.title {
        movie.title = title;
    }
    movie.overview = meta.overview;
    movie.poster_url = meta.poster_url;
    movie.release_date = meta.release_date;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DisabledProvider, MetadataError};
    use async_trait::async_trait;
    use cinevault_db::pool::{get_conn, init_memory_pool};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts lookups and always matches.
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn lookup(&self, title: &str) -> Result<Option<MovieMetadata>, MetadataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(MovieMetadata {
                overview: Some(format!("About {title}")),
                ..MovieMetadata::default()
            }))
        }
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("Show.S01E01.mkv"), "Show");
        assert_eq!(derive_title("Movie.Title.2020.mkv"), "Movie");
        assert_eq!(derive_title("Heat.mp4"), "Heat");
        assert_eq!(derive_title("noext"), "noext");
        assert_eq!(derive_title(".hidden.mkv"), "");
    }

    #[test]
    fn test_apply_metadata_overwrites_title_when_present() {
        let mut movie = NewMovie::new("Alien", "Alien.mkv", "/m/Alien.mkv", 1, ".mkv");
        apply_metadata(
            &mut movie,
            MovieMetadata {
                title: Some("Alien (1979)".into()),
                poster_url: Some("https://img/a.jpg".into()),
                ..MovieMetadata::default()
            },
        );
        assert_eq!(movie.title, "Alien (1979)");
        assert_eq!(movie.poster_url.as_deref(), Some("https://img/a.jpg"));

        apply_metadata(&mut movie, MovieMetadata::default());
        assert_eq!(movie.title, "Alien (1979)");
        assert_eq!(movie.poster_url, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scan_catalogs_supported_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("season1")).unwrap();
        std::fs::write(dir.path().join("season1/Show.S01E01.mkv"), vec![0u8; 5000]).unwrap();
        std::fs::write(dir.path().join("Heat.MP4"), b"abc").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let pool = init_memory_pool().unwrap();
        let scanner = Scanner::new(pool.clone(), Arc::new(DisabledProvider));
        let summary = scanner.scan(dir.path()).await.unwrap();

        assert_eq!(summary.files_seen, 3);
        assert_eq!(summary.cataloged, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.enriched, 0);

        let conn = get_conn(&pool).unwrap();
        let all = movies::list_movies(&conn).unwrap();
        let formats: Vec<_> = all.iter().map(|m| m.format.as_str()).collect();
        assert_eq!(formats, [".mp4", ".mkv"]);
        assert!(all.iter().all(|m| Path::new(&m.file_path).is_absolute()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_lookups_memoised_per_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Show.S01E01.mkv"), b"1").unwrap();
        std::fs::write(dir.path().join("Show.S01E02.mkv"), b"2").unwrap();

        let provider = Arc::new(CountingProvider::default());
        let pool = init_memory_pool().unwrap();
        let scanner = Scanner::new(pool.clone(), provider.clone());

        let summary = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(summary.enriched, 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // A new scan starts with an empty memo
        scanner.scan(dir.path()).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_symlinks_are_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Real.mkv"), b"real").unwrap();
        std::os::unix::fs::symlink("Real.mkv", dir.path().join("Link.mkv")).unwrap();

        let pool = init_memory_pool().unwrap();
        let scanner = Scanner::new(pool.clone(), Arc::new(DisabledProvider));
        let summary = scanner.scan(dir.path()).await.unwrap();

        assert_eq!(summary.files_seen, 2);
        assert_eq!(summary.cataloged, 1);
        assert_eq!(summary.skipped, 1);

        let conn = get_conn(&pool).unwrap();
        let names: Vec<_> = movies::list_movies(&conn)
            .unwrap()
            .into_iter()
            .map(|m| m.file_name)
            .collect();
        assert_eq!(names, ["Real.mkv"]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"Film\xff.mkv")), vec![0u8; 10]).unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"Film\xfe.mkv")), vec![0u8; 20]).unwrap();
        std::fs::write(dir.path().join("Keep.mkv"), b"keep").unwrap();

        let pool = init_memory_pool().unwrap();
        let scanner = Scanner::new(pool.clone(), Arc::new(DisabledProvider));
        let summary = scanner.scan(dir.path()).await.unwrap();

        assert_eq!(summary.files_seen, 3);
        assert_eq!(summary.cataloged, 1);
        assert_eq!(summary.skipped, 2);

        let conn = get_conn(&pool).unwrap();
        let all = movies::list_movies(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].file_name, "Keep.mkv");
        assert!(all.iter().all(|m| Path::new(&m.file_path).is_file()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_memory_pool().unwrap();
        let scanner = Scanner::new(pool, Arc::new(DisabledProvider));

        let err = scanner.scan(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, ScanError::Root { .. }));
    }
}
