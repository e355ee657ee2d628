//! Path utilities for detecting video files and their MIME types.
//!
//! The scanner uses [`video_format`] to decide what gets cataloged, and the
//! streaming handlers use [`content_type`] to label response bodies.

use std::path::Path;

/// Video formats the scanner catalogs, as lower-cased extensions with the
/// leading dot.
pub const SUPPORTED_VIDEO_FORMATS: &[&str] =
    &[".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv", ".webm"];

/// Lower-cased extension of `path` including the leading dot, if any.
fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

/// Return the catalog format (e.g. `".mkv"`) of a supported video file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cinevault_common::paths::video_format;
///
/// assert_eq!(video_format(Path::new("Movie.MKV")).as_deref(), Some(".mkv"));
/// assert_eq!(video_format(Path::new("notes.txt")), None);
/// ```
pub fn video_format(path: &Path) -> Option<String> {
    dotted_extension(path).filter(|ext| SUPPORTED_VIDEO_FORMATS.contains(&ext.as_str()))
}

/// Check if a path has a supported video file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cinevault_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("/library/movie.mp4")));
/// assert!(!is_video_file(Path::new("subtitle.srt")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    video_format(path).is_some()
}

/// Determine the MIME type to serve a file with, from its extension.
///
/// Unknown extensions are served as `application/octet-stream`.
pub fn content_type(path: &Path) -> &'static str {
    match dotted_extension(path).as_deref() {
        Some(".mp4") => "video/mp4",
        Some(".mkv") => "video/x-matroska",
        Some(".webm") => "video/webm",
        Some(".avi") => "video/x-msvideo",
        Some(".mov") => "video/quicktime",
        Some(".wmv") => "video/x-ms-wmv",
        Some(".flv") => "video/x-flv",
        _ => "application/octet-stream",
    }
}
