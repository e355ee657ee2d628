//! Common error types used throughout cinevault.
//!
//! This module provides a unified error type covering the outcomes a request
//! can end in: not found, malformed or unsatisfiable ranges, database
//! failures, and I/O failures.

/// Common error type for cinevault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested catalog entry was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A `Range` header could not be parsed.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A well-formed range lies outside the resource.
    #[error("Range not satisfiable for resource of {size} bytes")]
    RangeNotSatisfiable {
        /// Size of the resource the range was checked against.
        size: u64,
    },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidRange error.
    pub fn invalid_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error maps to at the API boundary.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidRange(_) => 400,
            Self::RangeNotSatisfiable { .. } => 416,
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("movie 7");
        assert_eq!(err.to_string(), "Not found: movie 7");

        let err = Error::database("connection failed");
        assert_eq!(err.to_string(), "Database error: connection failed");

        let err = Error::invalid_range("start is not a number");
        assert_eq!(err.to_string(), "Invalid range: start is not a number");

        let err = Error::RangeNotSatisfiable { size: 100 };
        assert_eq!(
            err.to_string(),
            "Range not satisfiable for resource of 100 bytes"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_http_status() {
        assert_eq!(Error::not_found("x").http_status(), 404);
        assert_eq!(Error::invalid_range("x").http_status(), 400);
        assert_eq!(Error::RangeNotSatisfiable { size: 0 }.http_status(), 416);
        assert_eq!(Error::database("x").http_status(), 500);
        assert_eq!(Error::internal("x").http_status(), 500);
        assert_eq!(
            Error::from(std::io::Error::other("disk")).http_status(),
            500
        );
    }
}
