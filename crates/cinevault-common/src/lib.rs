//! Cinevault-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across cinevault:
//!
//! - **Typed IDs**: [`MovieId`], the catalog's surrogate key
//! - **Path Utilities**: supported video formats and MIME type resolution
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use cinevault_common::{Error, MovieId, Result};
//! use cinevault_common::paths::{content_type, is_video_file};
//! use std::path::Path;
//!
//! let id: MovieId = "42".parse().unwrap();
//! assert_eq!(id.get(), 42);
//!
//! assert!(is_video_file(Path::new("movie.mkv")));
//! assert_eq!(content_type(Path::new("movie.mkv")), "video/x-matroska");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("movie 42"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::MovieId;
