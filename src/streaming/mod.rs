//! Media streaming module.
//!
//! Files are served directly from disk with HTTP range support:
//!
//! - `GET /movie/{movie_id}` - full (200) or partial (206) content

pub mod copy;
mod direct;
pub mod range;

pub use direct::stream_movie;
pub use range::{parse_range, ByteRange, RangeError};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create the direct streaming router.
pub fn movie_router() -> Router<AppContext> {
    Router::new().route("/movie/:movie_id", get(stream_movie))
}
