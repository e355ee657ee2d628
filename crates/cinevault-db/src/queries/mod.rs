//! Database query modules.
//!
//! - movies: catalog upsert, listing, and id → path resolution

pub mod movies;
