//! Concrete metadata provider implementations.

pub mod tmdb;

pub use tmdb::TmdbProvider;
