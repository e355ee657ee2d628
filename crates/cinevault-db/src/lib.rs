//! Cinevault-DB: Catalog schema, migrations, and query operations
//!
//! This crate provides the catalog store for cinevault using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management and health reporting
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! Query functions take a `&rusqlite::Connection`, so the same calls work on a
//! pooled connection or inside a `rusqlite::Transaction` (which derefs to one).
//!
//! # Example
//!
//! ```no_run
//! use cinevault_db::models::NewMovie;
//! use cinevault_db::pool::{get_conn, init_pool};
//! use cinevault_db::queries::movies;
//!
//! let pool = init_pool("/var/lib/cinevault/catalog.db").unwrap();
//! let mut conn = get_conn(&pool).unwrap();
//!
//! let tx = conn.transaction().unwrap();
//! let movie = NewMovie::new("Heat", "Heat.mkv", "/movies/Heat.mkv", 1024, ".mkv");
//! let id = movies::upsert_movie(&tx, &movie).unwrap();
//! tx.commit().unwrap();
//! println!("Cataloged movie {id}");
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
