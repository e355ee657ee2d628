//! Cinevault - personal movie library server
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod metadata;
pub mod scanner;
pub mod server;
pub mod streaming;
