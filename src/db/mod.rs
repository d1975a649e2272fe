//! Database module for SQLite operations.
//!
//! This module provides:
//! - Pool construction, pragma configuration and schema bootstrap
//! - Repository layer for stage reads and writes

pub mod schema;
pub mod repo;

pub use schema::init_db;
pub use repo::{Repository, StoreError};
