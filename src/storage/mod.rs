//! Storage Layer - SQLite-backed persistence
//!
//! The store is a single SQLite file with tables:
//! - projects(id, name, start_date, end_date)
//! - tasks(id, project_id, name, description, status, start_date, end_date)

pub mod query;
pub mod schema;
pub mod sqlite;

pub use sqlite::{Store, DbStats};
