//! # Tasktrack - minimal project/task tracker
//!
//! Tasktrack persists projects and their tasks in a single-file SQLite store.
//!
//! Tasktrack provides:
//! - A closed set of table and column identifiers, validated before any SQL is built
//! - An idempotent schema initializer for the `projects` and `tasks` tables
//! - Generic, parameter-bound CRUD operations over either table
//! - Typed `Project` / `Task` records on top of the generic rows

pub mod model;
pub mod storage;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use model::{Column, FieldValue, NewProject, NewTask, Project, Row, Table, Task};
pub use storage::Store;

/// Result type alias for Tasktrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tasktrack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Invalid value for {column}: {value}")]
    InvalidValue { column: Column, value: String },

    #[error("{table} expects {expected} values, got {got}")]
    Arity { table: Table, expected: usize, got: usize },

    #[error("{0} requires at least one predicate")]
    EmptyPredicate(&'static str),

    #[error("Update requires at least one field")]
    EmptyUpdate,

    #[error("Column {0} cannot be modified")]
    ImmutableColumn(Column),

    #[error("Project #{0} not found")]
    ProjectNotFound(i64),

    #[error("{table} row #{id} not found")]
    RowNotFound { table: Table, id: i64 },
}
