//! Warehouse connection abstraction
//!
//! The pipeline only needs a SQL-executing connection; this module defines
//! that seam. The postgres-wire backend lives behind the `postgres-backend`
//! feature, and tests substitute recording fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "postgres-backend")]
pub mod postgres;

#[cfg(feature = "postgres-backend")]
pub use postgres::PostgresClient;

/// Error type for warehouse operations
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Failed to connect to the warehouse
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A statement was rejected or failed mid-execution. DDL, bulk-load and
    /// transform failures all surface here and are fatal to the run.
    #[error("Statement failed: {0}")]
    StatementFailed(String),
}

/// Result type for warehouse operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Query result row as a JSON value
pub type QueryRow = serde_json::Value;

/// Query result set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<QueryRow>,
}

impl QueryResult {
    /// Create a new query result
    pub fn new(columns: Vec<String>, rows: Vec<QueryRow>) -> Self {
        Self { columns, rows }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row as an integer, for count-style queries.
    pub fn scalar_i64(&self) -> Option<i64> {
        let column = self.columns.first()?;
        self.rows.first()?.get(column)?.as_i64()
    }
}

/// The SQL-executing connection the pipeline drives.
///
/// Exactly one statement is in flight at a time and every statement commits
/// independently; implementations do not need to batch or coordinate.
#[async_trait(?Send)]
pub trait WarehouseClient {
    /// Execute a statement, returning the number of rows affected.
    async fn execute(&self, sql: &str) -> WarehouseResult<u64>;

    /// Execute a query and return its result set.
    async fn query(&self, sql: &str) -> WarehouseResult<QueryResult>;

    /// Close the connection.
    async fn close(&self) -> WarehouseResult<()>;
}
