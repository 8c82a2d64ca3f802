//! playlog-etl - ELT pipeline for play events and the song catalog
//!
//! Loads two semi-structured corpora from object storage into staging
//! tables, then derives a star schema (fact `songplay` plus `users`, `song`,
//! `artist` and `time` dimensions) with set-based transforms:
//! - Schema definitions and DDL rendering ([`schema`], [`models`])
//! - Validated bulk-copy and transform statements ([`sql`])
//! - The warehouse connection seam and postgres-wire client ([`warehouse`])
//! - The ordered pipeline driver ([`pipeline`])
//! - Row-count checks and sample analytics ([`checks`])

pub mod checks;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod sql;
pub mod warehouse;

// Re-export commonly used types
pub use config::{ConfigError, EtlConfig};
pub use models::{Column, SqlType, TableDef};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, Stage};
pub use sql::transform::{TimeParts, decompose_epoch_ms};
pub use sql::{CopyStatement, JsonParseMode, SqlValueError, Statement};
pub use warehouse::{QueryResult, WarehouseClient, WarehouseError, WarehouseResult};

#[cfg(feature = "postgres-backend")]
pub use warehouse::PostgresClient;
