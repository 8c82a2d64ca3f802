//! Pipeline driver
//!
//! Sequences the run as an explicit, ordered list of named statements:
//! drop all tables, create all tables, bulk-load both staging tables, run
//! the five transforms. One statement is in flight at a time and each
//! commits independently; the first failure aborts the remainder with no
//! rollback, so after a failed run the operator resets the schema before
//! retrying.

use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::schema;
use crate::sql::transform;
use crate::sql::Statement;
use crate::warehouse::{WarehouseClient, WarehouseError};

/// Named pipeline stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Drop and recreate all seven tables
    ResetSchema,
    /// Bulk-copy both staging tables from object storage
    LoadStaging,
    /// Derive the star schema from staging
    Transform,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::ResetSchema => write!(f, "reset_schema"),
            Stage::LoadStaging => write!(f, "load_staging"),
            Stage::Transform => write!(f, "transform"),
        }
    }
}

/// Error type for pipeline execution
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A statement failed; the run stops here
    #[error("{stage} statement '{statement}' failed: {source}")]
    Statement {
        stage: Stage,
        statement: String,
        source: WarehouseError,
    },

    /// A statement exceeded the configured timeout; treated as fatal
    #[error("{stage} statement '{statement}' timed out after {timeout_secs}s")]
    Timeout {
        stage: Stage,
        statement: String,
        timeout_secs: u64,
    },
}

/// Result type for pipeline execution
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Summary of one full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Run identifier, present in every log line of the run
    pub run_id: Uuid,
    /// DDL statements executed by the schema reset
    pub schema_statements: usize,
    /// Bulk-copy statements executed
    pub load_statements: usize,
    /// Transform statements executed
    pub transform_statements: usize,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl PipelineReport {
    /// Total statements executed across all stages.
    pub fn total_statements(&self) -> usize {
        self.schema_statements + self.load_statements + self.transform_statements
    }
}

/// Drives an ordered pipeline of named statements against one warehouse
/// connection, which it owns exclusively for the run's duration.
pub struct Pipeline<C: WarehouseClient> {
    client: C,
    statement_timeout: Option<Duration>,
}

impl<C: WarehouseClient> Pipeline<C> {
    /// Create a pipeline with no statement timeout.
    pub fn new(client: C) -> Self {
        Self {
            client,
            statement_timeout: None,
        }
    }

    /// Set a per-statement timeout. Zero disables the timeout.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Reference to the underlying connection.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Give the connection back, e.g. to close it.
    pub fn into_client(self) -> C {
        self.client
    }

    async fn run_statement(&self, stage: Stage, statement: &Statement) -> PipelineResult<()> {
        let start = Instant::now();
        tracing::debug!(%stage, statement = %statement.name, "executing statement");

        let result = match self.statement_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.client.execute(&statement.sql))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    return Err(PipelineError::Timeout {
                        stage,
                        statement: statement.name.clone(),
                        timeout_secs: timeout.as_secs(),
                    });
                }
            },
            None => self.client.execute(&statement.sql).await,
        };

        match result {
            Ok(rows) => {
                tracing::info!(
                    %stage,
                    statement = %statement.name,
                    rows,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "statement complete"
                );
                Ok(())
            }
            Err(source) => Err(PipelineError::Statement {
                stage,
                statement: statement.name.clone(),
                source,
            }),
        }
    }

    async fn run_stage(&self, stage: Stage, statements: &[Statement]) -> PipelineResult<usize> {
        for statement in statements {
            self.run_statement(stage, statement).await?;
        }
        Ok(statements.len())
    }

    /// Drop all seven tables, then recreate them. Idempotent: safe against a
    /// partially created or absent schema.
    pub async fn reset_schema(&self) -> PipelineResult<usize> {
        let mut statements = schema::drop_all();
        statements.extend(schema::create_all());
        self.run_stage(Stage::ResetSchema, &statements).await
    }

    /// Run the staging bulk-loads. The staging tables must have been
    /// recreated by [`reset_schema`](Self::reset_schema) beforehand; loads
    /// are append-only.
    pub async fn load_staging(&self, loads: &[Statement]) -> PipelineResult<usize> {
        self.run_stage(Stage::LoadStaging, loads).await
    }

    /// Run the five star-schema transforms, fact first.
    pub async fn run_transforms(&self) -> PipelineResult<usize> {
        self.run_stage(Stage::Transform, &transform::statements())
            .await
    }

    /// Full run: reset schema, load staging, transform.
    pub async fn run(&self, loads: &[Statement]) -> PipelineResult<PipelineReport> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        tracing::info!(%run_id, "pipeline run started");

        let schema_statements = self.reset_schema().await?;
        let load_statements = self.load_staging(loads).await?;
        let transform_statements = self.run_transforms().await?;

        let report = PipelineReport {
            run_id,
            schema_statements,
            load_statements,
            transform_statements,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        tracing::info!(
            %run_id,
            statements = report.total_statements(),
            duration_ms = report.duration_ms,
            "pipeline run complete"
        );
        Ok(report)
    }
}
