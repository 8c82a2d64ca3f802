//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::PipelineError;
use crate::sql::SqlValueError;
use crate::warehouse::WarehouseError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid statement value: {0}")]
    InvalidValue(#[from] SqlValueError),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}
