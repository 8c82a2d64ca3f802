//! Command handlers for the `playlog-etl` binary
//!
//! Each handler loads configuration from the given directory, connects,
//! runs one control-surface operation, and prints a short summary.

use std::path::Path;
use std::time::Duration;

use crate::checks;
use crate::config::EtlConfig;
use crate::pipeline::Pipeline;
use crate::sql::Statement;
use crate::sql::copy;
use crate::warehouse::PostgresClient;

use super::error::CliError;

async fn connect(config: &EtlConfig) -> Result<PostgresClient, CliError> {
    let client = PostgresClient::connect(&config.connection_string()).await?;
    tracing::info!(endpoint = %client.connection_string_masked(), "connected to warehouse");
    Ok(client)
}

fn pipeline_for(config: &EtlConfig, client: PostgresClient) -> Pipeline<PostgresClient> {
    Pipeline::new(client).with_statement_timeout(Duration::from_secs(
        config.pipeline.statement_timeout_secs,
    ))
}

fn staging_statements(config: &EtlConfig) -> Result<Vec<Statement>, CliError> {
    config.validate()?;
    let statements = copy::staging_loads(
        &config.s3.log_data,
        &config.s3.log_jsonpath,
        &config.s3.song_data,
        &config.iam.role_arn,
    )?;
    Ok(statements)
}

/// Drop and recreate all seven tables.
pub async fn handle_reset_schema(config_dir: &Path) -> Result<(), CliError> {
    let config = EtlConfig::load(config_dir)?;
    let client = connect(&config).await?;
    let executed = pipeline_for(&config, client).reset_schema().await?;
    println!("Schema reset ({} statements)", executed);
    Ok(())
}

/// Bulk-copy both staging tables.
pub async fn handle_load_staging(config_dir: &Path) -> Result<(), CliError> {
    let config = EtlConfig::load(config_dir)?;
    let loads = staging_statements(&config)?;
    let client = connect(&config).await?;
    let executed = pipeline_for(&config, client).load_staging(&loads).await?;
    println!("Staging loaded ({} copies)", executed);
    Ok(())
}

/// Run the five star-schema transforms.
pub async fn handle_run_transforms(config_dir: &Path) -> Result<(), CliError> {
    let config = EtlConfig::load(config_dir)?;
    let client = connect(&config).await?;
    let executed = pipeline_for(&config, client).run_transforms().await?;
    println!("Transforms complete ({} statements)", executed);
    Ok(())
}

/// Full pipeline run: reset schema, load staging, transform.
pub async fn handle_run(config_dir: &Path) -> Result<(), CliError> {
    let config = EtlConfig::load(config_dir)?;
    let loads = staging_statements(&config)?;
    let client = connect(&config).await?;
    let report = pipeline_for(&config, client).run(&loads).await?;
    println!(
        "Run {} complete: {} statements in {}ms",
        report.run_id,
        report.total_statements(),
        report.duration_ms
    );
    Ok(())
}

/// Print row counts for all seven tables.
pub async fn handle_counts(config_dir: &Path) -> Result<(), CliError> {
    let config = EtlConfig::load(config_dir)?;
    let client = connect(&config).await?;
    let counts = checks::collect_row_counts(&client).await?;

    println!("Number of records:");
    for count in counts {
        println!("{:<14} {:>12}", count.table, count.rows);
    }
    Ok(())
}
