//! CLI binary entry point for playlog-etl

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use playlog_etl::cli::commands::{
    handle_counts, handle_load_staging, handle_reset_schema, handle_run, handle_run_transforms,
};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "playlog-etl")]
#[command(about = "Warehouse ELT pipeline for play events and the song catalog")]
#[command(version)]
struct Cli {
    /// Directory containing .playlog-etl.toml
    #[arg(short, long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate all staging and star-schema tables
    ResetSchema,
    /// Bulk-copy both staging tables from object storage
    LoadStaging,
    /// Derive the star schema from the staging tables
    RunTransforms,
    /// Full pipeline run: reset schema, load staging, transform
    Run,
    /// Print row counts for all tables
    Counts,
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::ResetSchema => handle_reset_schema(&cli.config_dir).await,
            Commands::LoadStaging => handle_load_staging(&cli.config_dir).await,
            Commands::RunTransforms => handle_run_transforms(&cli.config_dir).await,
            Commands::Run => handle_run(&cli.config_dir).await,
            Commands::Counts => handle_counts(&cli.config_dir).await,
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
