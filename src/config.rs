//! Pipeline configuration file support
//!
//! Handles parsing of `.playlog-etl.toml` configuration files and
//! environment variable overrides. The transform logic itself never reads
//! configuration; everything here feeds the connection and the staging-load
//! statements, and every value that ends up inside a statement is validated
//! first.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::sql::{SqlValueError, validate_iam_role_arn, validate_s3_uri};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".playlog-etl.toml";

/// Environment variable for the cluster endpoint
pub const ENV_CLUSTER_HOST: &str = "PLAYLOG_ETL_CLUSTER_HOST";

/// Environment variable for the cluster password
pub const ENV_CLUSTER_PASSWORD: &str = "PLAYLOG_ETL_CLUSTER_PASSWORD";

/// Environment variable for the bulk-load IAM role ARN
pub const ENV_IAM_ROLE_ARN: &str = "PLAYLOG_ETL_IAM_ROLE_ARN";

/// Environment variable for the per-statement timeout in seconds
pub const ENV_STATEMENT_TIMEOUT: &str = "PLAYLOG_ETL_STATEMENT_TIMEOUT";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file
    #[error("IO error: {0}")]
    IoError(String),

    /// Failed to parse the configuration file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Failed to serialize the configuration
    #[error("Failed to serialize config: {0}")]
    SerializationError(String),

    /// A configured value failed statement-value validation
    #[error("Invalid config value: {0}")]
    InvalidValue(#[from] SqlValueError),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Warehouse cluster connection section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    /// Cluster endpoint hostname
    #[serde(default)]
    pub host: String,

    /// Cluster port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Target database name
    #[serde(default)]
    pub dbname: String,

    /// Database user
    #[serde(default)]
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: String,
}

fn default_port() -> u16 {
    5439
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            dbname: String::new(),
            user: String::new(),
            password: String::new(),
        }
    }
}

/// Bulk-load credential section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IamSection {
    /// IAM role ARN the warehouse assumes when reading object storage
    #[serde(default)]
    pub role_arn: String,
}

/// Object-storage source section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3Section {
    /// Activity-log corpus location
    #[serde(default)]
    pub log_data: String,

    /// JSONPaths mapping for the activity-log load
    #[serde(default)]
    pub log_jsonpath: String,

    /// Song-catalog corpus location
    #[serde(default)]
    pub song_data: String,
}

/// Pipeline behavior section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Per-statement timeout in seconds; 0 disables the timeout
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,
}

fn default_statement_timeout() -> u64 {
    900
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            statement_timeout_secs: default_statement_timeout(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.playlog-etl.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EtlConfig {
    /// Warehouse cluster connection
    #[serde(default)]
    pub cluster: ClusterSection,

    /// Bulk-load credential reference
    #[serde(default)]
    pub iam: IamSection,

    /// Object-storage sources
    #[serde(default)]
    pub s3: S3Section,

    /// Pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl EtlConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory containing `.playlog-etl.toml`.
    ///
    /// Falls back to defaults if the file is absent, then applies
    /// environment variable overrides.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> ConfigResult<()> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;
        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Convert configuration to a TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationError(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var(ENV_CLUSTER_HOST) {
            self.cluster.host = host;
        }
        if let Ok(password) = std::env::var(ENV_CLUSTER_PASSWORD) {
            self.cluster.password = password;
        }
        if let Ok(arn) = std::env::var(ENV_IAM_ROLE_ARN) {
            self.iam.role_arn = arn;
        }
        if let Ok(timeout) = std::env::var(ENV_STATEMENT_TIMEOUT)
            && let Ok(secs) = timeout.parse()
        {
            self.pipeline.statement_timeout_secs = secs;
        }
    }

    /// Validate every value that will be embedded in a statement.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_s3_uri(&self.s3.log_data)?;
        validate_s3_uri(&self.s3.log_jsonpath)?;
        validate_s3_uri(&self.s3.song_data)?;
        validate_iam_role_arn(&self.iam.role_arn)?;
        Ok(())
    }

    /// Assemble the key/value connection string for the cluster.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            quote_conn_value(&self.cluster.host),
            self.cluster.port,
            quote_conn_value(&self.cluster.dbname),
            quote_conn_value(&self.cluster.user),
            quote_conn_value(&self.cluster.password),
        )
    }

    /// Per-statement timeout; `None` when disabled.
    pub fn statement_timeout(&self) -> Option<Duration> {
        (self.pipeline.statement_timeout_secs > 0)
            .then(|| Duration::from_secs(self.pipeline.statement_timeout_secs))
    }

    /// Check if configuration exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(CONFIG_FILENAME).exists()
    }
}

/// Quote a libpq-style connection value if it needs it.
fn quote_conn_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '\'', '\\']) {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        value.to_string()
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# playlog-etl configuration
# Connection, credential and source settings for the warehouse pipeline.

[cluster]
# Warehouse cluster endpoint
host = "example-cluster.abc123.us-west-2.redshift.amazonaws.com"
port = 5439
dbname = "dwh"
user = "dwhuser"
password = ""

[iam]
# Role the warehouse assumes when reading the source buckets
role_arn = "arn:aws:iam::123456789012:role/dwhRole"

[s3]
# Activity-log corpus (JSON lines) and its JSONPaths mapping
log_data = "s3://udacity-dend/log_data"
log_jsonpath = "s3://udacity-dend/log_json_path.json"

# Song-catalog corpus (JSON, keys match staging column names)
song_data = "s3://udacity-dend/song_data"

[pipeline]
# Per-statement timeout in seconds; 0 disables the timeout
statement_timeout_secs = 900
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EtlConfig::new();
        assert_eq!(config.cluster.port, 5439);
        assert_eq!(config.pipeline.statement_timeout_secs, 900);
        assert!(config.cluster.host.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[cluster]
host = "cluster.example.com"
dbname = "dwh"
user = "etl"
password = "secret"

[iam]
role_arn = "arn:aws:iam::123456789012:role/dwhRole"

[s3]
log_data = "s3://bucket/log_data"
log_jsonpath = "s3://bucket/log_json_path.json"
song_data = "s3://bucket/song_data"

[pipeline]
statement_timeout_secs = 60
"#;
        let config = EtlConfig::parse(toml).unwrap();
        assert_eq!(config.cluster.host, "cluster.example.com");
        assert_eq!(config.cluster.port, 5439);
        assert_eq!(config.pipeline.statement_timeout_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_string() {
        let mut config = EtlConfig::new();
        config.cluster.host = "cluster.example.com".to_string();
        config.cluster.dbname = "dwh".to_string();
        config.cluster.user = "etl".to_string();
        config.cluster.password = "pass word".to_string();
        assert_eq!(
            config.connection_string(),
            "host=cluster.example.com port=5439 dbname=dwh user=etl password='pass word'"
        );
    }

    #[test]
    fn test_statement_timeout_zero_disables() {
        let mut config = EtlConfig::new();
        config.pipeline.statement_timeout_secs = 0;
        assert_eq!(config.statement_timeout(), None);
        config.pipeline.statement_timeout_secs = 30;
        assert_eq!(config.statement_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_validate_rejects_bad_sources() {
        let mut config = EtlConfig::new();
        config.s3.log_data = "ftp://bucket/log_data".to_string();
        config.s3.log_jsonpath = "s3://bucket/log_json_path.json".to_string();
        config.s3.song_data = "s3://bucket/song_data".to_string();
        config.iam.role_arn = "arn:aws:iam::123456789012:role/dwhRole".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = EtlConfig::new();
        config.cluster.host = "cluster.example.com".to_string();

        config.save(dir.path()).unwrap();
        assert!(EtlConfig::exists(dir.path()));

        let loaded = EtlConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.cluster.host, "cluster.example.com");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = EtlConfig::load(dir.path()).unwrap();
        assert_eq!(config.cluster.port, 5439);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = EtlConfig::parse(sample_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.cluster.port, 5439);
    }
}
