//! Statement assembly: named statements, value validation and quoting
//!
//! Configuration-supplied values (bucket URIs, credential ARNs) never reach a
//! statement by raw interpolation. The warehouse's bulk-load options cannot be
//! bound as query parameters, so every such value is validated against an
//! anchored pattern and single-quote escaped before it is embedded.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub mod copy;
pub mod transform;

pub use copy::{CopyStatement, JsonParseMode};

/// Maximum length for any value embedded in a statement
pub const MAX_VALUE_LENGTH: usize = 1024;

/// Errors raised while validating statement values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlValueError {
    /// Value is empty when one is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Value exceeds the maximum embedded length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Value does not match the expected shape
    #[error("{field} has invalid format: {value}")]
    InvalidFormat { field: &'static str, value: String },
}

/// Result type for value validation.
pub type SqlValueResult<T> = Result<T, SqlValueError>;

/// A named SQL statement, the unit of pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Stable name used for logging and error reporting
    pub name: String,
    /// The statement text
    pub sql: String,
}

impl Statement {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

static S3_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^s3://[a-z0-9][a-z0-9.-]{1,61}[a-z0-9](/[A-Za-z0-9!_.*()/=-]*)?$")
        .expect("Invalid regex")
});

static IAM_ROLE_ARN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:aws:iam::[0-9]{12}:role/[A-Za-z0-9+=,.@_/-]+$").expect("Invalid regex")
});

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));

fn check_length(field: &'static str, value: &str) -> SqlValueResult<()> {
    if value.is_empty() {
        return Err(SqlValueError::Empty(field));
    }
    if value.len() > MAX_VALUE_LENGTH {
        return Err(SqlValueError::TooLong {
            field,
            max: MAX_VALUE_LENGTH,
            actual: value.len(),
        });
    }
    Ok(())
}

/// Validate an `s3://bucket/prefix` object-storage URI.
pub fn validate_s3_uri(uri: &str) -> SqlValueResult<()> {
    check_length("s3 uri", uri)?;
    if !S3_URI_RE.is_match(uri) {
        return Err(SqlValueError::InvalidFormat {
            field: "s3 uri",
            value: uri.to_string(),
        });
    }
    Ok(())
}

/// Validate an IAM role ARN used as the bulk-load credential reference.
pub fn validate_iam_role_arn(arn: &str) -> SqlValueResult<()> {
    check_length("iam role arn", arn)?;
    if !IAM_ROLE_ARN_RE.is_match(arn) {
        return Err(SqlValueError::InvalidFormat {
            field: "iam role arn",
            value: arn.to_string(),
        });
    }
    Ok(())
}

/// Validate a bare SQL identifier (table or column name).
pub fn validate_identifier(name: &str) -> SqlValueResult<()> {
    check_length("identifier", name)?;
    if !IDENTIFIER_RE.is_match(name) {
        return Err(SqlValueError::InvalidFormat {
            field: "identifier",
            value: name.to_string(),
        });
    }
    Ok(())
}

/// Quote a value as a SQL string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
