//! Bulk-copy statements for the staging loads
//!
//! Each staging table is filled by one warehouse-native `COPY` from object
//! storage. The event log uses an explicit JSONPaths mapping; the song
//! catalog uses key-name matching. Loads are append-only into tables the
//! pipeline has just recreated, so a run never duplicates staging rows.

use crate::models::TableDef;
use crate::schema;

use super::{
    Statement, SqlValueResult, quote_literal, validate_iam_role_arn, validate_s3_uri,
};

/// How the bulk load maps source JSON onto staging columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonParseMode {
    /// Match JSON keys to column names (`json 'auto'`)
    Auto,
    /// Explicit field mapping via a JSONPaths file in object storage
    JsonPaths(String),
}

/// A validated bulk-copy specification for one staging table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyStatement {
    table: &'static TableDef,
    source: String,
    iam_role: String,
    mode: JsonParseMode,
}

impl CopyStatement {
    /// Build a copy specification, validating every externally supplied value.
    pub fn new(
        table: &'static TableDef,
        source: &str,
        iam_role: &str,
        mode: JsonParseMode,
    ) -> SqlValueResult<Self> {
        validate_s3_uri(source)?;
        validate_iam_role_arn(iam_role)?;
        if let JsonParseMode::JsonPaths(paths) = &mode {
            validate_s3_uri(paths)?;
        }
        Ok(Self {
            table,
            source: source.to_string(),
            iam_role: iam_role.to_string(),
            mode,
        })
    }

    /// The staging table this copy targets.
    pub fn table(&self) -> &'static TableDef {
        self.table
    }

    /// Render the `COPY` statement.
    pub fn render(&self) -> String {
        let json_option = match &self.mode {
            JsonParseMode::Auto => quote_literal("auto"),
            JsonParseMode::JsonPaths(paths) => quote_literal(paths),
        };
        format!(
            "COPY {}\nFROM {}\nIAM_ROLE {}\nJSON {}",
            self.table.name,
            quote_literal(&self.source),
            quote_literal(&self.iam_role),
            json_option
        )
    }

    /// Convert into a named pipeline statement.
    pub fn into_statement(self) -> Statement {
        let name = format!("copy_{}", self.table.name);
        let sql = self.render();
        Statement::new(name, sql)
    }
}

/// Build the two staging loads in load order (events, then songs).
pub fn staging_loads(
    log_data: &str,
    log_jsonpath: &str,
    song_data: &str,
    iam_role: &str,
) -> SqlValueResult<Vec<Statement>> {
    let events = CopyStatement::new(
        &schema::STAGE_EVENTS,
        log_data,
        iam_role,
        JsonParseMode::JsonPaths(log_jsonpath.to_string()),
    )?;
    let songs = CopyStatement::new(
        &schema::STAGE_SONGS,
        song_data,
        iam_role,
        JsonParseMode::Auto,
    )?;
    Ok(vec![events.into_statement(), songs.into_statement()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlValueError;

    const ROLE: &str = "arn:aws:iam::123456789012:role/dwhRole";

    #[test]
    fn test_copy_with_jsonpaths() {
        let copy = CopyStatement::new(
            &schema::STAGE_EVENTS,
            "s3://udacity-dend/log_data",
            ROLE,
            JsonParseMode::JsonPaths("s3://udacity-dend/log_json_path.json".to_string()),
        )
        .unwrap();
        let sql = copy.render();
        assert!(sql.starts_with("COPY stage_events\n"));
        assert!(sql.contains("FROM 's3://udacity-dend/log_data'"));
        assert!(sql.contains("IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(sql.ends_with("JSON 's3://udacity-dend/log_json_path.json'"));
    }

    #[test]
    fn test_copy_with_auto_matching() {
        let copy = CopyStatement::new(
            &schema::STAGE_SONGS,
            "s3://udacity-dend/song_data",
            ROLE,
            JsonParseMode::Auto,
        )
        .unwrap();
        assert!(copy.render().ends_with("JSON 'auto'"));
    }

    #[test]
    fn test_invalid_source_rejected() {
        let result = CopyStatement::new(
            &schema::STAGE_EVENTS,
            "file:///etc/passwd",
            ROLE,
            JsonParseMode::Auto,
        );
        assert!(matches!(result, Err(SqlValueError::InvalidFormat { .. })));
    }

    #[test]
    fn test_invalid_jsonpaths_rejected() {
        let result = CopyStatement::new(
            &schema::STAGE_EVENTS,
            "s3://bucket/log_data",
            ROLE,
            JsonParseMode::JsonPaths("not-a-uri".to_string()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_staging_loads_order_and_names() {
        let loads = staging_loads(
            "s3://bucket/log_data",
            "s3://bucket/log_json_path.json",
            "s3://bucket/song_data",
            ROLE,
        )
        .unwrap();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].name, "copy_stage_events");
        assert_eq!(loads[1].name, "copy_stage_songs");
        assert!(loads[1].sql.contains("JSON 'auto'"));
    }
}
