//! Pipeline driver integration tests
//!
//! The driver is exercised against recording fakes of the warehouse
//! connection: tests assert the exact statement ordering the run submits,
//! that a failing statement stops the sequence, and that timeouts surface
//! as pipeline errors.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use playlog_etl::checks;
use playlog_etl::pipeline::{Pipeline, PipelineError, Stage};
use playlog_etl::sql::copy;
use playlog_etl::warehouse::{QueryResult, WarehouseClient, WarehouseError, WarehouseResult};

const ROLE: &str = "arn:aws:iam::123456789012:role/dwhRole";

fn staging_loads() -> Vec<playlog_etl::Statement> {
    copy::staging_loads(
        "s3://bucket/log_data",
        "s3://bucket/log_json_path.json",
        "s3://bucket/song_data",
        ROLE,
    )
    .unwrap()
}

/// Records every executed statement; optionally fails when one matches.
#[derive(Default)]
struct RecordingClient {
    executed: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl RecordingClient {
    fn failing_on(pattern: &'static str) -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            fail_on: Some(pattern),
        }
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl WarehouseClient for RecordingClient {
    async fn execute(&self, sql: &str) -> WarehouseResult<u64> {
        if let Some(pattern) = self.fail_on {
            if sql.contains(pattern) {
                return Err(WarehouseError::StatementFailed(format!(
                    "injected failure on {}",
                    pattern
                )));
            }
        }
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(0)
    }

    async fn query(&self, sql: &str) -> WarehouseResult<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(QueryResult::new(
            vec!["count".to_string()],
            vec![serde_json::json!({"count": 0})],
        ))
    }

    async fn close(&self) -> WarehouseResult<()> {
        Ok(())
    }
}

/// Sleeps long enough for any statement to exceed a short timeout.
struct SlowClient;

#[async_trait(?Send)]
impl WarehouseClient for SlowClient {
    async fn execute(&self, _sql: &str) -> WarehouseResult<u64> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(0)
    }

    async fn query(&self, _sql: &str) -> WarehouseResult<QueryResult> {
        Ok(QueryResult::empty())
    }

    async fn close(&self) -> WarehouseResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_full_run_statement_order() {
    let pipeline = Pipeline::new(RecordingClient::default());
    let report = pipeline.run(&staging_loads()).await.unwrap();

    assert_eq!(report.schema_statements, 14);
    assert_eq!(report.load_statements, 2);
    assert_eq!(report.transform_statements, 5);
    assert_eq!(report.total_statements(), 21);

    let executed = pipeline.client().executed();
    assert_eq!(executed.len(), 21);

    // all drops before all creates, so staging is guaranteed empty at load
    assert!(executed[0].starts_with("DROP TABLE IF EXISTS stage_events"));
    assert!(executed[6].starts_with("DROP TABLE IF EXISTS time"));
    assert!(executed[7].starts_with("CREATE TABLE IF NOT EXISTS stage_events"));
    assert!(executed[13].starts_with("CREATE TABLE IF NOT EXISTS time"));

    // staging loads come after DDL, events first
    assert!(executed[14].starts_with("COPY stage_events"));
    assert!(executed[15].starts_with("COPY stage_songs"));

    // transforms run last, fact first
    assert!(executed[16].starts_with("INSERT INTO songplay"));
    assert!(executed[17].starts_with("INSERT INTO users"));
    assert!(executed[20].starts_with("INSERT INTO time"));
}

#[tokio::test]
async fn test_rerun_submits_identical_statements() {
    let loads = staging_loads();

    let first = Pipeline::new(RecordingClient::default());
    first.run(&loads).await.unwrap();

    let second = Pipeline::new(RecordingClient::default());
    second.run(&loads).await.unwrap();

    assert_eq!(first.client().executed(), second.client().executed());
}

#[tokio::test]
async fn test_failure_stops_the_sequence() {
    let pipeline = Pipeline::new(RecordingClient::failing_on("INSERT INTO users"));
    let err = pipeline.run(&staging_loads()).await.unwrap_err();

    match err {
        PipelineError::Statement {
            stage, statement, ..
        } => {
            assert_eq!(stage, Stage::Transform);
            assert_eq!(statement, "insert_users");
        }
        other => panic!("unexpected error: {}", other),
    }

    // the fact insert ran, nothing after the failing statement did
    let executed = pipeline.client().executed();
    assert!(executed.iter().any(|s| s.starts_with("INSERT INTO songplay")));
    assert!(!executed.iter().any(|s| s.starts_with("INSERT INTO song ")));
    assert!(!executed.iter().any(|s| s.starts_with("INSERT INTO artist")));
    assert!(!executed.iter().any(|s| s.starts_with("INSERT INTO time")));
}

#[tokio::test]
async fn test_ddl_failure_prevents_loading() {
    let pipeline = Pipeline::new(RecordingClient::failing_on("CREATE TABLE IF NOT EXISTS songplay"));
    let err = pipeline.run(&staging_loads()).await.unwrap_err();

    match err {
        PipelineError::Statement { stage, .. } => assert_eq!(stage, Stage::ResetSchema),
        other => panic!("unexpected error: {}", other),
    }
    let executed = pipeline.client().executed();
    assert!(!executed.iter().any(|s| s.starts_with("COPY ")));
}

#[tokio::test]
async fn test_statement_timeout_is_fatal() {
    let pipeline =
        Pipeline::new(SlowClient).with_statement_timeout(Duration::from_millis(10));
    let err = pipeline.reset_schema().await.unwrap_err();

    match err {
        PipelineError::Timeout { stage, statement, .. } => {
            assert_eq!(stage, Stage::ResetSchema);
            assert_eq!(statement, "drop_stage_events");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_zero_timeout_disables_the_deadline() {
    let pipeline = Pipeline::new(RecordingClient::default())
        .with_statement_timeout(Duration::from_secs(0));
    assert!(pipeline.reset_schema().await.is_ok());
}

#[tokio::test]
async fn test_stages_run_independently() {
    let pipeline = Pipeline::new(RecordingClient::default());

    pipeline.run_transforms().await.unwrap();
    let executed = pipeline.client().executed();

    // transforms alone touch no DDL and no staging load
    assert_eq!(executed.len(), 5);
    assert!(executed.iter().all(|s| s.starts_with("INSERT INTO")));
}

#[tokio::test]
async fn test_collect_row_counts_covers_all_tables() {
    let client = RecordingClient::default();
    let counts = checks::collect_row_counts(&client).await.unwrap();

    let tables: Vec<&str> = counts.iter().map(|c| c.table.as_str()).collect();
    assert_eq!(
        tables,
        vec!["stage_events", "stage_songs", "songplay", "users", "song", "artist", "time"]
    );
    assert!(counts.iter().all(|c| c.rows == 0));
}
