//! Post-run validation and sample analytics
//!
//! Row counts over all seven tables are the cheapest end-to-end check that a
//! run actually moved data. The canned analytics statements exercise the
//! star schema the way a consumer would: fact joined to dimensions.

use serde::Serialize;

use crate::schema;
use crate::warehouse::{WarehouseClient, WarehouseError, WarehouseResult};

/// Row count for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRowCount {
    pub table: String,
    pub rows: i64,
}

/// `SELECT count(*)` for one table.
pub fn row_count_sql(table: &str) -> String {
    format!("SELECT count(*) AS count FROM {}", table)
}

/// Collect row counts for all seven tables, in schema order.
pub async fn collect_row_counts<C: WarehouseClient>(
    client: &C,
) -> WarehouseResult<Vec<TableRowCount>> {
    let mut counts = Vec::with_capacity(schema::ALL_TABLES.len());
    for table in schema::ALL_TABLES {
        let result = client.query(&row_count_sql(table.name)).await?;
        let rows = result.scalar_i64().ok_or_else(|| {
            WarehouseError::StatementFailed(format!("count for {} returned no rows", table.name))
        })?;
        counts.push(TableRowCount {
            table: table.name.to_string(),
            rows,
        });
    }
    Ok(counts)
}

/// Canned analytics over the star schema.
pub mod analysis_sql {
    /// Ten most played songs with their artists.
    pub const TOP_PLAYED_SONGS: &str = r#"
SELECT s.title AS song, a.name AS artist, COUNT(*) AS play_count
FROM songplay sp
JOIN song s
    ON s.song_id = sp.song_id
JOIN artist a
    ON a.artist_id = sp.artist_id
GROUP BY s.title, a.name
ORDER BY play_count DESC
LIMIT 10
"#;

    /// Five busiest hours of the day across all observed event times.
    pub const PLAYS_BY_HOUR: &str = r#"
SELECT t.hour, COUNT(*) AS usage_count
FROM time t
GROUP BY t.hour
ORDER BY usage_count DESC
LIMIT 5
"#;
}
