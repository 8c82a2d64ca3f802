//! Warehouse schema for the playlog star model
//!
//! Two staging tables land the raw JSON corpora; five final tables form the
//! star schema (fact `songplay` plus the `users`, `song`, `artist` and `time`
//! dimensions). Staging tables carry no keys at all: duplicates and nulls are
//! expected in the source data and are resolved during transformation, not at
//! load time.

use crate::models::{Column, SqlType, TableDef};
use crate::sql::Statement;

/// Landing table for the activity-log corpus, one row per raw event record.
///
/// Loaded with an explicit JSONPaths mapping, so column names here are free
/// to use snake_case regardless of the source's key spelling.
pub const STAGE_EVENTS: TableDef = TableDef::new(
    "stage_events",
    &[
        Column::new("artist", SqlType::Text),
        Column::new("auth", SqlType::Text),
        Column::new("first_name", SqlType::Text),
        Column::new("gender", SqlType::Text),
        Column::new("item_in_session", SqlType::Integer),
        Column::new("last_name", SqlType::Text),
        Column::new("length", SqlType::Float4),
        Column::new("level", SqlType::Text),
        Column::new("location", SqlType::Text),
        Column::new("method", SqlType::Text),
        Column::new("page", SqlType::Text),
        Column::new("registration", SqlType::Float8),
        Column::new("session_id", SqlType::Integer),
        Column::new("song", SqlType::Text),
        Column::new("status", SqlType::Integer),
        Column::new("ts", SqlType::BigInt),
        Column::new("user_agent", SqlType::Text),
        Column::new("user_id", SqlType::Text),
    ],
);

/// Landing table for the song-catalog corpus, one row per catalog entry.
///
/// Loaded with key-name matching (`json 'auto'`), so column names must match
/// the source's keys exactly.
pub const STAGE_SONGS: TableDef = TableDef::new(
    "stage_songs",
    &[
        Column::new("num_songs", SqlType::Integer),
        Column::new("artist_id", SqlType::Text),
        Column::new("artist_latitude", SqlType::Float4),
        Column::new("artist_longitude", SqlType::Float4),
        Column::new("artist_location", SqlType::Text),
        Column::new("artist_name", SqlType::Text),
        Column::new("song_id", SqlType::Text),
        Column::new("title", SqlType::Text),
        Column::new("duration", SqlType::Float4),
        Column::new("year", SqlType::Integer),
    ],
);

/// Fact table: one row per play event resolvable against the catalog.
///
/// `start_time` doubles as the sort key so time-range scans stay cheap; the
/// song/artist/user references are NOT NULL because unresolvable plays are
/// excluded by the transform, not stored with gaps.
pub const SONGPLAY: TableDef = TableDef::new(
    "songplay",
    &[
        Column::new("songplay_id", SqlType::Integer).identity().primary_key(),
        Column::new("start_time", SqlType::Timestamp).not_null().sort_key(),
        Column::new("user_id", SqlType::Text).not_null(),
        Column::new("level", SqlType::Text),
        Column::new("song_id", SqlType::Text).not_null(),
        Column::new("artist_id", SqlType::Text).not_null(),
        Column::new("session_id", SqlType::Integer),
        Column::new("location", SqlType::Text),
        Column::new("user_agent", SqlType::Text),
    ],
);

/// User dimension, one row per user id with their latest observed attributes.
pub const USERS: TableDef = TableDef::new(
    "users",
    &[
        Column::new("user_id", SqlType::Text).primary_key(),
        Column::new("first_name", SqlType::Text),
        Column::new("last_name", SqlType::Text),
        Column::new("gender", SqlType::Text),
        Column::new("level", SqlType::Text),
    ],
);

/// Song dimension, one row per catalog song.
pub const SONG: TableDef = TableDef::new(
    "song",
    &[
        Column::new("song_id", SqlType::Text).primary_key(),
        Column::new("title", SqlType::Text),
        Column::new("artist_id", SqlType::Text).not_null(),
        Column::new("year", SqlType::Integer),
        Column::new("duration", SqlType::Float4),
    ],
);

/// Artist dimension, one row per catalog artist.
pub const ARTIST: TableDef = TableDef::new(
    "artist",
    &[
        Column::new("artist_id", SqlType::Text).primary_key(),
        Column::new("name", SqlType::Text),
        Column::new("location", SqlType::Text),
        Column::new("latitude", SqlType::Float4),
        Column::new("longitude", SqlType::Float4),
    ],
);

/// Time dimension, one row per distinct event timestamp with its calendar
/// decomposition precomputed.
pub const TIME: TableDef = TableDef::new(
    "time",
    &[
        Column::new("start_time", SqlType::Timestamp).primary_key(),
        Column::new("hour", SqlType::Integer),
        Column::new("day", SqlType::Integer),
        Column::new("week", SqlType::Integer),
        Column::new("month", SqlType::Integer),
        Column::new("year", SqlType::Integer),
        Column::new("weekday", SqlType::Integer),
    ],
);

/// Every table the pipeline owns, staging first.
pub const ALL_TABLES: [&TableDef; 7] = [
    &STAGE_EVENTS,
    &STAGE_SONGS,
    &SONGPLAY,
    &USERS,
    &SONG,
    &ARTIST,
    &TIME,
];

/// The two staging tables, in load order.
pub const STAGING_TABLES: [&TableDef; 2] = [&STAGE_EVENTS, &STAGE_SONGS];

/// `DROP TABLE IF EXISTS` statements for the whole schema.
pub fn drop_all() -> Vec<Statement> {
    ALL_TABLES
        .iter()
        .map(|t| Statement::new(format!("drop_{}", t.name), t.drop_sql()))
        .collect()
}

/// `CREATE TABLE IF NOT EXISTS` statements for the whole schema.
pub fn create_all() -> Vec<Statement> {
    ALL_TABLES
        .iter()
        .map(|t| Statement::new(format!("create_{}", t.name), t.create_sql()))
        .collect()
}
