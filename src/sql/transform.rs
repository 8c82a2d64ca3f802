//! Staging-to-star transforms
//!
//! Five independent set-based transforms derive the star schema from the
//! staging tables. Each is a single `INSERT ... SELECT`; none reads a final
//! table, so their relative order does not affect correctness. The fact
//! transform runs first by convention.
//!
//! Event timestamps arrive as epoch milliseconds and are converted with
//! `TIMESTAMP 'epoch' + (ts / 1000) * INTERVAL '1 second'`; the integer
//! division truncates to whole seconds. [`decompose_epoch_ms`] mirrors the
//! warehouse-side decomposition exactly for use in code and tests.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use super::Statement;

/// Sentinel `page` value identifying a play event.
pub const PLAY_EVENT_PAGE: &str = "NextSong";

/// Fact derivation. Events join the catalog on exact, case-sensitive
/// (artist name, song title) equality. Plays that do not resolve to a
/// catalog entry are dropped: the fact table only records plays with a
/// known song and artist.
pub const INSERT_SONGPLAY: &str = r#"
INSERT INTO songplay (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT TIMESTAMP 'epoch' + (e.ts / 1000) * INTERVAL '1 second',
       e.user_id,
       e.level,
       s.song_id,
       s.artist_id,
       e.session_id,
       e.location,
       e.user_agent
FROM stage_events e
LEFT JOIN stage_songs s
    ON e.artist = s.artist_name AND
       e.song = s.title
WHERE e.page = 'NextSong' AND
      e.user_id IS NOT NULL AND
      s.song_id IS NOT NULL AND
      s.artist_id IS NOT NULL
"#;

/// User dimension. A user's subscription level changes over time, so a plain
/// distinct over the full tuple could emit the same user id twice. One row
/// per user id: the most recent event wins, with session/item tie-breakers
/// making the pick deterministic for equal timestamps.
pub const INSERT_USERS: &str = r#"
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT user_id, first_name, last_name, gender, level
FROM (
    SELECT e.user_id,
           e.first_name,
           e.last_name,
           e.gender,
           e.level,
           ROW_NUMBER() OVER (
               PARTITION BY e.user_id
               ORDER BY e.ts DESC, e.session_id DESC, e.item_in_session DESC
           ) AS event_rank
    FROM stage_events e
    WHERE e.user_id IS NOT NULL
) latest
WHERE event_rank = 1
"#;

/// Song dimension. Song ids are unique per catalog tuple, so a distinct
/// selection suffices.
pub const INSERT_SONG: &str = r#"
INSERT INTO song (song_id, title, artist_id, year, duration)
SELECT DISTINCT song_id,
       title,
       artist_id,
       year,
       duration
FROM stage_songs
WHERE song_id IS NOT NULL
"#;

/// Artist dimension. The catalog stages one row per song, so an artist with
/// several songs can appear with conflicting location or coordinates. One
/// row per artist id, preferring the newest catalog entry, song id as the
/// total-order tie-break.
pub const INSERT_ARTIST: &str = r#"
INSERT INTO artist (artist_id, name, location, latitude, longitude)
SELECT artist_id, name, location, latitude, longitude
FROM (
    SELECT s.artist_id,
           s.artist_name AS name,
           s.artist_location AS location,
           s.artist_latitude AS latitude,
           s.artist_longitude AS longitude,
           ROW_NUMBER() OVER (
               PARTITION BY s.artist_id
               ORDER BY s.year DESC, s.song_id
           ) AS catalog_rank
    FROM stage_songs s
    WHERE s.artist_id IS NOT NULL
) latest
WHERE catalog_rank = 1
"#;

/// Time dimension. Every distinct event timestamp is decomposed once and
/// stored; the scope is all events, not just plays, so the time dimension
/// can be a superset of the fact table's start times.
pub const INSERT_TIME: &str = r#"
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
WITH event_times AS (
    SELECT DISTINCT TIMESTAMP 'epoch' + (ts / 1000) * INTERVAL '1 second' AS start_time
    FROM stage_events
    WHERE ts IS NOT NULL
)
SELECT start_time,
       EXTRACT(hour FROM start_time),
       EXTRACT(day FROM start_time),
       EXTRACT(week FROM start_time),
       EXTRACT(month FROM start_time),
       EXTRACT(year FROM start_time),
       EXTRACT(weekday FROM start_time)
FROM event_times
"#;

/// All five transforms in execution order: fact first, then dimensions.
pub fn statements() -> Vec<Statement> {
    vec![
        Statement::new("insert_songplay", INSERT_SONGPLAY.trim()),
        Statement::new("insert_users", INSERT_USERS.trim()),
        Statement::new("insert_song", INSERT_SONG.trim()),
        Statement::new("insert_artist", INSERT_ARTIST.trim()),
        Statement::new("insert_time", INSERT_TIME.trim()),
    ]
}

/// Calendar decomposition of one event timestamp.
///
/// Matches the warehouse's `EXTRACT` semantics: `week` is the ISO week
/// number and `weekday` counts from 0 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

/// Decompose an epoch-milliseconds timestamp the way the time transform
/// does. Division truncates to whole seconds, mirroring the SQL expression.
/// Returns `None` only for values outside the representable date range.
pub fn decompose_epoch_ms(epoch_ms: i64) -> Option<TimeParts> {
    let start_time = DateTime::from_timestamp(epoch_ms / 1000, 0)?.naive_utc();
    Some(TimeParts {
        start_time,
        hour: start_time.hour(),
        day: start_time.day(),
        week: start_time.iso_week().week(),
        month: start_time.month(),
        year: start_time.year(),
        weekday: start_time.weekday().num_days_from_sunday(),
    })
}
