use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

pub type DB = SqlitePool;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Table definitions, applied in order. Every statement is idempotent.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        date         TEXT PRIMARY KEY,
        week         INTEGER NOT NULL,
        day          TEXT NOT NULL,
        phase        TEXT NOT NULL,
        workout_type TEXT NOT NULL,
        title        TEXT NOT NULL,
        completed    INTEGER NOT NULL,
        payload      TEXT NOT NULL,
        synced       INTEGER NOT NULL DEFAULT 0,
        timestamp    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS strength_entries (
        id           TEXT PRIMARY KEY,
        session_date TEXT NOT NULL REFERENCES sessions(date) ON DELETE CASCADE,
        position     INTEGER NOT NULL,
        exercise     TEXT NOT NULL,
        is_skill     INTEGER NOT NULL DEFAULT 0,
        sets         TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_strength_session_date ON strength_entries(session_date)",
    r#"
    CREATE TABLE IF NOT EXISTS cardio_entries (
        session_date     TEXT PRIMARY KEY REFERENCES sessions(date) ON DELETE CASCADE,
        activity         TEXT NOT NULL,
        distance_meters  REAL,
        duration_seconds INTEGER NOT NULL,
        avg_hr           INTEGER,
        peak_hr          INTEGER,
        source           TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metcon_entries (
        session_date TEXT PRIMARY KEY REFERENCES sessions(date) ON DELETE CASCADE,
        format       TEXT NOT NULL,
        rounds       INTEGER NOT NULL,
        reps         INTEGER NOT NULL,
        notes        TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profile (
        id   TEXT PRIMARY KEY CHECK (id = 'current_user'),
        data TEXT NOT NULL
    )
    "#,
];

/// Open (creating if needed) a file-backed database.
pub async fn open(path: &Path) -> Result<DB, sqlx::Error> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
}

/// A private in-memory database. One connection, kept for the life of the
/// pool, so every caller sees the same tables.
pub async fn open_in_memory() -> Result<DB, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
}
