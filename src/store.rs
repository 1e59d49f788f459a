//! Durable storage for the athlete profile and committed session logs.
//!
//! Each committed session is written as one transaction: the index row in
//! `sessions` carries the full payload, and the strength, cardio and MetCon
//! tables hold per-category projections for analytics. At most one session
//! exists per date; saving the same date again replaces it.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{self, DB, SCHEMA},
    error::{StorageError, StorageResult},
    models::{
        AthleteProfile, CardioEntry, CardioRow, MetConEntry, MetConRow, PerformanceData,
        PerformanceRecord, SessionIndexRecord, StrengthEntry, StrengthRow, date_key,
    },
    program::Phase,
    types::WorkoutType,
};

const PROFILE_ID: &str = "current_user";

pub struct Store {
    pool: DB,
    /// Held for the whole of every multi-table write.
    writer: Mutex<()>,
    location: String,
}

/// Strength row ready to insert.
struct EncodedStrength {
    id: String,
    exercise: String,
    is_skill: bool,
    sets: String,
}

type SessionRow = (String, i64, String, String, String, bool, String);
type StrengthRowRaw = (String, String, String, bool, String);
type CardioRowRaw = (String, String, Option<f64>, i64, Option<i64>, Option<i64>, Option<String>);
type MetConRowRaw = (String, String, i64, i64, Option<String>);

impl Store {
    /// Open a file-backed store and make sure its tables exist.
    pub async fn connect(path: &Path) -> StorageResult<Self> {
        let location = path.display().to_string();
        let pool = db::open(path)
            .await
            .map_err(|source| StorageError::Unavailable {
                location: location.clone(),
                source,
            })?;
        info!("opened store at {location}");
        Self::from_pool(pool, location).await
    }

    /// Private store that disappears when dropped.
    pub async fn in_memory() -> StorageResult<Self> {
        let location = "sqlite::memory:".to_string();
        let pool = db::open_in_memory()
            .await
            .map_err(|source| StorageError::Unavailable {
                location: location.clone(),
                source,
            })?;
        Self::from_pool(pool, location).await
    }

    async fn from_pool(pool: DB, location: String) -> StorageResult<Self> {
        let store = Self {
            pool,
            writer: Mutex::new(()),
            location,
        };
        store.initialize().await?;
        Ok(store)
    }

    /// Create any missing tables. Safe to call repeatedly.
    pub async fn initialize(&self) -> StorageResult<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|source| StorageError::Unavailable {
                    location: self.location.clone(),
                    source,
                })?;
        }
        info!("schema ready at {}", self.location);
        Ok(())
    }

    pub fn pool(&self) -> &DB {
        &self.pool
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    //
    // Profile
    //

    pub async fn save_profile(&self, profile: &AthleteProfile) -> StorageResult<()> {
        let data = serde_json::to_string(profile).map_err(|source| StorageError::Encode {
            what: "profile",
            source,
        })?;

        let _guard = self.writer.lock().await;
        sqlx::query(
            "INSERT INTO profile (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(PROFILE_ID)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(StorageError::tx("save_profile"))?;

        debug!("saved profile for {}", profile.name);
        Ok(())
    }

    pub async fn get_profile(&self) -> StorageResult<Option<AthleteProfile>> {
        let data: Option<String> = sqlx::query_scalar("SELECT data FROM profile WHERE id = ?")
            .bind(PROFILE_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::query("get_profile"))?;

        data.map(|d| {
            serde_json::from_str(&d).map_err(|e| StorageError::corrupt("profile", e.to_string()))
        })
        .transpose()
    }

    //
    // Sessions
    //

    /// Commit a session log, replacing whatever was stored for its date.
    pub async fn save_workout(
        &self,
        record: &PerformanceRecord,
        phase: Phase,
        workout_type: WorkoutType,
        title: &str,
    ) -> StorageResult<()> {
        const OP: &str = "save_workout";

        let payload = serde_json::to_string(&record.performance).map_err(|source| {
            StorageError::Encode {
                what: "performance payload",
                source,
            }
        })?;
        let strength = record
            .performance
            .strength()
            .iter()
            .map(|entry| {
                Ok(EncodedStrength {
                    id: Uuid::new_v4().to_string(),
                    exercise: entry.exercise.clone(),
                    is_skill: entry.is_skill,
                    sets: serde_json::to_string(&entry.sets).map_err(|source| {
                        StorageError::Encode {
                            what: "set list",
                            source,
                        }
                    })?,
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await.map_err(StorageError::tx(OP))?;

        let written = write_record(
            &mut tx,
            record,
            &payload,
            &strength,
            phase,
            workout_type,
            title,
        )
        .await;

        match written {
            Ok(()) => {
                tx.commit().await.map_err(StorageError::tx(OP))?;
                debug!(
                    "saved {} session for {} ({} strength rows)",
                    workout_type,
                    record.date_key(),
                    strength.len()
                );
                Ok(())
            }
            Err(source) => {
                warn!("rolling back session for {}: {source}", record.date_key());
                if let Err(e) = tx.rollback().await {
                    warn!("rollback failed: {e}");
                }
                Err(StorageError::TransactionFailure { op: OP, source })
            }
        }
    }

    /// Remove the session logged for `date`. Returns whether one existed.
    pub async fn delete_workout(&self, date: NaiveDate) -> StorageResult<bool> {
        const OP: &str = "delete_workout";
        let key = date_key(date);

        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await.map_err(StorageError::tx(OP))?;

        match remove_record(&mut tx, &key).await {
            Ok(existed) => {
                tx.commit().await.map_err(StorageError::tx(OP))?;
                debug!("retracted session for {key}: {existed}");
                Ok(existed)
            }
            Err(source) => {
                warn!("rolling back retraction for {key}: {source}");
                if let Err(e) = tx.rollback().await {
                    warn!("rollback failed: {e}");
                }
                Err(StorageError::TransactionFailure { op: OP, source })
            }
        }
    }

    /// Every committed session, oldest first.
    pub async fn get_all_sessions(&self) -> StorageResult<Vec<SessionIndexRecord>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT date, week, phase, workout_type, title, completed, timestamp
             FROM sessions ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::query("get_all_sessions"))?;

        rows.into_iter().map(decode_session).collect()
    }

    /// The full record logged for `date`, if any.
    pub async fn get_record(&self, date: NaiveDate) -> StorageResult<Option<PerformanceRecord>> {
        let row: Option<(i64, String, bool, String)> = sqlx::query_as(
            "SELECT week, day, completed, payload FROM sessions WHERE date = ?",
        )
        .bind(date_key(date))
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::query("get_record"))?;

        let Some((week, day, completed, payload)) = row else {
            return Ok(None);
        };
        let data: PerformanceData = serde_json::from_str(&payload)
            .map_err(|e| StorageError::corrupt("sessions", e.to_string()))?;

        Ok(Some(PerformanceRecord::new(week, &day, date, completed, data)))
    }

    pub async fn get_strength_entries(&self) -> StorageResult<Vec<StrengthRow>> {
        let rows: Vec<StrengthRowRaw> = sqlx::query_as(
            "SELECT id, session_date, exercise, is_skill, sets
             FROM strength_entries ORDER BY session_date ASC, position ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::query("get_strength_entries"))?;

        rows.into_iter()
            .map(|(id, date, exercise, is_skill, sets)| {
                let sets = serde_json::from_str(&sets)
                    .map_err(|e| StorageError::corrupt("strength_entries", e.to_string()))?;
                Ok(StrengthRow {
                    id,
                    session_date: parse_date("strength_entries", &date)?,
                    entry: StrengthEntry {
                        exercise,
                        is_skill,
                        sets,
                    },
                })
            })
            .collect()
    }

    pub async fn get_cardio_entries(&self) -> StorageResult<Vec<CardioRow>> {
        let rows: Vec<CardioRowRaw> = sqlx::query_as(
            "SELECT session_date, activity, distance_meters, duration_seconds, avg_hr, peak_hr, source
             FROM cardio_entries ORDER BY session_date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::query("get_cardio_entries"))?;

        rows.into_iter()
            .map(|(date, activity, distance_meters, duration, avg_hr, peak_hr, source)| {
                const T: &str = "cardio_entries";
                Ok(CardioRow {
                    session_date: parse_date(T, &date)?,
                    entry: CardioEntry {
                        activity,
                        distance_meters,
                        duration_seconds: to_u32(T, duration)?,
                        avg_hr: avg_hr.map(|v| to_u32(T, v)).transpose()?,
                        peak_hr: peak_hr.map(|v| to_u32(T, v)).transpose()?,
                        source,
                    },
                })
            })
            .collect()
    }

    pub async fn get_metcon_entries(&self) -> StorageResult<Vec<MetConRow>> {
        let rows: Vec<MetConRowRaw> = sqlx::query_as(
            "SELECT session_date, format, rounds, reps, notes
             FROM metcon_entries ORDER BY session_date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::query("get_metcon_entries"))?;

        rows.into_iter()
            .map(|(date, format, rounds, reps, notes)| {
                const T: &str = "metcon_entries";
                Ok(MetConRow {
                    session_date: parse_date(T, &date)?,
                    entry: MetConEntry {
                        format,
                        rounds: to_u32(T, rounds)?,
                        reps: to_u32(T, reps)?,
                        notes,
                    },
                })
            })
            .collect()
    }
}

async fn write_record(
    tx: &mut Transaction<'_, Sqlite>,
    record: &PerformanceRecord,
    payload: &str,
    strength: &[EncodedStrength],
    phase: Phase,
    workout_type: WorkoutType,
    title: &str,
) -> Result<(), sqlx::Error> {
    let conn: &mut SqliteConnection = tx;
    let key = record.date_key();
    let data = &record.performance;

    sqlx::query(
        "INSERT INTO sessions
             (date, week, day, phase, workout_type, title, completed, payload, synced, timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(date) DO UPDATE SET
             week = excluded.week,
             day = excluded.day,
             phase = excluded.phase,
             workout_type = excluded.workout_type,
             title = excluded.title,
             completed = excluded.completed,
             payload = excluded.payload,
             synced = excluded.synced,
             timestamp = excluded.timestamp",
    )
    .bind(&key)
    .bind(i64::from(record.week))
    .bind(&record.day)
    .bind(phase.as_str())
    .bind(workout_type.as_str())
    .bind(title)
    .bind(record.completed)
    .bind(payload)
    .bind(data.synced_from_sensor())
    .bind(data.timestamp().to_rfc3339())
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM strength_entries WHERE session_date = ?")
        .bind(&key)
        .execute(&mut *conn)
        .await?;

    for (position, row) in strength.iter().enumerate() {
        sqlx::query(
            "INSERT INTO strength_entries (id, session_date, position, exercise, is_skill, sets)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&key)
        .bind(position as i64)
        .bind(&row.exercise)
        .bind(row.is_skill)
        .bind(&row.sets)
        .execute(&mut *conn)
        .await?;
    }

    match data.cardio() {
        Some(c) => {
            sqlx::query(
                "INSERT INTO cardio_entries
                     (session_date, activity, distance_meters, duration_seconds, avg_hr, peak_hr, source)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(session_date) DO UPDATE SET
                     activity = excluded.activity,
                     distance_meters = excluded.distance_meters,
                     duration_seconds = excluded.duration_seconds,
                     avg_hr = excluded.avg_hr,
                     peak_hr = excluded.peak_hr,
                     source = excluded.source",
            )
            .bind(&key)
            .bind(&c.activity)
            .bind(c.distance_meters)
            .bind(i64::from(c.duration_seconds))
            .bind(c.avg_hr.map(i64::from))
            .bind(c.peak_hr.map(i64::from))
            .bind(&c.source)
            .execute(&mut *conn)
            .await?;
        }
        None => {
            sqlx::query("DELETE FROM cardio_entries WHERE session_date = ?")
                .bind(&key)
                .execute(&mut *conn)
                .await?;
        }
    }

    match data.metcon() {
        Some(m) => {
            sqlx::query(
                "INSERT INTO metcon_entries (session_date, format, rounds, reps, notes)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(session_date) DO UPDATE SET
                     format = excluded.format,
                     rounds = excluded.rounds,
                     reps = excluded.reps,
                     notes = excluded.notes",
            )
            .bind(&key)
            .bind(&m.format)
            .bind(i64::from(m.rounds))
            .bind(i64::from(m.reps))
            .bind(&m.notes)
            .execute(&mut *conn)
            .await?;
        }
        None => {
            sqlx::query("DELETE FROM metcon_entries WHERE session_date = ?")
                .bind(&key)
                .execute(&mut *conn)
                .await?;
        }
    }

    Ok(())
}

async fn remove_record(tx: &mut Transaction<'_, Sqlite>, key: &str) -> Result<bool, sqlx::Error> {
    let conn: &mut SqliteConnection = tx;

    for table in ["strength_entries", "cardio_entries", "metcon_entries"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE session_date = ?"))
            .bind(key)
            .execute(&mut *conn)
            .await?;
    }

    let removed = sqlx::query("DELETE FROM sessions WHERE date = ?")
        .bind(key)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(removed > 0)
}

fn decode_session(row: SessionRow) -> StorageResult<SessionIndexRecord> {
    const T: &str = "sessions";
    let (date, week, phase, workout_type, title, completed, timestamp) = row;

    Ok(SessionIndexRecord {
        date: parse_date(T, &date)?,
        week: to_u32(T, week)?,
        phase: phase
            .parse::<Phase>()
            .map_err(|e| StorageError::corrupt(T, e))?,
        workout_type: workout_type
            .parse::<WorkoutType>()
            .map_err(|e| StorageError::corrupt(T, e))?,
        title,
        completed,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| StorageError::corrupt(T, format!("timestamp `{timestamp}`: {e}")))?
            .with_timezone(&Utc),
    })
}

fn parse_date(table: &'static str, text: &str) -> StorageResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| StorageError::corrupt(table, format!("date `{text}`: {e}")))
}

fn to_u32(table: &'static str, value: i64) -> StorageResult<u32> {
    u32::try_from(value).map_err(|_| StorageError::corrupt(table, format!("{value} out of range")))
}
