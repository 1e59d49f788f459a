use thiserror::Error;

/// Failures surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be opened or its tables created.
    #[error("storage unavailable at {location}: {source}")]
    Unavailable {
        location: String,
        #[source]
        source: sqlx::Error,
    },

    /// A write did not complete. Nothing from it was persisted.
    #[error("{op} failed and was rolled back: {source}")]
    TransactionFailure {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op} query failed: {source}")]
    Query {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("could not encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A stored row exists but cannot be turned back into a value.
    #[error("corrupt row in `{table}`: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl StorageError {
    pub(crate) fn tx(op: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::TransactionFailure { op, source }
    }

    pub(crate) fn query(op: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Query { op, source }
    }

    pub(crate) fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            table,
            reason: reason.into(),
        }
    }
}

/// A performance payload that failed shape validation. Never persisted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecord {
    #[error("enter at least one set")]
    NoSets,

    #[error("movement {index} has no exercise name")]
    UnnamedExercise { index: usize },

    #[error("`{field}` must be a finite, non-negative number (got {value})")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("endurance sessions need a synced reading or a manual distance")]
    MissingCardio,

    #[error("cardio activity must not be empty")]
    UnnamedActivity,

    #[error("heart rate `{field}` out of range: {value}")]
    HeartRateOutOfRange { field: &'static str, value: i64 },

    #[error("sensor duration out of range: {minutes} min")]
    DurationOutOfRange { minutes: u32 },

    #[error("sensor payload is not valid: {0}")]
    SensorShape(String),

    #[error("no movement {index} in this session")]
    NoSuchMovement { index: usize },

    #[error("movement {movement} has no set {set}")]
    NoSuchSet { movement: usize, set: usize },
}

pub type StorageResult<T> = Result<T, StorageError>;
