use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::MalformedRecord, program::clamp_week, program::Phase, types::WorkoutType};

/// The athlete the program is scaled to. Loads are in pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub name: String,
    pub bodyweight: f64,
    pub max_squat: f64,
    pub max_deadlift: f64,
    pub max_bench: f64,
    pub max_mile_seconds: u32,
    pub hr_zone2_low: u32,
    pub hr_zone2_high: u32,
    pub hr_zone5: u32,
    /// Day one of week one.
    pub start_date: NaiveDate,
}

impl Default for AthleteProfile {
    fn default() -> Self {
        Self {
            name: "Athlete".to_string(),
            bodyweight: 175.0,
            max_squat: 345.0,
            max_deadlift: 386.0,
            max_bench: 245.0,
            max_mile_seconds: 465,
            hr_zone2_low: 146,
            hr_zone2_high: 160,
            hr_zone5: 190,
            start_date: Local::now().date_naive(),
        }
    }
}

//
// Prescriptions
//

/// Prescribed load for a movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Load {
    Pounds(u32),
    /// Free-form prescription such as "BW + 25 lbs".
    Note(String),
}

impl Load {
    /// Starting weight for a logged set: the pounds, or the first number
    /// found in a free-form note, or zero.
    pub fn starting_weight(&self) -> f64 {
        match self {
            Self::Pounds(lbs) => *lbs as f64,
            Self::Note(text) => leading_number(text).map(f64::from).unwrap_or(0.0),
        }
    }
}

impl Display for Load {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pounds(lbs) => write!(f, "{lbs} lbs"),
            Self::Note(text) => write!(f, "{text}"),
        }
    }
}

/// First run of ASCII digits in `text`.
pub(crate) fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmupSet {
    pub weight: u32,
    pub reps: u32,
}

/// One prescribed exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub name: String,
    pub prescribed: Option<Load>,
    /// Notation such as "3x8", "4x10-12" or "10 min".
    pub reps: Option<String>,
    pub rpe: Option<f32>,
    pub notes: Option<String>,
    pub warmups: Vec<WarmupSet>,
    /// Technique work logged as a single done/not-done set.
    pub is_skill: bool,
}

impl Movement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prescribed: None,
            reps: None,
            rpe: None,
            notes: None,
            warmups: Vec::new(),
            is_skill: false,
        }
    }

    pub fn reps(mut self, reps: &str) -> Self {
        self.reps = Some(reps.to_string());
        self
    }

    pub fn pounds(mut self, lbs: u32) -> Self {
        self.prescribed = Some(Load::Pounds(lbs));
        self
    }

    pub fn load_note(mut self, note: &str) -> Self {
        self.prescribed = Some(Load::Note(note.to_string()));
        self
    }

    pub fn rpe(mut self, rpe: f32) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn warmups(mut self, ladder: &[(u32, u32)]) -> Self {
        self.warmups = ladder
            .iter()
            .map(|&(weight, reps)| WarmupSet { weight, reps })
            .collect();
        self
    }

    pub fn skill(mut self) -> Self {
        self.is_skill = true;
        self
    }

    /// Pounds prescribed, if the load is numeric.
    pub fn prescribed_pounds(&self) -> Option<u32> {
        match self.prescribed {
            Some(Load::Pounds(lbs)) => Some(lbs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioPlan {
    pub activity: String,
    pub duration_minutes: u32,
    pub target_hr: Option<String>,
    pub pace: Option<String>,
    pub notes: Option<String>,
}

/// A prescribed day of training. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub title: String,
    pub workout_type: WorkoutType,
    pub description: String,
    pub movements: Vec<Movement>,
    pub cardio: Option<CardioPlan>,
}

impl WorkoutSession {
    /// Scored by rounds/reps: MetCon sessions and any AMRAP/RFT piece.
    pub fn is_metcon_scored(&self) -> bool {
        self.workout_type == WorkoutType::MetCon
            || self
                .cardio
                .as_ref()
                .is_some_and(|c| c.activity.contains("AMRAP") || c.activity.contains("RFT"))
    }

    pub fn metcon_format(&self) -> &'static str {
        match &self.cardio {
            Some(c) if c.activity.contains("AMRAP") => "AMRAP",
            Some(c) if c.activity.contains("RFT") => "RFT",
            _ => "Session",
        }
    }
}

//
// Logged performance
//

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    pub weight: f64,
    pub reps: u32,
    pub completed: bool,
    #[serde(default)]
    pub is_warmup: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthEntry {
    pub exercise: String,
    pub is_skill: bool,
    pub sets: Vec<SetEntry>,
}

impl StrengthEntry {
    pub fn is_complete(&self) -> bool {
        self.sets.iter().all(|s| s.completed)
    }

    /// Warm-up sets first, then working sets, each group in original order.
    fn normalize(&mut self) {
        let (warmups, working): (Vec<SetEntry>, Vec<SetEntry>) =
            self.sets.iter().partition(|s| s.is_warmup);
        self.sets = warmups.into_iter().chain(working).collect();
    }

    fn validate(&self, index: usize) -> Result<(), MalformedRecord> {
        if self.exercise.trim().is_empty() {
            return Err(MalformedRecord::UnnamedExercise { index });
        }
        for set in &self.sets {
            check_amount("weight", set.weight)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioEntry {
    pub activity: String,
    pub distance_meters: Option<f64>,
    pub duration_seconds: u32,
    pub avg_hr: Option<u32>,
    pub peak_hr: Option<u32>,
    /// Device or app the reading came from; `None` for manual entry.
    pub source: Option<String>,
}

impl CardioEntry {
    fn validate(&self) -> Result<(), MalformedRecord> {
        if self.activity.trim().is_empty() {
            return Err(MalformedRecord::UnnamedActivity);
        }
        if let Some(d) = self.distance_meters {
            check_amount("distance_meters", d)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetConEntry {
    /// "AMRAP", "RFT" or "Session".
    pub format: String,
    pub rounds: u32,
    /// Reps past the last full round.
    pub reps: u32,
    pub notes: Option<String>,
}

fn check_amount(field: &'static str, value: f64) -> Result<(), MalformedRecord> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MalformedRecord::InvalidNumber { field, value })
    }
}

/// Logged payload, shaped by what kind of session was trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Strength {
        strength: Vec<StrengthEntry>,
        cardio: Option<CardioEntry>,
    },
    Hybrid {
        strength: Vec<StrengthEntry>,
        cardio: Option<CardioEntry>,
    },
    #[serde(rename = "metcon")]
    MetCon {
        strength: Vec<StrengthEntry>,
        metcon: MetConEntry,
        cardio: Option<CardioEntry>,
    },
    Endurance {
        cardio: CardioEntry,
    },
    Recovery {
        done: bool,
        note: Option<String>,
        strength: Vec<StrengthEntry>,
        cardio: Option<CardioEntry>,
    },
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Strength { .. } => "strength",
            Self::Hybrid { .. } => "hybrid",
            Self::MetCon { .. } => "metcon",
            Self::Endurance { .. } => "endurance",
            Self::Recovery { .. } => "recovery",
        }
    }

    fn strength_mut(&mut self) -> Option<&mut Vec<StrengthEntry>> {
        match self {
            Self::Strength { strength, .. }
            | Self::Hybrid { strength, .. }
            | Self::MetCon { strength, .. }
            | Self::Recovery { strength, .. } => Some(strength),
            Self::Endurance { .. } => None,
        }
    }
}

/// Everything logged for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    payload: Payload,
    synced_from_sensor: bool,
    timestamp: DateTime<Utc>,
}

impl PerformanceData {
    /// Validate and normalize a payload.
    pub fn new(
        mut payload: Payload,
        synced_from_sensor: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, MalformedRecord> {
        let bears_load = matches!(
            payload,
            Payload::Strength { .. } | Payload::Hybrid { .. } | Payload::MetCon { .. }
        );

        if let Some(entries) = payload.strength_mut() {
            for (i, entry) in entries.iter_mut().enumerate() {
                entry.validate(i + 1)?;
                entry.normalize();
            }
            if bears_load && entries.iter().all(|e| e.sets.is_empty()) {
                return Err(MalformedRecord::NoSets);
            }
        }

        let cardio = match &payload {
            Payload::Endurance { cardio } => Some(cardio),
            Payload::Strength { cardio, .. }
            | Payload::Hybrid { cardio, .. }
            | Payload::MetCon { cardio, .. }
            | Payload::Recovery { cardio, .. } => cardio.as_ref(),
        };
        if let Some(c) = cardio {
            c.validate()?;
        }

        Ok(Self {
            payload,
            synced_from_sensor,
            timestamp,
        })
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn strength(&self) -> &[StrengthEntry] {
        match &self.payload {
            Payload::Strength { strength, .. }
            | Payload::Hybrid { strength, .. }
            | Payload::MetCon { strength, .. }
            | Payload::Recovery { strength, .. } => strength,
            Payload::Endurance { .. } => &[],
        }
    }

    pub fn cardio(&self) -> Option<&CardioEntry> {
        match &self.payload {
            Payload::Endurance { cardio } => Some(cardio),
            Payload::Strength { cardio, .. }
            | Payload::Hybrid { cardio, .. }
            | Payload::MetCon { cardio, .. }
            | Payload::Recovery { cardio, .. } => cardio.as_ref(),
        }
    }

    pub fn metcon(&self) -> Option<&MetConEntry> {
        match &self.payload {
            Payload::MetCon { metcon, .. } => Some(metcon),
            _ => None,
        }
    }

    pub fn recovery_done(&self) -> Option<bool> {
        match &self.payload {
            Payload::Recovery { done, .. } => Some(*done),
            _ => None,
        }
    }

    pub fn recovery_note(&self) -> Option<&str> {
        match &self.payload {
            Payload::Recovery { note, .. } => note.as_deref(),
            _ => None,
        }
    }

    pub fn synced_from_sensor(&self) -> bool {
        self.synced_from_sensor
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A committed session log. At most one per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub week: u32,
    pub day: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub performance: PerformanceData,
}

impl PerformanceRecord {
    pub fn new(
        week: i64,
        day: &str,
        date: NaiveDate,
        completed: bool,
        performance: PerformanceData,
    ) -> Self {
        Self {
            week: clamp_week(week),
            day: day.to_string(),
            date,
            completed,
            performance,
        }
    }

    pub fn date_key(&self) -> String {
        date_key(self.date)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

//
// Stored projections
//

/// Listing row for a committed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIndexRecord {
    pub date: NaiveDate,
    pub week: u32,
    pub phase: Phase,
    pub workout_type: WorkoutType,
    pub title: String,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthRow {
    pub id: String,
    pub session_date: NaiveDate,
    #[serde(flatten)]
    pub entry: StrengthEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioRow {
    pub session_date: NaiveDate,
    #[serde(flatten)]
    pub entry: CardioEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetConRow {
    pub session_date: NaiveDate,
    #[serde(flatten)]
    pub entry: MetConEntry,
}
