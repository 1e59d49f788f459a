//! Logging state for the session being trained, and the completion rules
//! that decide when it may be committed.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    collab::SensorReading,
    error::MalformedRecord,
    models::{
        CardioEntry, Movement, MetConEntry, Payload, PerformanceData, PerformanceRecord, SetEntry,
        StrengthEntry, WorkoutSession, leading_number,
    },
    program::Phase,
    types::WorkoutType,
};

pub const METERS_PER_MILE: f64 = 1609.34;

/// Sets and reps read from a notation such as "3x8" or "4x10-12".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepScheme {
    pub sets: u32,
    pub reps: u32,
}

impl RepScheme {
    /// `<sets>x<reps>`, with reps taken from the leading integer of the
    /// right-hand side. Anything else is not a scheme.
    pub fn parse(notation: &str) -> Option<Self> {
        let (sets, reps) = notation.split_once(['x', 'X'])?;
        let sets: u32 = sets.trim().parse().ok()?;
        let reps = leading_number(reps.trim_start())?;
        (sets > 0).then_some(Self { sets, reps })
    }
}

/// Blank strength entry for a prescribed movement.
fn planned_entry(movement: &Movement, max_effort: bool) -> StrengthEntry {
    let weight = movement
        .prescribed
        .as_ref()
        .map(|l| l.starting_weight())
        .unwrap_or(0.0);
    let notation = movement.reps.as_deref().unwrap_or("");

    let scheme = RepScheme::parse(notation);
    let (sets, reps) = if movement.is_skill {
        (1, scheme.map_or(1, |s| s.reps))
    } else if max_effort {
        // "Build to Heavy 2" is worked up to over five sets.
        (5, scheme.map(|s| s.reps).or_else(|| leading_number(notation)).unwrap_or(1))
    } else {
        match scheme {
            Some(scheme) => (scheme.sets, scheme.reps),
            None if notation.contains("EMOM") => (3, 1),
            None => (3, 8),
        }
    };

    let warmups = movement.warmups.iter().map(|w| SetEntry {
        weight: w.weight as f64,
        reps: w.reps,
        completed: false,
        is_warmup: true,
    });
    let working = (0..sets).map(|_| SetEntry {
        weight,
        reps,
        completed: false,
        is_warmup: false,
    });

    StrengthEntry {
        exercise: movement.name.clone(),
        is_skill: movement.is_skill,
        sets: warmups.chain(working).collect(),
    }
}

/// Everything the athlete has entered so far for one prescribed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub session: WorkoutSession,
    pub strength: Vec<StrengthEntry>,
    pub metcon: MetConEntry,
    /// Miles typed in by hand.
    pub manual_miles: Option<f64>,
    pub sensor: Option<SensorReading>,
    pub recovery_done: bool,
    pub recovery_note: Option<String>,
}

impl SessionDraft {
    pub fn from_session(session: &WorkoutSession, phase: Phase) -> Self {
        let max_effort = phase == Phase::Peak && session.title.contains("Max Effort");
        Self {
            strength: session
                .movements
                .iter()
                .map(|m| planned_entry(m, max_effort))
                .collect(),
            metcon: MetConEntry {
                format: session.metcon_format().to_string(),
                rounds: 0,
                reps: 0,
                notes: None,
            },
            manual_miles: None,
            sensor: None,
            recovery_done: false,
            recovery_note: None,
            session: session.clone(),
        }
    }

    fn set_mut(&mut self, movement: usize, set: usize) -> Result<&mut SetEntry, MalformedRecord> {
        let entry = self
            .strength
            .get_mut(movement)
            .ok_or(MalformedRecord::NoSuchMovement { index: movement + 1 })?;
        entry.sets.get_mut(set).ok_or(MalformedRecord::NoSuchSet {
            movement: movement + 1,
            set: set + 1,
        })
    }

    /// Flip a set between done and not done. Indices are zero-based.
    pub fn toggle_set(&mut self, movement: usize, set: usize) -> Result<bool, MalformedRecord> {
        let s = self.set_mut(movement, set)?;
        s.completed = !s.completed;
        Ok(s.completed)
    }

    pub fn set_weight(&mut self, movement: usize, set: usize, weight: f64) -> Result<(), MalformedRecord> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(MalformedRecord::InvalidNumber { field: "weight", value: weight });
        }
        self.set_mut(movement, set)?.weight = weight;
        Ok(())
    }

    pub fn complete_all_sets(&mut self) {
        for s in self.strength.iter_mut().flat_map(|e| e.sets.iter_mut()) {
            s.completed = true;
        }
    }

    pub fn record_metcon(&mut self, rounds: u32, reps: u32) {
        self.metcon.rounds = rounds;
        self.metcon.reps = reps;
    }

    pub fn enter_distance(&mut self, miles: f64) -> Result<(), MalformedRecord> {
        if !miles.is_finite() || miles < 0.0 {
            return Err(MalformedRecord::InvalidNumber { field: "distance", value: miles });
        }
        self.manual_miles = Some(miles);
        Ok(())
    }

    pub fn attach_sensor(&mut self, reading: SensorReading) {
        self.sensor = Some(reading);
    }

    pub fn mark_recovery(&mut self, done: bool) {
        self.recovery_done = done;
    }

    fn strength_complete(&self) -> bool {
        self.strength.iter().all(StrengthEntry::is_complete)
    }

    /// Whether the session may be committed.
    pub fn is_session_complete(&self) -> bool {
        if self.session.workout_type == WorkoutType::Recovery {
            return self.recovery_done;
        }
        if self.session.is_metcon_scored() {
            return self.strength_complete() && (self.metcon.rounds > 0 || self.metcon.reps > 0);
        }
        if self.session.workout_type == WorkoutType::Endurance {
            return self.sensor.is_some() || self.manual_miles.is_some();
        }
        self.strength_complete()
    }

    fn cardio_entry(&self) -> Result<Option<CardioEntry>, MalformedRecord> {
        let activity = self
            .session
            .cardio
            .as_ref()
            .map(|c| c.activity.clone());
        let distance_meters = self.manual_miles.map(|m| m * METERS_PER_MILE);

        let entry = match (&self.sensor, self.manual_miles) {
            (Some(reading), _) => Some(CardioEntry {
                activity: activity.unwrap_or_else(|| "Unknown".to_string()),
                distance_meters,
                duration_seconds: reading.duration_minutes.checked_mul(60).ok_or(
                    MalformedRecord::DurationOutOfRange {
                        minutes: reading.duration_minutes,
                    },
                )?,
                avg_hr: Some(reading.average_heart_rate),
                peak_hr: Some(reading.peak_heart_rate),
                source: Some(reading.source.clone()),
            }),
            (None, Some(_)) => Some(CardioEntry {
                activity: activity.unwrap_or_else(|| "Manual Entry".to_string()),
                distance_meters,
                duration_seconds: self
                    .session
                    .cardio
                    .as_ref()
                    .map_or(0, |c| c.duration_minutes.saturating_mul(60)),
                avg_hr: None,
                peak_hr: None,
                source: None,
            }),
            (None, None) => None,
        };
        Ok(entry)
    }

    /// Build the validated record for `date`.
    pub fn commit(&self, week: u32, day: &str, date: NaiveDate) -> Result<PerformanceRecord, MalformedRecord> {
        let strength = self.strength.clone();
        let cardio = self.cardio_entry()?;

        let payload = if self.session.workout_type == WorkoutType::Recovery {
            Payload::Recovery {
                done: self.recovery_done,
                note: self.recovery_note.clone(),
                strength,
                cardio,
            }
        } else if self.session.is_metcon_scored() {
            Payload::MetCon {
                strength,
                metcon: self.metcon.clone(),
                cardio,
            }
        } else {
            match self.session.workout_type {
                WorkoutType::Endurance => Payload::Endurance {
                    cardio: cardio.ok_or(MalformedRecord::MissingCardio)?,
                },
                WorkoutType::Hybrid => Payload::Hybrid { strength, cardio },
                _ => Payload::Strength { strength, cardio },
            }
        };

        let data = PerformanceData::new(payload, self.sensor.is_some(), Utc::now())?;
        Ok(PerformanceRecord::new(
            week as i64,
            day,
            date,
            self.is_session_complete(),
            data,
        ))
    }
}
