//! Read-side statistics over committed sessions.

use std::io;

use chrono::NaiveDate;
use itertools::Itertools;
use log::warn;
use serde::Serialize;

use crate::{
    error::StorageResult,
    models::{PerformanceRecord, SessionIndexRecord, StrengthRow},
    program::{Phase, week_for_date},
    store::Store,
};

/// Anything logged against a program week.
pub trait Logged {
    fn week(&self) -> u32;
    fn completed(&self) -> bool;
}

impl Logged for SessionIndexRecord {
    fn week(&self) -> u32 {
        self.week
    }

    fn completed(&self) -> bool {
        self.completed
    }
}

impl Logged for PerformanceRecord {
    fn week(&self) -> u32 {
        self.week
    }

    fn completed(&self) -> bool {
        self.completed
    }
}

pub async fn completion_for_date(store: &Store, date: NaiveDate) -> StorageResult<Option<PerformanceRecord>> {
    store.get_record(date).await
}

/// Share of the phase's days that have a completed session, 0 to 100.
/// Partial saves do not count.
pub fn phase_completion_percentage<R: Logged>(phase: Phase, records: &[R]) -> u8 {
    let weeks = phase.weeks();
    let logged = records
        .iter()
        .filter(|r| r.completed() && weeks.contains(&r.week()))
        .count();
    let days = phase.week_count() * 7;

    let pct = (100.0 * logged as f64 / days as f64).round();
    pct.min(100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Past,
    Current,
    Future,
}

impl PhaseStatus {
    pub fn of(phase: Phase, current_week: u32) -> Self {
        let weeks = phase.weeks();
        if weeks.contains(&current_week) {
            Self::Current
        } else if current_week > *weeks.end() {
            Self::Past
        } else {
            Self::Future
        }
    }
}

/// Flat row of the tabular export. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub week: u32,
    pub phase: &'static str,
    #[serde(rename = "type")]
    pub workout_type: &'static str,
    pub title: String,
}

pub fn export_rows(sessions: &[SessionIndexRecord]) -> Vec<ExportRow> {
    sessions
        .iter()
        .sorted_by_key(|s| s.date)
        .map(|s| ExportRow {
            date: crate::models::date_key(s.date),
            week: s.week,
            phase: s.phase.as_str(),
            workout_type: s.workout_type.as_str(),
            title: s.title.clone(),
        })
        .collect()
}

/// Write every session as CSV with a `date,week,phase,type,title` header.
pub fn write_csv<W: io::Write>(sessions: &[SessionIndexRecord], out: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let rows = export_rows(sessions);
    if rows.is_empty() {
        wtr.write_record(["date", "week", "phase", "type", "title"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pounds moved in the completed working sets of one entry.
fn tonnage(row: &StrengthRow) -> f64 {
    row.entry
        .sets
        .iter()
        .filter(|s| s.completed && !s.is_warmup)
        .map(|s| s.weight * s.reps as f64)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTonnage {
    pub week: u32,
    pub pounds: f64,
}

/// Completed working-set volume per program week, in week order.
pub fn weekly_tonnage(rows: &[StrengthRow], start: NaiveDate) -> Vec<WeeklyTonnage> {
    rows.iter()
        .map(|r| (week_for_date(start, r.session_date), tonnage(r)))
        .sorted_by_key(|(week, _)| *week)
        .chunk_by(|(week, _)| *week)
        .into_iter()
        .map(|(week, group)| WeeklyTonnage {
            week,
            pounds: group.map(|(_, t)| t).sum(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSet {
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
}

/// Heaviest completed working set of `exercise` on each date it was trained.
pub fn top_set_history(rows: &[StrengthRow], exercise: &str) -> Vec<TopSet> {
    let wanted = exercise.trim().to_ascii_lowercase();

    rows.iter()
        .filter(|r| r.entry.exercise.to_ascii_lowercase() == wanted)
        .flat_map(|r| {
            r.entry
                .sets
                .iter()
                .filter(|s| s.completed && !s.is_warmup)
                .map(move |s| TopSet {
                    date: r.session_date,
                    weight: s.weight,
                    reps: s.reps,
                })
        })
        .sorted_by_key(|t| t.date)
        .chunk_by(|t| t.date)
        .into_iter()
        .filter_map(|(_, sets)| {
            sets.max_by(|a, b| a.weight.total_cmp(&b.weight).then(a.reps.cmp(&b.reps)))
        })
        .collect()
}

/// Analytics reads degrade to nothing rather than failing the caller.
pub fn or_empty<T: Default>(what: &str, result: StorageResult<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!("{what} unavailable: {e}");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        draft::SessionDraft,
        error::StorageError,
        models::{AthleteProfile, SetEntry, StrengthEntry},
        types::WorkoutType,
        workout::derive_for_date,
    };

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn index(date: NaiveDate, week: u32, title: &str) -> SessionIndexRecord {
        SessionIndexRecord {
            date,
            week,
            phase: crate::program::phase_for_week(week),
            workout_type: WorkoutType::Strength,
            title: title.to_string(),
            completed: true,
            timestamp: Utc::now(),
        }
    }

    fn set(weight: f64, reps: u32, completed: bool, warmup: bool) -> SetEntry {
        SetEntry {
            weight,
            reps,
            completed,
            is_warmup: warmup,
        }
    }

    fn row(date: NaiveDate, exercise: &str, sets: Vec<SetEntry>) -> StrengthRow {
        StrengthRow {
            id: format!("{date}-{exercise}"),
            session_date: date,
            entry: StrengthEntry {
                exercise: exercise.to_string(),
                is_skill: false,
                sets,
            },
        }
    }

    #[test]
    fn four_sessions_in_aerobic_base_is_seven_percent() {
        let records: Vec<_> = [1, 2, 5, 8]
            .into_iter()
            .map(|w| index(ymd(2026, 1, 5), w, "x"))
            .collect();
        assert_eq!(phase_completion_percentage(Phase::AerobicBase, &records), 7);
        assert_eq!(phase_completion_percentage(Phase::Peak, &records), 0);
    }

    #[test]
    fn incomplete_sessions_do_not_count() {
        let mut records: Vec<_> = [1, 2, 5, 8]
            .into_iter()
            .map(|w| index(ymd(2026, 1, 5), w, "x"))
            .collect();
        records[3].completed = false;
        assert_eq!(phase_completion_percentage(Phase::AerobicBase, &records), 5);
    }

    #[test]
    fn completion_percentage_is_capped() {
        let records: Vec<_> = (0..40).map(|_| index(ymd(2026, 8, 24), 34, "x")).collect();
        assert_eq!(phase_completion_percentage(Phase::Washout, &records), 100);
    }

    #[test]
    fn phase_status_follows_current_week() {
        assert_eq!(PhaseStatus::of(Phase::AerobicBase, 12), PhaseStatus::Past);
        assert_eq!(PhaseStatus::of(Phase::StrengthThreshold, 12), PhaseStatus::Current);
        assert_eq!(PhaseStatus::of(Phase::Peak, 12), PhaseStatus::Future);
    }

    #[test]
    fn csv_export_has_fixed_columns_in_date_order() {
        let sessions = vec![
            index(ymd(2026, 1, 9), 1, "Full Body Hypertrophy (Pump)"),
            index(ymd(2026, 1, 5), 1, "Lower Body Hypertrophy & Flush"),
        ];
        let mut out = Vec::new();
        write_csv(&sessions, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,week,phase,type,title");
        assert_eq!(lines[1], "2026-01-05,1,aerobic-base,Strength,Lower Body Hypertrophy & Flush");
        assert_eq!(lines[2], "2026-01-09,1,aerobic-base,Strength,Full Body Hypertrophy (Pump)");
    }

    #[test]
    fn empty_export_still_has_a_header() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "date,week,phase,type,title\n");
    }

    #[test]
    fn tonnage_counts_completed_working_sets_per_week() {
        let start = ymd(2026, 1, 5);
        let rows = vec![
            row(
                ymd(2026, 1, 5),
                "Low Bar Back Squat",
                vec![set(135.0, 10, true, true), set(250.0, 8, true, false), set(250.0, 8, false, false)],
            ),
            row(ymd(2026, 1, 9), "Romanian Deadlift", vec![set(185.0, 10, true, false)]),
            row(ymd(2026, 1, 12), "Low Bar Back Squat", vec![set(250.0, 8, true, false)]),
        ];

        assert_eq!(
            weekly_tonnage(&rows, start),
            vec![
                WeeklyTonnage { week: 1, pounds: 2000.0 + 1850.0 },
                WeeklyTonnage { week: 2, pounds: 2000.0 },
            ]
        );
    }

    #[test]
    fn top_sets_pick_the_heaviest_completed_working_set() {
        let rows = vec![
            row(
                ymd(2026, 3, 2),
                "Low Bar Back Squat",
                vec![set(315.0, 1, true, true), set(295.0, 5, true, false), set(305.0, 5, false, false)],
            ),
            row(ymd(2026, 3, 9), "low bar back squat", vec![set(305.0, 5, true, false)]),
            row(ymd(2026, 3, 9), "Bench Press", vec![set(225.0, 5, true, false)]),
        ];

        assert_eq!(
            top_set_history(&rows, "Low Bar Back Squat"),
            vec![
                TopSet { date: ymd(2026, 3, 2), weight: 295.0, reps: 5 },
                TopSet { date: ymd(2026, 3, 9), weight: 305.0, reps: 5 },
            ]
        );
    }

    #[test]
    fn failed_reads_degrade_to_empty() {
        let failed: StorageResult<Vec<StrengthRow>> =
            Err(StorageError::corrupt("strength_entries", "bad json"));
        assert!(or_empty("strength history", failed).is_empty());
    }

    /// Log the prescribed session for `date`, finishing every set when `finish`.
    async fn log_day(store: &Store, date: NaiveDate, finish: bool) -> PerformanceRecord {
        let profile = AthleteProfile {
            start_date: ymd(2026, 1, 5),
            ..AthleteProfile::default()
        };
        let (day, session) = derive_for_date(&profile, date);
        let mut draft = SessionDraft::from_session(&session, day.phase);
        if finish {
            draft.complete_all_sets();
        }
        let record = draft.commit(day.week, day.day, date).unwrap();
        store
            .save_workout(&record, day.phase, session.workout_type, &session.title)
            .await
            .unwrap();
        record
    }

    #[tokio::test]
    async fn completion_lookup_reads_the_store() {
        let store = Store::in_memory().await.unwrap();
        assert_eq!(completion_for_date(&store, ymd(2026, 1, 5)).await.unwrap(), None);

        let record = log_day(&store, ymd(2026, 1, 5), true).await;
        assert_eq!(
            completion_for_date(&store, ymd(2026, 1, 5)).await.unwrap(),
            Some(record)
        );
        assert_eq!(completion_for_date(&store, ymd(2026, 1, 6)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_saves_leave_phase_completion_alone() {
        let store = Store::in_memory().await.unwrap();
        log_day(&store, ymd(2026, 1, 5), true).await;
        let before = phase_completion_percentage(
            Phase::AerobicBase,
            &store.get_all_sessions().await.unwrap(),
        );
        assert_eq!(before, 2);

        let partial = log_day(&store, ymd(2026, 1, 6), false).await;
        assert!(!partial.completed);

        let sessions = store.get_all_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].completed);
        assert!(!sessions[1].completed);
        assert_eq!(phase_completion_percentage(Phase::AerobicBase, &sessions), before);
    }
}
