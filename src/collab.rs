//! Ports to the collaborators that live outside the core: the wearable that
//! syncs heart-rate data and the text-generation advisor that reads a
//! snapshot of the training history.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MalformedRecord, StorageResult},
    models::{AthleteProfile, CardioRow, SessionIndexRecord, StrengthRow, WorkoutSession},
    program::week_for_date,
    store::Store,
};

pub const RECENT_SESSIONS: usize = 10;
pub const RECENT_DETAIL_ROWS: usize = 20;
/// Longest sensor session accepted: one day.
pub const MAX_SENSOR_MINUTES: u32 = 24 * 60;

/// Heart-rate summary handed back by a sensor sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(alias = "avgHr")]
    pub average_heart_rate: u32,
    #[serde(alias = "peakHr")]
    pub peak_heart_rate: u32,
    #[serde(alias = "duration")]
    pub duration_minutes: u32,
    pub source: String,
}

impl SensorReading {
    /// Decode an untrusted blob. Only shape and value ranges are checked.
    pub fn from_json(blob: &str) -> Result<Self, MalformedRecord> {
        let reading: SensorReading =
            serde_json::from_str(blob).map_err(|e| MalformedRecord::SensorShape(e.to_string()))?;

        for (field, value) in [
            ("averageHeartRate", reading.average_heart_rate),
            ("peakHeartRate", reading.peak_heart_rate),
        ] {
            if value > 255 {
                return Err(MalformedRecord::HeartRateOutOfRange {
                    field,
                    value: value as i64,
                });
            }
        }
        if reading.duration_minutes > MAX_SENSOR_MINUTES {
            return Err(MalformedRecord::DurationOutOfRange {
                minutes: reading.duration_minutes,
            });
        }
        Ok(reading)
    }
}

/// Wearable / health-store bridge.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Reading for the session just trained.
    async fn fetch(&self, session: &WorkoutSession) -> anyhow::Result<SensorReading>;
}

/// Reads an exported sensor blob from disk.
pub struct FileSensor {
    pub path: PathBuf,
}

#[async_trait]
impl SensorSource for FileSensor {
    async fn fetch(&self, _session: &WorkoutSession) -> anyhow::Result<SensorReading> {
        let blob = tokio::fs::read_to_string(&self.path).await?;
        Ok(SensorReading::from_json(&blob)?)
    }
}

/// Read-only snapshot handed to the advisor.
#[derive(Debug, Clone, Serialize)]
pub struct ContextBundle {
    pub athlete_profile: AthleteProfile,
    pub history_count: usize,
    pub recent_sessions: Vec<SessionIndexRecord>,
    pub raw_strength_logs: Vec<StrengthRow>,
    pub raw_cardio_logs: Vec<CardioRow>,
    pub current_week: u32,
}

fn tail<T>(mut rows: Vec<T>, n: usize) -> Vec<T> {
    let skip = rows.len().saturating_sub(n);
    rows.drain(..skip);
    rows
}

impl ContextBundle {
    pub async fn gather(store: &Store, profile: &AthleteProfile, today: NaiveDate) -> StorageResult<Self> {
        let sessions = store.get_all_sessions().await?;
        let strength = store.get_strength_entries().await?;
        let cardio = store.get_cardio_entries().await?;

        Ok(Self {
            athlete_profile: profile.clone(),
            history_count: sessions.len(),
            recent_sessions: tail(sessions, RECENT_SESSIONS),
            raw_strength_logs: tail(strength, RECENT_DETAIL_ROWS),
            raw_cardio_logs: tail(cardio, RECENT_DETAIL_ROWS),
            current_week: week_for_date(profile.start_date, today),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChartType {
    Bar,
    Line,
    Area,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub chart_type: ChartType,
    pub points: Vec<ChartPoint>,
}

/// What the advisor sends back: free text and an optional chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub message: String,
    pub recommendation: Option<String>,
    /// "Positive", "Negative", "Warning" or "Neutral".
    pub trend: Option<String>,
    pub chart: Option<Chart>,
}

/// Text-generation collaborator. Implementations own all prompting.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn ask(&self, query: &str, context: &ContextBundle) -> anyhow::Result<Insight>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        draft::SessionDraft,
        program::Phase,
        workout::derive_session,
    };

    struct FixedSensor;

    #[async_trait]
    impl SensorSource for FixedSensor {
        async fn fetch(&self, session: &WorkoutSession) -> anyhow::Result<SensorReading> {
            Ok(SensorReading {
                average_heart_rate: 152,
                peak_heart_rate: 178,
                duration_minutes: session.cardio.as_ref().map_or(30, |c| c.duration_minutes),
                source: "Test Watch".into(),
            })
        }
    }

    struct EchoAdvisor;

    #[async_trait]
    impl Advisor for EchoAdvisor {
        async fn ask(&self, query: &str, context: &ContextBundle) -> anyhow::Result<Insight> {
            Ok(Insight {
                message: format!("{query}: {} sessions", context.history_count),
                recommendation: None,
                trend: Some("Neutral".into()),
                chart: Some(Chart {
                    chart_type: ChartType::Bar,
                    points: vec![ChartPoint {
                        label: format!("W{}", context.current_week),
                        value: context.history_count as f64,
                    }],
                }),
            })
        }
    }

    #[test]
    fn sensor_blobs_accept_both_key_styles() {
        let long = r#"{"averageHeartRate":150,"peakHeartRate":181,"durationMinutes":40,"source":"Garmin"}"#;
        let short = r#"{"avgHr":152,"peakHr":178,"duration":30,"source":"Apple Watch"}"#;
        assert_eq!(SensorReading::from_json(long).unwrap().duration_minutes, 40);
        assert_eq!(SensorReading::from_json(short).unwrap().average_heart_rate, 152);
    }

    #[test]
    fn malformed_sensor_blobs_are_rejected() {
        assert!(matches!(
            SensorReading::from_json(r#"{"avgHr":"fast","peakHr":1,"duration":1,"source":"x"}"#),
            Err(MalformedRecord::SensorShape(_))
        ));
        assert!(matches!(
            SensorReading::from_json(r#"{"avgHr":-3,"peakHr":1,"duration":1,"source":"x"}"#),
            Err(MalformedRecord::SensorShape(_))
        ));
        assert_eq!(
            SensorReading::from_json(r#"{"avgHr":120,"peakHr":900,"duration":1,"source":"x"}"#),
            Err(MalformedRecord::HeartRateOutOfRange { field: "peakHeartRate", value: 900 })
        );
    }

    #[test]
    fn sensor_durations_beyond_a_day_are_rejected() {
        let huge = r#"{"avgHr":150,"peakHr":170,"duration":4294967295,"source":"x"}"#;
        assert_eq!(
            SensorReading::from_json(huge),
            Err(MalformedRecord::DurationOutOfRange { minutes: u32::MAX })
        );
        let day = r#"{"avgHr":150,"peakHr":170,"duration":1440,"source":"x"}"#;
        assert_eq!(SensorReading::from_json(day).unwrap().duration_minutes, MAX_SENSOR_MINUTES);
    }

    #[tokio::test]
    async fn fake_sensor_completes_an_endurance_draft() {
        let session = derive_session(Phase::AerobicBase, 3, "Wednesday", &AthleteProfile::default());
        let mut draft = SessionDraft::from_session(&session, Phase::AerobicBase);
        draft.attach_sensor(FixedSensor.fetch(&session).await.unwrap());
        assert!(draft.is_session_complete());
        assert_eq!(draft.sensor.as_ref().unwrap().duration_minutes, 45);
    }

    #[tokio::test]
    async fn file_sensor_reads_a_blob() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"avgHr":140,"peakHr":170,"duration":25,"source":"Polar"}"#,
        )
        .unwrap();
        let sensor = FileSensor {
            path: file.path().to_path_buf(),
        };
        let session = derive_session(Phase::Peak, 22, "Tuesday", &AthleteProfile::default());
        let reading = sensor.fetch(&session).await.unwrap();
        assert_eq!(reading.source, "Polar");
    }

    #[tokio::test]
    async fn context_bundle_keeps_only_recent_rows() {
        let store = Store::in_memory().await.unwrap();
        let profile = AthleteProfile {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            ..AthleteProfile::default()
        };

        // Twelve Monday-through-Saturday strength days.
        let mut date = profile.start_date;
        let mut saved = 0;
        while saved < 12 {
            let (day, session) = crate::workout::derive_for_date(&profile, date);
            if session.workout_type == crate::types::WorkoutType::Strength {
                let mut draft = SessionDraft::from_session(&session, day.phase);
                draft.complete_all_sets();
                let record = draft.commit(day.week, day.day, date).unwrap();
                store
                    .save_workout(&record, day.phase, session.workout_type, &session.title)
                    .await
                    .unwrap();
                saved += 1;
            }
            date = date.succ_opt().unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let bundle = ContextBundle::gather(&store, &profile, today).await.unwrap();
        assert_eq!(bundle.history_count, 12);
        assert_eq!(bundle.recent_sessions.len(), RECENT_SESSIONS);
        assert_eq!(bundle.raw_strength_logs.len(), RECENT_DETAIL_ROWS);
        assert_eq!(bundle.current_week, 9);
        assert!(bundle.recent_sessions.windows(2).all(|w| w[0].date < w[1].date));

        let json = bundle.to_json().unwrap();
        assert!(json.contains("\"current_week\": 9"));

        let insight = EchoAdvisor.ask("How am I doing?", &bundle).await.unwrap();
        assert_eq!(insight.message, "How am I doing?: 12 sessions");
    }
}
