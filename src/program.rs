//! The fixed 52-week macrocycle: phases, their week ranges and the
//! calendar arithmetic that places a date inside the program.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use chrono::{Datelike, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::AthleteProfile;

pub const PROGRAM_WEEKS: u32 = 52;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    AerobicBase,
    StrengthThreshold,
    Peak,
    Washout,
    Recalibration,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::AerobicBase,
        Phase::StrengthThreshold,
        Phase::Peak,
        Phase::Washout,
        Phase::Recalibration,
    ];

    /// Ordinal used on the roadmap ("Phase 1" .. "Phase 5").
    pub fn id(self) -> u8 {
        match self {
            Self::AerobicBase => 1,
            Self::StrengthThreshold => 2,
            Self::Peak => 3,
            Self::Washout => 4,
            Self::Recalibration => 5,
        }
    }

    /// Inclusive week range. Recalibration is open-ended past week 52 but
    /// is reported as ending there.
    pub fn weeks(self) -> RangeInclusive<u32> {
        match self {
            Self::AerobicBase => 1..=8,
            Self::StrengthThreshold => 9..=20,
            Self::Peak => 21..=32,
            Self::Washout => 33..=36,
            Self::Recalibration => 37..=PROGRAM_WEEKS,
        }
    }

    pub fn week_count(self) -> u32 {
        let weeks = self.weeks();
        weeks.end() - weeks.start() + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AerobicBase => "P1: Aerobic Base",
            Self::StrengthThreshold => "P2: Strength & Threshold",
            Self::Peak => "P3: The Peak",
            Self::Washout => "P4: The Washout",
            Self::Recalibration => "P5: Re-calibration",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::AerobicBase => {
                "Expand blood volume & tendon stiffness. High volume, low intensity."
            }
            Self::StrengthThreshold => {
                "Force production & Lactic tolerance. Heavier weights, uncomfortable cardio."
            }
            Self::Peak => "Peak Power & PR attempts. Short duration, maximum intensity.",
            Self::Washout => {
                "Systemic recovery & Fatigue drop. Dumbbells only, training by feel."
            }
            Self::Recalibration => "Re-test maxes & initiate new 52-week cycle.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AerobicBase => "aerobic-base",
            Self::StrengthThreshold => "strength-threshold",
            Self::Peak => "peak",
            Self::Washout => "washout",
            Self::Recalibration => "recalibration",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown phase `{s}`"))
    }
}

/// Phase owning `week`. Anything past the Washout is Recalibration.
pub fn phase_for_week(week: u32) -> Phase {
    match week {
        9..=20 => Phase::StrengthThreshold,
        21..=32 => Phase::Peak,
        33..=36 => Phase::Washout,
        w if w >= 37 => Phase::Recalibration,
        _ => Phase::AerobicBase,
    }
}

pub fn clamp_week(week: i64) -> u32 {
    week.clamp(1, PROGRAM_WEEKS as i64) as u32
}

/// Program week containing `date` for a program that began on `start`.
pub fn week_for_date(start: NaiveDate, date: NaiveDate) -> u32 {
    let days = (date - start).num_days();
    clamp_week(days.div_euclid(7) + 1)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Canonical weekday for a day name. Only the seven full English names are
/// accepted (any case, surrounding whitespace ignored).
pub fn parse_weekday(day: &str) -> Option<Weekday> {
    match day.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Where a calendar date falls in the athlete's program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramDay {
    pub date: NaiveDate,
    pub week: u32,
    pub phase: Phase,
    pub day: &'static str,
}

impl ProgramDay {
    pub fn for_date(profile: &AthleteProfile, date: NaiveDate) -> Self {
        let week = week_for_date(profile.start_date, date);
        Self {
            date,
            week,
            phase: phase_for_week(week),
            day: weekday_name(date.weekday()),
        }
    }

    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_partition_the_program() {
        for week in 1..=PROGRAM_WEEKS {
            let owners: Vec<Phase> = Phase::ALL
                .into_iter()
                .filter(|p| p.weeks().contains(&week))
                .collect();
            assert_eq!(owners.len(), 1, "week {week} owned by {owners:?}");
            assert_eq!(owners[0], phase_for_week(week));
        }

        let total: u32 = Phase::ALL.into_iter().map(Phase::week_count).sum();
        assert_eq!(total, PROGRAM_WEEKS);

        // Contiguous, in order.
        for pair in Phase::ALL.windows(2) {
            assert_eq!(*pair[0].weeks().end() + 1, *pair[1].weeks().start());
        }
    }

    #[test]
    fn weeks_past_the_program_are_recalibration() {
        assert_eq!(phase_for_week(53), Phase::Recalibration);
        assert_eq!(phase_for_week(400), Phase::Recalibration);
    }

    #[test]
    fn week_for_date_clamps_both_ends() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(week_for_date(start, start), 1);
        assert_eq!(week_for_date(start, start + chrono::Duration::days(6)), 1);
        assert_eq!(week_for_date(start, start + chrono::Duration::days(7)), 2);
        assert_eq!(week_for_date(start, start - chrono::Duration::days(30)), 1);
        assert_eq!(week_for_date(start, start + chrono::Duration::days(2000)), 52);
    }

    #[test]
    fn weekday_parsing_accepts_only_full_names() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("  sunday "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Mon"), None);
        assert_eq!(parse_weekday("Funday"), None);
    }

    #[test]
    fn program_day_uses_profile_start() {
        let profile = AthleteProfile {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            ..AthleteProfile::default()
        };
        let day = ProgramDay::for_date(&profile, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
        assert_eq!(day.week, 9);
        assert_eq!(day.phase, Phase::StrengthThreshold);
        assert_eq!(day.day, "Wednesday");
        assert_eq!(day.date_key(), "2026-03-04");
    }

    #[test]
    fn phase_text_round_trips() {
        for p in Phase::ALL {
            assert_eq!(p.as_str().parse::<Phase>(), Ok(p));
        }
    }
}
