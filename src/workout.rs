//! Derivation of the prescribed session for any (phase, week, day).
//!
//! Every phase owns one template per weekday. Monday to Saturday are matched
//! by name; every other input (Sunday, unmatched days, unknown strings) gets
//! the phase's rest-day session. Washout and Recalibration ignore the day.
//!
//! Main-lift loads are computed as `round(max × pct)` and then adjusted by the
//! phase's progression rule.

use chrono::{NaiveDate, Weekday};

use crate::{
    models::{AthleteProfile, CardioPlan, Movement, WorkoutSession},
    program::{Phase, ProgramDay, parse_weekday},
    types::WorkoutType,
};

/// Deload weeks: 4 and 8 in the aerobic base, 14 in strength/threshold.
pub fn is_deload(phase: Phase, week: u32) -> bool {
    match phase {
        Phase::AerobicBase => week == 4 || week == 8,
        Phase::StrengthThreshold => week == 14,
        _ => false,
    }
}

/// Linear bonus (lbs) on aerobic-base main lifts for weeks 5 through 7.
pub fn aerobic_base_bonus(week: u32) -> u32 {
    if (5..=7).contains(&week) {
        (week - 4) * 5
    } else {
        0
    }
}

/// Wednesday long-run minutes in the aerobic base.
pub fn long_run_minutes(week: u32) -> u32 {
    match week {
        2 => 40,
        3 => 45,
        4 | 8 => 30,
        5..=7 => 45 + (week - 4) * 5,
        _ => 35,
    }
}

/// Working squat weight for the strength/threshold block.
pub fn threshold_squat(week: u32) -> u32 {
    match week {
        13..=16 => 305,
        17..=19 => 315,
        _ => 295,
    }
}

/// Squat target during the peak, before rounding.
pub fn peak_squat_target(max_squat: f64, week: u32) -> f64 {
    if week >= 30 {
        max_squat + 5.0
    } else if week >= 25 {
        max_squat * 0.95
    } else {
        max_squat * 0.9
    }
}

/// `round(max × pct)` in whole pounds.
pub fn percent_of(max: f64, pct: f64) -> u32 {
    (max * pct).round().max(0.0) as u32
}

/// Prescribed session for `day` (a weekday name) in `week` of `phase`.
pub fn derive_session(phase: Phase, week: u32, day: &str, profile: &AthleteProfile) -> WorkoutSession {
    let day = parse_weekday(day);
    match phase {
        Phase::AerobicBase => aerobic_base(week, day, profile),
        Phase::StrengthThreshold => strength_threshold(week, day),
        Phase::Peak => peak(week, day, profile),
        Phase::Washout => washout(),
        Phase::Recalibration => recalibration(),
    }
}

/// Where `date` falls in the program and what it prescribes.
pub fn derive_for_date(profile: &AthleteProfile, date: NaiveDate) -> (ProgramDay, WorkoutSession) {
    let day = ProgramDay::for_date(profile, date);
    let session = derive_session(day.phase, day.week, day.day, profile);
    (day, session)
}

fn session(title: &str, workout_type: WorkoutType, description: &str) -> WorkoutSession {
    WorkoutSession {
        title: title.to_string(),
        workout_type,
        description: description.to_string(),
        movements: Vec::new(),
        cardio: None,
    }
}

fn cardio(activity: &str, duration_minutes: u32) -> CardioPlan {
    CardioPlan {
        activity: activity.to_string(),
        duration_minutes,
        target_hr: None,
        pace: None,
        notes: None,
    }
}

impl WorkoutSession {
    fn with(mut self, movements: Vec<Movement>) -> Self {
        self.movements = movements;
        self
    }

    fn with_cardio(mut self, plan: CardioPlan) -> Self {
        self.cardio = Some(plan);
        self
    }
}

impl CardioPlan {
    fn hr(mut self, target: &str) -> Self {
        self.target_hr = Some(target.to_string());
        self
    }

    fn pace(mut self, pace: &str) -> Self {
        self.pace = Some(pace.to_string());
        self
    }

    fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

fn aerobic_base(week: u32, day: Option<Weekday>, profile: &AthleteProfile) -> WorkoutSession {
    let pct = if is_deload(Phase::AerobicBase, week) { 0.5 } else { 0.7 };
    let bonus = aerobic_base_bonus(week);

    match day {
        Some(Weekday::Mon) => session(
            "Lower Body Hypertrophy & Flush",
            WorkoutType::Strength,
            "High volume focus. Strictly 3 min rest.",
        )
        .with(vec![
            Movement::new("Warmup: Air Bike & Calisthenics").reps("10 min").skill(),
            Movement::new("Low Bar Back Squat")
                .pounds(percent_of(profile.max_squat, pct).saturating_add(bonus))
                .reps("3x8")
                .rpe(7.0)
                .warmups(&[(135, 10), (185, 5)]),
            Movement::new("DB Walking Lunges").load_note("35 lb DBs").reps("3x12/leg"),
            Movement::new("Leg Extensions").reps("3x15").rpe(7.0),
        ])
        .with_cardio(
            cardio("Bike Erg Flush", 15)
                .hr("130-140 bpm")
                .notes("Zone 1. Constant RPM. Do not sprint."),
        ),

        Some(Weekday::Tue) => session(
            "Upper Push/Pull & Row Volume",
            WorkoutType::Hybrid,
            "Aerobic power and antagonist strength balance.",
        )
        .with(vec![
            Movement::new("Warmup: Band Pull-aparts & Pushups").reps("10 min").skill(),
            Movement::new("Bench Press")
                .pounds(percent_of(profile.max_bench, pct).saturating_add(bonus))
                .reps("3x8")
                .warmups(&[(135, 10), (155, 5)]),
            Movement::new("Pendlay Row")
                .pounds(135)
                .reps("3x10")
                .notes("Strict form, back parallel."),
            Movement::new("DB Overhead Press").pounds(40).reps("3x10"),
            Movement::new("Face Pulls").reps("3x15"),
        ])
        .with_cardio(
            cardio("Row Erg Intervals", 20)
                .pace("2:15/500m")
                .hr("<140 bpm recovery")
                .notes("5 x 500m. 1:00 rest."),
        ),

        Some(Weekday::Wed) => session(
            "Pure Zone 2 Endurance",
            WorkoutType::Endurance,
            "Strict limit: 146-160 bpm. Walk if HR hits 162.",
        )
        .with_cardio(
            cardio("Outdoor Run", long_run_minutes(week))
                .hr("146-160 bpm")
                .notes("Run as slow as needed to maintain HR zone."),
        ),

        Some(Weekday::Thu) => session(
            "Athleticism & Flow",
            WorkoutType::MetCon,
            "20 Min AMRAP. 70% effort. Nasal breathing only.",
        )
        .with(vec![
            Movement::new("Double Unders (Skill)").reps("10 min EMOM").skill(),
            Movement::new("Power Clean")
                .pounds(135)
                .reps("5x3")
                .notes("Perfect technique, fast elbows."),
        ])
        .with_cardio(
            cardio("Aerobic Flow (AMRAP)", 20).notes("200m Run, 10 T2B, 15 KB Swings (53lb)."),
        ),

        Some(Weekday::Fri) => session(
            "Full Body Hypertrophy (Pump)",
            WorkoutType::Strength,
            "Bodybuilding focus. Antagonist supersets.",
        )
        .with(vec![
            Movement::new("Incline DB Bench Press").pounds(55).reps("4x10-12"),
            Movement::new("Weighted Pull-ups").load_note("BW or +10 lbs").reps("4x5-8"),
            Movement::new("Romanian Deadlift").pounds(185).reps("3x10"),
            Movement::new("DB Lateral Raises").pounds(20).reps("3x15"),
            Movement::new("EZ Bar Bicep Curls").reps("3x12"),
            Movement::new("Tricep Rope Pushdowns").reps("3x15"),
            Movement::new("Hanging Leg Raise").reps("3x15"),
        ]),

        Some(Weekday::Sat) => session(
            "Long Aerobic Session",
            WorkoutType::Endurance,
            "45 Minutes Continuous Mixed Movement.",
        )
        .with_cardio(
            cardio("Row/Bike/Ski/Run", 45)
                .hr("150 bpm average")
                .notes("10m Row, 10m Bike, 10m Ski, 10m Run, 5m Cooldown."),
        ),

        _ => session(
            "Mandatory Recovery",
            WorkoutType::Recovery,
            "30 mins Yoga flow or static stretching.",
        )
        .with(vec![Movement::new("Yoga Flow").reps("30 min").skill()]),
    }
}

fn strength_threshold(week: u32, day: Option<Weekday>) -> WorkoutSession {
    let deload = is_deload(Phase::StrengthThreshold, week);
    let squat = threshold_squat(week);

    match day {
        Some(Weekday::Mon) => session(
            "Heavy Lower Session",
            WorkoutType::Strength,
            "Absolute force production.",
        )
        .with(vec![
            Movement::new("Box Jumps (Warmup)").reps("3x5").skill(),
            Movement::new("Back Squat")
                .pounds(if deload { percent_of(squat as f64, 0.7) } else { squat })
                .reps("5x3")
                .notes("Rest 3-5 mins.")
                .warmups(&[(135, 10), (225, 5), (275, 3)]),
            Movement::new("Deadlift")
                .pounds(if deload { 230 } else { 325 })
                .reps("3x3")
                .notes("Full reset every rep. No bouncing."),
            Movement::new("Bulgarian Split Squats").pounds(40).reps("3x8/leg"),
        ]),

        Some(Weekday::Tue) => {
            let (intervals, minutes) = if week >= 13 {
                ("3 x 10 Minutes", 40)
            } else {
                ("3 x 8 Minutes", 35)
            };
            session(
                "Threshold Intervals",
                WorkoutType::Endurance,
                "Lactic tolerance. 2 min walking rest.",
            )
            .with_cardio(
                cardio("Running (Track)", minutes)
                    .pace("8:45-9:00 / mile")
                    .notes(&format!("{intervals}. Target sustained pace.")),
            )
        }

        Some(Weekday::Wed) => session(
            "Heavy Upper Session",
            WorkoutType::Strength,
            "Standing overhead press and weighted pulls.",
        )
        .with(vec![
            Movement::new("Strict Overhead Press").pounds(105).reps("5x5"),
            Movement::new("Weighted Pull-ups").load_note("BW + 25 lbs").reps("5x3"),
            Movement::new("Weighted Dips").reps("3x10"),
            Movement::new("Single Arm DB Row").pounds(70).reps("3x10"),
        ]),

        Some(Weekday::Thu) => session(
            "Dynamic Effort & MetCon",
            WorkoutType::MetCon,
            "Speed work + Lactic Bath.",
        )
        .with(vec![
            Movement::new("Power Snatch")
                .pounds(95)
                .reps("6x2")
                .notes("Rest 45s between sets."),
        ])
        .with_cardio(
            cardio("Lactic Bath (5 RFT)", 15)
                .notes("15 Wall Balls, 12 Box Jumps, 9 Burpees over Box."),
        ),

        Some(Weekday::Fri) => session(
            "Prehab & Accessory",
            WorkoutType::Strength,
            "4 Rounds Circuit for quality.",
        )
        .with(vec![
            Movement::new("SL RDL (KB)").reps("4x10/leg"),
            Movement::new("Copenhagen Plank").reps("4x30s/side").skill(),
            Movement::new("Z-Press").reps("4x10").notes("Seated on floor."),
            Movement::new("Pallof Press").reps("4x12/side"),
        ]),

        Some(Weekday::Sat) => session(
            "Tempo Run",
            WorkoutType::Endurance,
            "Uncomfortable but sustainable.",
        )
        .with_cardio(
            cardio("4 Mile Run", 40)
                .pace("8:15-8:30 pace")
                .notes("Mile 1 warm, Mile 2-3 Tempo, Mile 4 cool."),
        ),

        _ => session(
            "Mandatory Rest",
            WorkoutType::Recovery,
            "Total rest. Focused recovery.",
        ),
    }
}

fn peak(week: u32, day: Option<Weekday>, profile: &AthleteProfile) -> WorkoutSession {
    let squat = peak_squat_target(profile.max_squat, week).round().max(0.0) as u32;

    match day {
        Some(Weekday::Mon) => session(
            "Max Effort Lower + Alactic Power",
            WorkoutType::Strength,
            "Peak neurological recruitment.",
        )
        .with(vec![
            Movement::new("Back Squat")
                .pounds(squat)
                .reps("Build to Heavy 2")
                .warmups(&[(135, 10), (225, 5), (275, 3), (315, 1)]),
        ])
        .with_cardio(cardio("Assault Bike Sprints", 20).notes("10 Rounds: 20s MAX / 1:40 rest.")),

        Some(Weekday::Tue) => session(
            "Track Speed (VO2 Max)",
            WorkoutType::Endurance,
            "400m Repeats. 1:1 work:rest ratio.",
        )
        .with_cardio(
            cardio("8 x 400m", 30)
                .pace("1:50-1:55/lap")
                .notes("7:20-7:40 mile pace equivalent."),
        ),

        Some(Weekday::Wed) => session(
            "Max Effort Upper & Benchmark",
            WorkoutType::Hybrid,
            "Bench Press Single + CrossFit Fran.",
        )
        .with(vec![
            Movement::new("Bench Press")
                .pounds(percent_of(profile.max_bench, 0.95))
                .reps("Build to Single")
                .warmups(&[(135, 10), (185, 5), (225, 1)]),
            Movement::new("Thrusters").pounds(95).reps("21-15-9"),
            Movement::new("Pull-ups").reps("21-15-9"),
        ]),

        Some(Weekday::Fri) => session(
            "Olympic Lifting & Plyos",
            WorkoutType::Strength,
            "Explosiveness and landing mechanics.",
        )
        .with(vec![
            Movement::new("Clean & Jerk").pounds(185).reps("10x1 EMOM"),
            Movement::new("Depth Jumps").reps("4x5").notes("Off 12\" box."),
            Movement::new("Broad Jumps").reps("4x3").notes("Max distance."),
        ]),

        Some(Weekday::Sat) => {
            let activity = if week >= 29 {
                "1 Mile Run Time Trial"
            } else if week >= 25 {
                "Murph (Partitioned)"
            } else {
                "5k Run for Time"
            };
            session(
                "Simulation Day (Game Day)",
                WorkoutType::Endurance,
                "PR Attempt / High Intensity simulation.",
            )
            .with_cardio(cardio(activity, 45).notes("Race effort. Leave it all out there."))
        }

        // Thursday is a flush day in the peak.
        _ => session(
            "Active Flush",
            WorkoutType::Recovery,
            "Very low intensity spin or swim.",
        )
        .with_cardio(cardio("Recovery Protocol", 45)),
    }
}

fn washout() -> WorkoutSession {
    session(
        "Washout Recovery",
        WorkoutType::Recovery,
        "Drop all fatigue. Dumbbells only, nothing over 50lbs.",
    )
    .with(vec![
        Movement::new("Nature Walk/Hike").reps("30-45 min").skill(),
        Movement::new("DB Pump (Light)").reps("3x20"),
    ])
}

fn recalibration() -> WorkoutSession {
    session(
        "Re-Calibration Week",
        WorkoutType::Recovery,
        "Re-test all baseline maxes.",
    )
    .with(vec![
        Movement::new("1RM Testing").reps("Squat/Dead/Bench/Mile").skill(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{PROGRAM_WEEKS, phase_for_week};

    const DAYS: [&str; 9] = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "", "Caturday",
    ];

    fn profile(max_squat: f64) -> AthleteProfile {
        AthleteProfile {
            max_squat,
            ..AthleteProfile::default()
        }
    }

    fn squat_load(phase: Phase, week: u32, profile: &AthleteProfile) -> u32 {
        derive_session(phase, week, "Monday", profile)
            .movements
            .iter()
            .find(|m| m.name.contains("Squat"))
            .and_then(Movement::prescribed_pounds)
            .expect("monday prescribes a squat load")
    }

    #[test]
    fn every_phase_week_and_day_resolves() {
        let p = AthleteProfile::default();
        for phase in Phase::ALL {
            for week in 0..=PROGRAM_WEEKS + 1 {
                for day in DAYS {
                    let s = derive_session(phase, week, day, &p);
                    assert!(!s.title.is_empty(), "{phase:?} w{week} {day:?}");
                    for m in &s.movements {
                        assert!(!m.name.is_empty());
                        if let Some(reps) = &m.reps {
                            assert!(!reps.is_empty(), "{phase:?} w{week} {day} {}", m.name);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let p = AthleteProfile::default();
        for week in 1..=PROGRAM_WEEKS {
            let phase = phase_for_week(week);
            for day in DAYS {
                assert_eq!(derive_session(phase, week, day, &p), derive_session(phase, week, day, &p));
            }
        }
        assert_eq!(
            squat_load(Phase::AerobicBase, 2, &p),
            squat_load(Phase::AerobicBase, 2, &p)
        );
    }

    #[test]
    fn deload_week_drops_the_squat() {
        let p = profile(300.0);
        assert_eq!(squat_load(Phase::AerobicBase, 3, &p), 210);
        assert_eq!(squat_load(Phase::AerobicBase, 4, &p), 150);
        assert!(squat_load(Phase::AerobicBase, 4, &p) < squat_load(Phase::AerobicBase, 3, &p));
        assert_eq!(squat_load(Phase::AerobicBase, 8, &p), 150);
    }

    #[test]
    fn aerobic_base_bonus_is_added_in_weeks_five_to_seven() {
        let p = profile(300.0);
        let base = percent_of(300.0, 0.7);
        let week6 = derive_session(Phase::AerobicBase, 6, "Monday", &p);
        assert_eq!(week6.movements[1].prescribed_pounds(), Some(base + 10));
        assert_eq!(week6.movements[1].prescribed.as_ref().unwrap().to_string(), "220 lbs");
        assert_eq!(squat_load(Phase::AerobicBase, 5, &p), base + 5);
        assert_eq!(squat_load(Phase::AerobicBase, 7, &p), base + 15);
        assert_eq!(squat_load(Phase::AerobicBase, 2, &p), base);

        let bench = derive_session(Phase::AerobicBase, 7, "Tuesday", &AthleteProfile::default());
        assert_eq!(bench.movements[1].prescribed_pounds(), Some(percent_of(245.0, 0.7) + 15));
    }

    #[test]
    fn absurd_maxes_saturate_instead_of_overflowing() {
        let p = AthleteProfile {
            max_squat: 1e12,
            max_bench: 1e12,
            ..AthleteProfile::default()
        };
        assert_eq!(squat_load(Phase::AerobicBase, 6, &p), u32::MAX);
        let bench = derive_session(Phase::AerobicBase, 6, "Tuesday", &p);
        assert_eq!(bench.movements[1].prescribed_pounds(), Some(u32::MAX));
    }

    #[test]
    fn loads_are_rounded_to_whole_pounds() {
        // 245 × 0.7 = 171.5
        let p = profile(245.0);
        assert_eq!(squat_load(Phase::AerobicBase, 1, &p), 172);
        assert_eq!(squat_load(Phase::AerobicBase, 5, &p), 177);
    }

    #[test]
    fn long_run_builds_then_resets() {
        let p = AthleteProfile::default();
        let minutes: Vec<u32> = (1..=8)
            .map(|w| {
                derive_session(Phase::AerobicBase, w, "Wednesday", &p)
                    .cardio
                    .unwrap()
                    .duration_minutes
            })
            .collect();
        assert_eq!(minutes, vec![35, 40, 45, 30, 50, 55, 60, 30]);
    }

    #[test]
    fn threshold_squat_steps_up_and_deloads() {
        let p = AthleteProfile::default();
        assert_eq!(squat_load(Phase::StrengthThreshold, 9, &p), 295);
        assert_eq!(squat_load(Phase::StrengthThreshold, 13, &p), 305);
        assert_eq!(squat_load(Phase::StrengthThreshold, 14, &p), 214);
        assert_eq!(squat_load(Phase::StrengthThreshold, 17, &p), 315);
        assert_eq!(squat_load(Phase::StrengthThreshold, 20, &p), 295);

        let deadlift = |w| {
            derive_session(Phase::StrengthThreshold, w, "Monday", &p).movements[2]
                .prescribed_pounds()
                .unwrap()
        };
        assert_eq!(deadlift(14), 230);
        assert_eq!(deadlift(15), 325);
    }

    #[test]
    fn threshold_intervals_lengthen_from_week_thirteen() {
        let p = AthleteProfile::default();
        let early = derive_session(Phase::StrengthThreshold, 12, "Tuesday", &p).cardio.unwrap();
        let late = derive_session(Phase::StrengthThreshold, 13, "Tuesday", &p).cardio.unwrap();
        assert_eq!(early.duration_minutes, 35);
        assert_eq!(late.duration_minutes, 40);
        assert!(late.notes.unwrap().starts_with("3 x 10 Minutes"));
    }

    #[test]
    fn peak_squat_climbs_past_the_max() {
        let p = profile(300.0);
        assert_eq!(squat_load(Phase::Peak, 21, &p), 270);
        assert_eq!(squat_load(Phase::Peak, 25, &p), 285);
        assert_eq!(squat_load(Phase::Peak, 30, &p), 305);
    }

    #[test]
    fn peak_simulation_day_rotates() {
        let p = AthleteProfile::default();
        let activity = |w| derive_session(Phase::Peak, w, "Saturday", &p).cardio.unwrap().activity;
        assert_eq!(activity(24), "5k Run for Time");
        assert_eq!(activity(25), "Murph (Partitioned)");
        assert_eq!(activity(29), "1 Mile Run Time Trial");
    }

    #[test]
    fn unmatched_days_fall_back_to_rest() {
        let p = AthleteProfile::default();
        for (phase, title) in [
            (Phase::AerobicBase, "Mandatory Recovery"),
            (Phase::StrengthThreshold, "Mandatory Rest"),
            (Phase::Peak, "Active Flush"),
        ] {
            for day in ["Sunday", "sunday", "Someday", ""] {
                let s = derive_session(phase, *phase.weeks().start(), day, &p);
                assert_eq!(s.title, title);
                assert_eq!(s.workout_type, WorkoutType::Recovery);
            }
        }
        assert_eq!(derive_session(Phase::Peak, 22, "Thursday", &p).title, "Active Flush");
    }

    #[test]
    fn day_names_are_matched_case_insensitively() {
        let p = AthleteProfile::default();
        assert_eq!(
            derive_session(Phase::AerobicBase, 1, " monday", &p),
            derive_session(Phase::AerobicBase, 1, "Monday", &p)
        );
    }

    #[test]
    fn terminal_phases_ignore_week_and_day() {
        let p = AthleteProfile::default();
        let washout = derive_session(Phase::Washout, 33, "Monday", &p);
        assert_eq!(washout.title, "Washout Recovery");
        assert_eq!(derive_session(Phase::Washout, 36, "Saturday", &p), washout);

        let recal = derive_session(Phase::Recalibration, 40, "Tuesday", &p);
        assert_eq!(recal.title, "Re-Calibration Week");
        assert_eq!(derive_session(Phase::Recalibration, 52, "Sunday", &p), recal);
    }

    #[test]
    fn metcon_scoring_follows_type_and_format() {
        let p = AthleteProfile::default();
        let thu = derive_session(Phase::AerobicBase, 1, "Thursday", &p);
        assert!(thu.is_metcon_scored());
        assert_eq!(thu.metcon_format(), "AMRAP");

        let rft = derive_session(Phase::StrengthThreshold, 10, "Thursday", &p);
        assert_eq!(rft.metcon_format(), "RFT");

        let run = derive_session(Phase::AerobicBase, 1, "Wednesday", &p);
        assert!(!run.is_metcon_scored());
        assert_eq!(run.metcon_format(), "Session");
    }

    #[test]
    fn derive_for_date_places_the_day() {
        let p = AthleteProfile {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            ..AthleteProfile::default()
        };
        // Week 4, Monday.
        let (day, s) = derive_for_date(&p, NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
        assert_eq!(day.week, 4);
        assert_eq!(day.day, "Monday");
        assert_eq!(s.movements[1].prescribed_pounds(), Some(percent_of(345.0, 0.5)));
    }
}
