use std::{fmt::Display, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum WorkoutType {
    Strength,
    Endurance,
    #[value(name = "metcon")]
    MetCon,
    Recovery,
    Hybrid,
}

impl WorkoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Endurance => "Endurance",
            Self::MetCon => "MetCon",
            Self::Recovery => "Recovery",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Strength" => Ok(Self::Strength),
            "Endurance" => Ok(Self::Endurance),
            "MetCon" => Ok(Self::MetCon),
            "Recovery" => Ok(Self::Recovery),
            "Hybrid" => Ok(Self::Hybrid),
            _ => Err(format!("unknown workout type `{s}`")),
        }
    }
}

/// How command output is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Pretty,
    Json,
}

impl OutputFmt {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Pretty }
    }
}

/// Print `value` as JSON, or hand over to `pretty` for the colored layout.
pub fn emit<T, F>(fmt: OutputFmt, value: &T, pretty: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(),
{
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Pretty => pretty(),
    }
    Ok(())
}

/// Return the index of the candidate closest to `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn best_name_match<S: AsRef<str>>(input: &str, candidates: &[S]) -> Option<usize> {
    let inp = input.trim().to_ascii_lowercase();
    if inp.is_empty() || candidates.is_empty() {
        return None;
    }

    // Exact (case-insensitive) hits win outright.
    if let Some(idx) = candidates
        .iter()
        .position(|c| c.as_ref().to_ascii_lowercase() == inp)
    {
        return Some(idx);
    }

    let mut scores: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, jaro_winkler(&inp, &c.as_ref().to_ascii_lowercase())))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (best_idx, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best_idx)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workout_type_round_trips_through_text() {
        for t in [
            WorkoutType::Strength,
            WorkoutType::Endurance,
            WorkoutType::MetCon,
            WorkoutType::Recovery,
            WorkoutType::Hybrid,
        ] {
            assert_eq!(t.as_str().parse::<WorkoutType>(), Ok(t));
        }
        assert!("Cardio".parse::<WorkoutType>().is_err());
    }

    #[test]
    fn name_match_prefers_exact_then_close() {
        let names = ["Back Squat", "Deadlift", "Bench Press"];
        assert_eq!(best_name_match("deadlift", &names), Some(1));
        assert_eq!(best_name_match("bench pres", &names), Some(2));
        assert_eq!(best_name_match("zzz", &names), None);
        assert_eq!(best_name_match("   ", &names), None);
    }
}
