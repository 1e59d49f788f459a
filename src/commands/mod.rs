pub mod config;
pub mod context;
pub mod export;
pub mod history;
pub mod logbook;
pub mod profile;
pub mod roadmap;
pub mod today;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;

use crate::{
    models::{AthleteProfile, WorkoutSession},
    store::Store,
};

pub(crate) fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Stored profile, or the defaults starting today when none was saved yet.
pub(crate) async fn current_profile(store: &Store) -> Result<AthleteProfile> {
    match store.get_profile().await? {
        Some(p) => Ok(p),
        None => {
            log::warn!("no profile stored, using defaults (run `hlab profile init`)");
            Ok(AthleteProfile::default())
        }
    }
}

/// Numbered movement list with loads, reps and warm-ups.
pub(crate) fn print_session(session: &WorkoutSession) {
    println!(
        "{} {}",
        session.title.bold(),
        format!("[{}]", session.workout_type).magenta()
    );
    if !session.description.is_empty() {
        println!("{}", session.description.dimmed());
    }

    if !session.movements.is_empty() {
        println!("\n{}", "Movements:".cyan().bold());
    }
    for (i, m) in session.movements.iter().enumerate() {
        let idx = format!("{}", i + 1).yellow();
        let reps = m.reps.as_deref().map(|r| format!(" ({r})")).unwrap_or_default();
        let load = m
            .prescribed
            .as_ref()
            .map(|l| format!(" @ {}", l.to_string().green()))
            .unwrap_or_default();
        let rpe = m.rpe.map(|r| format!(" RPE {r}")).unwrap_or_default();
        let skill = if m.is_skill { " skill".dimmed().to_string() } else { String::new() };
        println!("{idx} • {}{reps}{load}{rpe}{skill}", m.name.bold());

        if !m.warmups.is_empty() {
            let ladder: Vec<String> = m
                .warmups
                .iter()
                .map(|w| format!("{}x{}", w.weight, w.reps))
                .collect();
            println!("    {} {}", "warm-up:".dimmed(), ladder.join(", "));
        }
        if let Some(notes) = &m.notes {
            println!("    {}", notes.dimmed());
        }
    }

    if let Some(c) = &session.cardio {
        println!("\n{}", "Cardio:".cyan().bold());
        println!("  {} · {} min", c.activity.bold(), c.duration_minutes);
        if let Some(hr) = &c.target_hr {
            println!("  {} {hr}", "target HR:".dimmed());
        }
        if let Some(pace) = &c.pace {
            println!("  {} {pace}", "pace:".dimmed());
        }
        if let Some(notes) = &c.notes {
            println!("  {}", notes.dimmed());
        }
    }
}
