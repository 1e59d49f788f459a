use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use serde::Serialize;

use super::current_profile;
use crate::{
    program::{Phase, week_for_date},
    progress::{PhaseStatus, or_empty, phase_completion_percentage},
    store::Store,
    types::{OutputFmt, emit},
};

#[derive(Serialize)]
struct PhaseView {
    id: u8,
    phase: Phase,
    name: &'static str,
    description: &'static str,
    first_week: u32,
    last_week: u32,
    status: PhaseStatus,
    completion: u8,
}

#[derive(Serialize)]
struct Roadmap {
    current_week: u32,
    phases: Vec<PhaseView>,
}

fn bar(pct: u8, width: usize) -> String {
    let filled = width * pct as usize / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub async fn handle(store: &Store, fmt: OutputFmt) -> Result<()> {
    let profile = current_profile(store).await?;
    let current_week = week_for_date(profile.start_date, Local::now().date_naive());
    let sessions = or_empty("session index", store.get_all_sessions().await);

    let phases = Phase::ALL
        .into_iter()
        .map(|p| PhaseView {
            id: p.id(),
            phase: p,
            name: p.name(),
            description: p.description(),
            first_week: *p.weeks().start(),
            last_week: *p.weeks().end(),
            status: PhaseStatus::of(p, current_week),
            completion: phase_completion_percentage(p, &sessions),
        })
        .collect();
    let roadmap = Roadmap { current_week, phases };

    emit(fmt, &roadmap, || {
        let (term_width, _) = term_size::dimensions().unwrap_or((80, 24));
        let width = term_width.saturating_sub(20).clamp(10, 40);

        println!(
            "{} week {} of 52\n",
            "Roadmap:".cyan().bold(),
            roadmap.current_week
        );
        for p in &roadmap.phases {
            let name = match p.status {
                PhaseStatus::Current => p.name.green().bold(),
                PhaseStatus::Past => p.name.normal(),
                PhaseStatus::Future => p.name.dimmed(),
            };
            let marker = if p.status == PhaseStatus::Current { "▶" } else { " " };
            println!(
                "{} {} {}",
                marker.green(),
                name,
                format!("(weeks {}-{})", p.first_week, p.last_week).dimmed()
            );
            println!("    {}", p.description.dimmed());
            println!("    {} {:>3}%", bar(p.completion, width), p.completion);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_in_proportion() {
        assert_eq!(bar(0, 10), "░".repeat(10));
        assert_eq!(bar(50, 10), format!("{}{}", "█".repeat(5), "░".repeat(5)));
        assert_eq!(bar(100, 4), "█".repeat(4));
    }
}
