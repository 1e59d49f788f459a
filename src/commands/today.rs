use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use super::{current_profile, print_session, today_or};
use crate::{
    models::WorkoutSession,
    program::{Phase, ProgramDay, clamp_week},
    progress::completion_for_date,
    store::Store,
    types::{OutputFmt, emit},
    workout::{derive_for_date, derive_session, is_deload},
};

#[derive(Serialize)]
struct TodayView {
    day: ProgramDay,
    deload: bool,
    session: WorkoutSession,
    /// `None` when nothing is logged for the date.
    logged_complete: Option<bool>,
}

pub async fn handle(store: &Store, date: Option<NaiveDate>, fmt: OutputFmt) -> Result<()> {
    let profile = current_profile(store).await?;
    let date = today_or(date);
    let (day, session) = derive_for_date(&profile, date);
    let logged = completion_for_date(store, date).await?;

    let view = TodayView {
        deload: is_deload(day.phase, day.week),
        logged_complete: logged.map(|r| r.completed),
        day,
        session,
    };

    emit(fmt, &view, || {
        println!(
            "{} {} · week {} · {}",
            view.day.day.cyan().bold(),
            view.day.date_key(),
            view.day.week,
            view.day.phase.name().blue()
        );
        if view.deload {
            println!("{} deload week", "info:".blue().bold());
        }
        println!();
        print_session(&view.session);

        match view.logged_complete {
            Some(true) => println!("\n{} logged and complete", "ok:".green().bold()),
            Some(false) => println!("\n{} logged, not complete", "warning:".yellow().bold()),
            None => println!("\n{}", "not logged yet (hlab log commit)".dimmed()),
        }
    })
}

/// Session for an arbitrary phase/week/day, independent of the calendar.
pub async fn plan(store: &Store, phase: Phase, week: u32, day: &str, fmt: OutputFmt) -> Result<()> {
    let profile = current_profile(store).await?;
    let week = clamp_week(week as i64);
    if !phase.weeks().contains(&week) {
        log::warn!("week {week} is outside {} ({:?})", phase.name(), phase.weeks());
    }
    let session = derive_session(phase, week, day, &profile);

    emit(fmt, &session, || {
        println!(
            "{} · week {} · {}\n",
            day.cyan().bold(),
            week,
            phase.name().blue()
        );
        print_session(&session);
    })
}
