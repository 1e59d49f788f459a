use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;

use super::{current_profile, today_or};
use crate::{
    cli::{CommitArgs, LogCmd},
    collab::{FileSensor, SensorSource},
    draft::{METERS_PER_MILE, SessionDraft},
    models::{PerformanceRecord, date_key},
    store::Store,
    types::{OutputFmt, best_name_match, emit},
    workout::derive_for_date,
};

/// Zero-based (movement, set) for `MOVEMENT.SET`. The movement is a 1-based
/// index or an exercise name.
fn resolve_set(draft: &SessionDraft, spec: &str) -> Result<(usize, usize)> {
    let (movement, set) = spec
        .rsplit_once('.')
        .ok_or_else(|| anyhow!("expected MOVEMENT.SET, got `{spec}`"))?;

    let movement = match movement.trim().parse::<usize>() {
        Ok(0) => bail!("movements are numbered from 1"),
        Ok(n) => n - 1,
        Err(_) => {
            let names: Vec<&str> = draft.strength.iter().map(|e| e.exercise.as_str()).collect();
            best_name_match(movement, &names)
                .ok_or_else(|| anyhow!("no movement named `{}` in this session", movement.trim()))?
        }
    };
    let set: usize = set
        .trim()
        .parse()
        .with_context(|| format!("`{set}` is not a set number"))?;
    if set == 0 {
        bail!("sets are numbered from 1");
    }
    Ok((movement, set - 1))
}

fn print_record(record: &PerformanceRecord) {
    let data = &record.performance;
    let status = if record.completed {
        "complete".green()
    } else {
        "incomplete".yellow()
    };
    println!(
        "{} {} · {} · week {} · {}",
        "Logged:".cyan().bold(),
        record.date_key(),
        record.day,
        record.week,
        status
    );

    for (i, entry) in data.strength().iter().enumerate() {
        let idx = format!("{}", i + 1).yellow();
        println!("{idx} • {}", entry.exercise.bold());
        for (j, s) in entry.sets.iter().enumerate() {
            let mark = if s.completed { "✓".green() } else { "·".dimmed() };
            let kind = if s.is_warmup { " warm-up".dimmed().to_string() } else { String::new() };
            println!("    {mark} {}: {} x {}{kind}", j + 1, s.weight, s.reps);
        }
    }

    if let Some(m) = data.metcon() {
        println!("{} {} {} rounds + {} reps", "MetCon:".cyan().bold(), m.format, m.rounds, m.reps);
    }
    if let Some(c) = data.cardio() {
        let miles = c
            .distance_meters
            .map(|d| format!(" · {:.2} mi", d / METERS_PER_MILE))
            .unwrap_or_default();
        let hr = match (c.avg_hr, c.peak_hr) {
            (Some(avg), Some(peak)) => format!(" · {avg}/{peak} bpm"),
            _ => String::new(),
        };
        let source = c.source.as_deref().unwrap_or("manual");
        println!(
            "{} {} · {} min{miles}{hr} ({})",
            "Cardio:".cyan().bold(),
            c.activity,
            c.duration_seconds / 60,
            source.dimmed()
        );
    }
    if let Some(done) = data.recovery_done() {
        println!("{} {}", "Recovery:".cyan().bold(), if done { "done" } else { "skipped" });
        if let Some(note) = data.recovery_note() {
            println!("    {}", note.dimmed());
        }
    }
}

async fn commit(args: CommitArgs, store: &Store, fmt: OutputFmt) -> Result<()> {
    let profile = current_profile(store).await?;
    let date = today_or(args.date);
    let (day, session) = derive_for_date(&profile, date);
    let mut draft = SessionDraft::from_session(&session, day.phase);

    if args.all {
        draft.complete_all_sets();
    }
    for spec in &args.done {
        let (m, s) = resolve_set(&draft, spec)?;
        draft.toggle_set(m, s)?;
    }
    for spec in &args.weight {
        let (target, lbs) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("expected MOVEMENT.SET=LBS, got `{spec}`"))?;
        let (m, s) = resolve_set(&draft, target)?;
        let lbs: f64 = lbs
            .trim()
            .parse()
            .with_context(|| format!("`{lbs}` is not a weight"))?;
        draft.set_weight(m, s, lbs)?;
    }
    if args.rounds.is_some() || args.reps.is_some() {
        draft.record_metcon(args.rounds.unwrap_or(0), args.reps.unwrap_or(0));
    }
    if let Some(miles) = args.miles {
        draft.enter_distance(miles)?;
    }
    if let Some(path) = args.sensor {
        let sensor = FileSensor { path };
        let reading = sensor
            .fetch(&session)
            .await
            .context("sensor sync failed")?;
        draft.attach_sensor(reading);
    }
    if args.recovered {
        draft.mark_recovery(true);
    }
    draft.recovery_note = args.note;

    if !draft.is_session_complete() && !args.partial {
        bail!(
            "`{}` is not complete yet; finish it or pass --partial to save anyway",
            session.title
        );
    }

    let record = draft.commit(day.week, day.day, date)?;
    store
        .save_workout(&record, day.phase, session.workout_type, &session.title)
        .await?;

    emit(fmt, &record, || {
        print_record(&record);
        println!("\n{} saved {}", "ok:".green().bold(), session.title.bold());
    })
}

pub async fn handle(cmd: LogCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    match cmd {
        LogCmd::Commit(args) => commit(args, store, fmt).await?,

        LogCmd::Show { date } => {
            let date = today_or(date);
            let record = store.get_record(date).await?;
            emit(fmt, &record, || match &record {
                Some(r) => print_record(r),
                None => println!(
                    "{} nothing logged on {}",
                    "warning:".yellow().bold(),
                    date_key(date)
                ),
            })?;
        }

        LogCmd::Retract { date } => {
            let removed = store.delete_workout(date).await?;
            emit(fmt, &removed, || {
                if removed {
                    println!("{} retracted {}", "ok:".green().bold(), date_key(date));
                } else {
                    println!(
                        "{} nothing logged on {}",
                        "warning:".yellow().bold(),
                        date_key(date)
                    );
                }
            })?;
        }
    }

    Ok(())
}
