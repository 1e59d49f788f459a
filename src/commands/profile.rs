use anyhow::{Context, Result, bail};
use chrono::{Days, Local, NaiveDate};
use colored::Colorize;

use super::{current_profile, today_or};
use crate::{
    cli::ProfileCmd,
    models::AthleteProfile,
    program::PROGRAM_WEEKS,
    store::Store,
    types::{OutputFmt, emit},
};

fn print_profile(p: &AthleteProfile) {
    let mile = format!("{}:{:02}", p.max_mile_seconds / 60, p.max_mile_seconds % 60);
    println!("{} {}", "Athlete:".cyan().bold(), p.name.bold());
    println!("  {:<12} {} lbs", "bodyweight", p.bodyweight);
    println!("  {:<12} {} lbs", "squat", p.max_squat);
    println!("  {:<12} {} lbs", "deadlift", p.max_deadlift);
    println!("  {:<12} {} lbs", "bench", p.max_bench);
    println!("  {:<12} {}", "mile", mile);
    println!(
        "  {:<12} {}-{} bpm, max {}",
        "zones", p.hr_zone2_low, p.hr_zone2_high, p.hr_zone5
    );
    println!("  {:<12} {}", "start", p.start_date);
}

fn number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("`{value}` is not a valid number for `{field}`"))
}

/// Heaviest weight a profile field accepts.
const MAX_POUNDS: f64 = 2000.0;

fn pounds(field: &str, value: &str) -> Result<f64> {
    let v: f64 = number(field, value)?;
    if !v.is_finite() || v <= 0.0 || v > MAX_POUNDS {
        bail!("`{field}` must be a weight between 0 and {MAX_POUNDS} lbs");
    }
    Ok(v)
}

/// Mile time as plain seconds or `m:ss`.
fn mile_seconds(value: &str) -> Result<u32> {
    match value.split_once(':') {
        Some((m, s)) => {
            let m: u32 = number("mile", m)?;
            let s: u32 = number("mile", s)?;
            if s >= 60 {
                bail!("seconds must be below 60");
            }
            Ok(m * 60 + s)
        }
        None => number("mile", value),
    }
}

/// Apply `field = value` to a profile.
pub fn apply(profile: &mut AthleteProfile, field: &str, value: &str) -> Result<()> {
    match field.to_ascii_lowercase().as_str() {
        "name" => profile.name = value.to_string(),
        "bodyweight" => profile.bodyweight = pounds(field, value)?,
        "squat" => profile.max_squat = pounds(field, value)?,
        "deadlift" => profile.max_deadlift = pounds(field, value)?,
        "bench" => profile.max_bench = pounds(field, value)?,
        "mile" => profile.max_mile_seconds = mile_seconds(value)?,
        "zone2-low" => profile.hr_zone2_low = number(field, value)?,
        "zone2-high" => profile.hr_zone2_high = number(field, value)?,
        "zone5" => profile.hr_zone5 = number(field, value)?,
        "start" => {
            profile.start_date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .with_context(|| format!("`{value}` is not a YYYY-MM-DD date"))?
        }
        other => bail!("unknown profile field `{other}`"),
    }
    if profile.hr_zone2_low > profile.hr_zone2_high {
        bail!("zone 2 lower bound is above its upper bound");
    }
    Ok(())
}

/// Start date that puts `today` in program week `week`, clamped to 1-52.
pub fn start_for_week(today: NaiveDate, week: u32) -> NaiveDate {
    let back = u64::from(week.clamp(1, PROGRAM_WEEKS) - 1) * 7;
    today.checked_sub_days(Days::new(back)).unwrap_or(today)
}

pub async fn handle(cmd: ProfileCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ProfileCmd::Show => {
            let stored = store.get_profile().await?;
            match stored {
                Some(p) => emit(fmt, &p, || print_profile(&p))?,
                None => emit(fmt, &Option::<AthleteProfile>::None, || {
                    println!(
                        "{} no profile yet, run `hlab profile init`",
                        "warning:".yellow().bold()
                    )
                })?,
            }
        }

        ProfileCmd::Init { name, start } => {
            if store.get_profile().await?.is_some() {
                println!(
                    "{} replacing the existing profile",
                    "warning:".yellow().bold()
                );
            }
            let profile = AthleteProfile {
                name,
                start_date: today_or(start),
                ..AthleteProfile::default()
            };
            store.save_profile(&profile).await?;
            emit(fmt, &profile, || {
                println!(
                    "{} program starts {}",
                    "ok:".green().bold(),
                    profile.start_date
                )
            })?;
        }

        ProfileCmd::Set { field, value } => {
            let mut profile = current_profile(store).await?;
            apply(&mut profile, &field, &value)?;
            store.save_profile(&profile).await?;
            emit(fmt, &profile, || {
                println!("{} set `{}` = `{}`", "ok:".green().bold(), field.green(), value)
            })?;
        }

        ProfileCmd::Week { week } => {
            let start = start_for_week(Local::now().date_naive(), week);
            let mut profile = current_profile(store).await?;
            apply(&mut profile, "start", &start.format("%Y-%m-%d").to_string())?;
            store.save_profile(&profile).await?;
            emit(fmt, &profile, || {
                println!(
                    "{} now in week {}, program starts {}",
                    "ok:".green().bold(),
                    week.clamp(1, PROGRAM_WEEKS),
                    profile.start_date
                )
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::week_for_date;

    #[test]
    fn fields_are_parsed_and_checked() {
        let mut p = AthleteProfile::default();
        apply(&mut p, "squat", "365").unwrap();
        apply(&mut p, "Mile", "7:05").unwrap();
        apply(&mut p, "start", "2026-01-05").unwrap();
        assert_eq!(p.max_squat, 365.0);
        assert_eq!(p.max_mile_seconds, 425);
        assert_eq!(p.start_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());

        assert!(apply(&mut p, "bench", "-5").is_err());
        assert!(apply(&mut p, "mile", "7:75").is_err());
        assert!(apply(&mut p, "zone2-low", "170").is_err());
        assert!(apply(&mut p, "wingspan", "80").is_err());
    }

    #[test]
    fn week_jump_moves_the_start_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        for week in [1, 2, 17, 52] {
            let start = start_for_week(today, week);
            assert_eq!(week_for_date(start, today), week);
        }
        assert_eq!(start_for_week(today, 1), today);
        assert_eq!(start_for_week(today, 0), today);
        assert_eq!(week_for_date(start_for_week(today, 90), today), 52);

        let mut p = AthleteProfile::default();
        let start = start_for_week(today, 10);
        apply(&mut p, "start", &start.format("%Y-%m-%d").to_string()).unwrap();
        assert_eq!(week_for_date(p.start_date, today), 10);
    }

    #[test]
    fn weights_are_capped() {
        let mut p = AthleteProfile::default();
        assert!(apply(&mut p, "squat", "1e12").is_err());
        assert!(apply(&mut p, "deadlift", "inf").is_err());
        assert_eq!(p.max_squat, AthleteProfile::default().max_squat);
        apply(&mut p, "squat", "2000").unwrap();
        assert_eq!(p.max_squat, 2000.0);
    }
}
