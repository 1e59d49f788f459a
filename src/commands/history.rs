use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::current_profile;
use crate::{
    cli::HistoryArgs,
    models::SessionIndexRecord,
    progress::{TopSet, WeeklyTonnage, or_empty, top_set_history, weekly_tonnage},
    store::Store,
    types::{OutputFmt, emit},
};

/// Plot `points` on a character grid, first point at the left edge.
fn ascii_graph(points: &[(String, f64)], width: usize, height: usize, title: &str) -> Vec<String> {
    if points.is_empty() {
        return vec!["No data available".to_string()];
    }
    let width = width.max(2);
    let height = height.max(2);

    let min = points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };

    let col = |i: usize| {
        if points.len() == 1 {
            0
        } else {
            i * (width - 1) / (points.len() - 1)
        }
    };
    let row = |v: f64| height - 1 - (((v - min) / range) * (height - 1) as f64).round() as usize;

    let mut grid = vec![vec![' '; width]; height];
    for (i, (_, v)) in points.iter().enumerate() {
        let (x, y) = (col(i), row(*v));
        if i > 0 {
            // Join to the previous point.
            let (px, py) = (col(i - 1) as isize, row(points[i - 1].1) as isize);
            let (dx, dy) = (x as isize - px, y as isize - py);
            let steps = dx.abs().max(dy.abs());
            for step in 1..steps {
                let gx = (px + dx * step / steps) as usize;
                let gy = (py + dy * step / steps) as usize;
                if grid[gy][gx] == ' ' {
                    grid[gy][gx] = '·';
                }
            }
        }
        grid[y][x] = '●';
    }

    let step = (max - min) / (height - 1) as f64;
    let mut out = vec![format!("\n{}", title.bold()), "─".repeat(width + 8)];
    for (i, cells) in grid.iter().enumerate() {
        let value = max - step * i as f64;
        out.push(format!("{:6.0} │{}", value, cells.iter().collect::<String>()));
    }
    out.push(format!("       └{}", "─".repeat(width)));
    if let (Some((first, _)), Some((last, _))) = (points.first(), points.last()) {
        let gap = (width + 1).saturating_sub(first.len() + last.len());
        out.push(format!("        {first}{}{last}", " ".repeat(gap)));
    }
    out
}

fn print_graph(points: &[(String, f64)], title: &str) {
    let (term_width, term_height) = term_size::dimensions().unwrap_or((80, 24));
    let width = (term_width / 2).min(60);
    let height = (term_height / 2).min(15);
    for line in ascii_graph(points, width, height, title) {
        println!("{line}");
    }
}

async fn tonnage(store: &Store, graph: bool, fmt: OutputFmt) -> Result<()> {
    let profile = current_profile(store).await?;
    let rows = or_empty("strength history", store.get_strength_entries().await);
    let weeks: Vec<WeeklyTonnage> = weekly_tonnage(&rows, profile.start_date);

    emit(fmt, &weeks, || {
        if weeks.is_empty() {
            println!("{}", "(no strength sessions logged)".dimmed());
        } else if graph {
            let points: Vec<(String, f64)> =
                weeks.iter().map(|w| (format!("W{}", w.week), w.pounds)).collect();
            print_graph(&points, "Weekly Tonnage (lbs)");
        } else {
            println!("{}", "Weekly tonnage:".cyan().bold());
            for w in &weeks {
                println!("  {} {:>10.0} lbs", format!("week {:>2}", w.week).yellow(), w.pounds);
            }
        }
    })
}

async fn top_sets(store: &Store, exercise: &str, graph: bool, fmt: OutputFmt) -> Result<()> {
    let rows = or_empty("strength history", store.get_strength_entries().await);
    let history: Vec<TopSet> = top_set_history(&rows, exercise);

    emit(fmt, &history, || {
        if history.is_empty() {
            println!(
                "{} no completed working sets for `{}`",
                "warning:".yellow().bold(),
                exercise
            );
        } else if graph {
            let points: Vec<(String, f64)> = history
                .iter()
                .map(|t| (t.date.format("%m-%d").to_string(), t.weight))
                .collect();
            print_graph(&points, &format!("{exercise} top set (lbs)"));
        } else {
            println!("{} {}", "Top sets:".cyan().bold(), exercise.bold());
            for t in &history {
                println!("  {}  {} x {}", t.date, t.weight, t.reps);
            }
        }
    })
}

pub async fn handle(args: HistoryArgs, store: &Store, fmt: OutputFmt) -> Result<()> {
    if let Some(exercise) = &args.exercise {
        return top_sets(store, exercise, args.graph, fmt).await;
    }
    if args.tonnage {
        return tonnage(store, args.graph, fmt).await;
    }

    let sessions: Vec<SessionIndexRecord> = or_empty("session index", store.get_all_sessions().await)
        .into_iter()
        .filter(|s| args.workout_type.is_none_or(|t| s.workout_type == t))
        .collect();

    emit(fmt, &sessions, || {
        if sessions.is_empty() {
            println!("{}", "(no sessions logged)".dimmed());
            return;
        }
        println!("{}", "Sessions:".cyan().bold());
        for s in &sessions {
            println!(
                "  {} {} {} {}",
                s.date.to_string().yellow(),
                format!("W{:<2}", s.week).dimmed(),
                format!("{:<9}", s.workout_type.as_str()).magenta(),
                s.title
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("W{}", i + 1), *v))
            .collect()
    }

    #[test]
    fn graph_marks_every_point() {
        let lines = ascii_graph(&pts(&[100.0, 200.0, 150.0]), 11, 5, "t");
        let dots: usize = lines.iter().map(|l| l.matches('●').count()).sum();
        assert_eq!(dots, 3);
        // title, rule, five rows, axis, labels
        assert_eq!(lines.len(), 9);
        assert!(lines[8].trim_start().starts_with("W1"));
        assert!(lines[8].trim_end().ends_with("W3"));
    }

    #[test]
    fn flat_and_single_series_still_draw() {
        assert_eq!(ascii_graph(&[], 10, 5, "t"), vec!["No data available".to_string()]);
        let flat = ascii_graph(&pts(&[50.0, 50.0]), 10, 4, "t");
        assert_eq!(flat.iter().map(|l| l.matches('●').count()).sum::<usize>(), 2);
        let single = ascii_graph(&pts(&[75.0]), 10, 4, "t");
        assert_eq!(single.iter().map(|l| l.matches('●').count()).sum::<usize>(), 1);
    }
}
