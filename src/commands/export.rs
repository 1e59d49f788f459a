use std::{fs::File, io, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    progress::{or_empty, write_csv},
    store::Store,
};

/// CSV to `out`, or to stdout when no file is given.
pub async fn handle(store: &Store, out: Option<&Path>) -> Result<()> {
    let sessions = or_empty("session index", store.get_all_sessions().await);

    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&sessions, file)?;
            eprintln!(
                "{} wrote {} sessions to {}",
                "ok:".green().bold(),
                sessions.len(),
                path.display()
            );
        }
        None => write_csv(&sessions, io::stdout().lock())?,
    }

    Ok(())
}
