use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::{
    cli::ConfigCmd,
    config::{Config, KEY_DB_PATH, KEY_LOG_LEVEL},
};

const KNOWN_KEYS: [&str; 2] = [KEY_DB_PATH, KEY_LOG_LEVEL];

pub fn handle(cmd: ConfigCmd, config_path: &Path) -> Result<()> {
    let mut cfg = Config::load(config_path)?;

    match cmd {
        ConfigCmd::List => {
            if cfg.map.is_empty() {
                println!("{}", "(no config set)".dimmed());
            } else {
                println!("{}", "Config:".cyan().bold());
                for (k, v) in &cfg.map {
                    println!("  {} = {}", k.green(), v);
                }
            }
            println!("  {} {}", "database:".dimmed(), cfg.db_path()?.display());
        }

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{val}"),
            None => println!("{} key `{}` not found", "warning:".yellow().bold(), key),
        },

        ConfigCmd::Set { key, val } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                println!(
                    "{} `{}` is not read by hlab (known: {})",
                    "warning:".yellow().bold(),
                    key,
                    KNOWN_KEYS.join(", ")
                );
            }
            cfg.map.insert(key.clone(), val.clone());
            cfg.save(config_path)?;
            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                println!("{} key `{}` not found", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
