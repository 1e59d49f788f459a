use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{program::Phase, types::WorkoutType};

#[derive(Parser)]
#[command(name = "hlab", version, about = "52-week hybrid training tracker")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the session prescribed for a date
    #[command(visible_alias = "t")]
    Today {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show the session for any phase, week and day
    Plan {
        #[arg(short, long, value_enum)]
        phase: Phase,

        /// Program week (1-52)
        #[arg(short, long)]
        week: u32,

        /// Day name, e.g. Monday
        #[arg(short, long)]
        day: String,
    },

    /// Show the five phases and how far through them you are
    #[command(visible_alias = "r")]
    Roadmap,

    /// View or edit the athlete profile
    #[command(subcommand, visible_alias = "p")]
    Profile(ProfileCmd),

    /// Log, inspect or retract a session
    #[command(subcommand, visible_alias = "l")]
    Log(LogCmd),

    /// List logged sessions and strength trends
    #[command(visible_alias = "h")]
    History(HistoryArgs),

    /// Write every logged session as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the JSON snapshot handed to an advisor
    Context {
        /// Date the snapshot is taken on (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// View or edit hlab config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum ProfileCmd {
    /// Show the stored profile
    #[command(visible_alias = "s")]
    Show,

    /// Create the profile, starting the program on a date
    Init {
        #[arg(short, long, default_value = "Athlete")]
        name: String,

        /// First day of week one (defaults to today)
        #[arg(short, long)]
        start: Option<NaiveDate>,
    },

    /// Change one field - Usage: profile set FIELD VALUE
    #[command(override_usage = "profile set <FIELD> <VALUE>")]
    Set {
        /// One of: name, bodyweight, squat, deadlift, bench, mile, zone2-low,
        /// zone2-high, zone5, start
        field: String,
        value: String,
    },

    /// Move the start date so that today falls in WEEK (1-52)
    Week { week: u32 },
}

#[derive(Subcommand)]
pub enum LogCmd {
    /// Log the session prescribed for a date
    #[command(visible_alias = "c")]
    Commit(CommitArgs),

    /// Show what was logged on a date
    #[command(visible_alias = "s")]
    Show {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Remove the session logged on a date
    Retract {
        #[arg(short, long)]
        date: NaiveDate,
    },
}

#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Date as YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Mark every set as done
    #[arg(short, long)]
    pub all: bool,

    /// Toggle one set: MOVEMENT.SET, 1-based (movement may be a name)
    #[arg(long, value_name = "MOVEMENT.SET")]
    pub done: Vec<String>,

    /// Override a set's weight: MOVEMENT.SET=LBS
    #[arg(short, long, value_name = "MOVEMENT.SET=LBS")]
    pub weight: Vec<String>,

    /// MetCon rounds
    #[arg(long)]
    pub rounds: Option<u32>,

    /// MetCon reps past the last full round
    #[arg(long)]
    pub reps: Option<u32>,

    /// Distance covered, in miles
    #[arg(short, long)]
    pub miles: Option<f64>,

    /// JSON sensor export to attach
    #[arg(long, value_name = "FILE")]
    pub sensor: Option<PathBuf>,

    /// Mark a recovery session as done
    #[arg(long)]
    pub recovered: bool,

    /// Free-text note on a recovery day
    #[arg(short, long)]
    pub note: Option<String>,

    /// Save even if the session is not complete
    #[arg(long)]
    pub partial: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Only sessions of this type
    #[arg(short = 't', long = "type", value_enum)]
    pub workout_type: Option<WorkoutType>,

    /// Show the top set on each date for an exercise
    #[arg(short, long)]
    pub exercise: Option<String>,

    /// Show pounds lifted per program week
    #[arg(long)]
    pub tonnage: bool,

    /// Draw a graph instead of a table
    #[arg(short, long)]
    pub graph: bool,
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
