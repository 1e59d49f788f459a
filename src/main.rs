use anyhow::{Context, Result};
use clap::Parser;
use hybrid_lab::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    store::Store,
    types::OutputFmt,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = Config::default_path()?;
    let cfg = Config::load(&config_path)?;

    let filter = cfg.log_level().unwrap_or("warn");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let fmt = OutputFmt::from_flag(cli.json);

    // Config edits never need the database.
    if let Commands::Config(cmd) = cli.cmd {
        return commands::config::handle(cmd, &config_path);
    }

    let db_path = cfg.db_path()?;
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let store = Store::connect(&db_path).await?;

    match cli.cmd {
        Commands::Today { date } => commands::today::handle(&store, date, fmt).await?,
        Commands::Plan { phase, week, day } => {
            commands::today::plan(&store, phase, week, &day, fmt).await?
        }
        Commands::Roadmap => commands::roadmap::handle(&store, fmt).await?,
        Commands::Profile(cmd) => commands::profile::handle(cmd, &store, fmt).await?,
        Commands::Log(cmd) => commands::logbook::handle(cmd, &store, fmt).await?,
        Commands::History(args) => commands::history::handle(args, &store, fmt).await?,
        Commands::Export { out } => commands::export::handle(&store, out.as_deref()).await?,
        Commands::Context { date } => commands::context::handle(&store, date).await?,
        Commands::Config(cmd) => commands::config::handle(cmd, &config_path)?,
    }

    store.close().await;
    Ok(())
}
