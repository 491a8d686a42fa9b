mod query;
mod table;
mod update;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reachlog")]
#[command(about = "Keep a local dataset of daily account insights up to date")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the trailing window of days and merge it into the dataset
    Update {
        /// Number of days to fetch, including today (overrides `REACHLOG_WINDOW_DAYS`)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,

        /// Fetch and merge without writing the dataset file
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the stored dataset, most recent day first
    Show {
        /// Maximum number of days to print
        #[arg(long, default_value = "30")]
        limit: usize,
    },
    /// Print the epoch-second window of a `dd/mm/yyyy` date
    Window {
        /// Date in `dd/mm/yyyy` form
        date: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = reachlog_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Update { days, dry_run }) => {
            update::run_update(&config, days, dry_run).await?;
        }
        None => update::run_update(&config, None, false).await?,
        Some(Commands::Show { limit }) => query::run_show(&config, limit)?,
        Some(Commands::Window { date }) => query::run_window(&config, &date)?,
    }

    Ok(())
}
