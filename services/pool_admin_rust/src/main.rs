mod commands;
mod config;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use survivor_rust_core::{ChicagoMode, ContestId};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "pool_admin")]
#[command(version, about = "Survivor pool operator tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show a contest's entries, eliminations and remaining teams.
    View {
        /// Contest id (circa, scs)
        contest: ContestId,
        /// Print the full view as JSON
        #[arg(long)]
        json: bool,
        /// Also write the dashboard snapshot file
        #[arg(long)]
        write_dashboard: bool,
    },
    /// Ingest a pick upload (aggregate report, JSON or delimited table).
    IngestPicks {
        contest: ContestId,
        file: PathBuf,
        /// Target week; defaults to the contest's current week
        #[arg(long)]
        week: Option<String>,
        /// Report what would change without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Store consensus text extracted from a PDF as the rooting override.
    IngestRooting {
        file: PathBuf,
        /// Override lifetime; defaults to ROOTING_OVERRIDE_TTL_HOURS
        #[arg(long)]
        ttl_hours: Option<i64>,
    },
    /// Drop the rooting override.
    ClearRooting,
    /// Set one entry's pick for a week.
    Upsert {
        contest: ContestId,
        entry: String,
        week: String,
        team: String,
        /// W, L, T or P (default P)
        #[arg(long)]
        result: Option<String>,
    },
    /// Hedge outcomes for a stake on the opponent moneyline.
    Hedge {
        #[arg(long, allow_negative_numbers = true)]
        opponent_ml: f64,
        #[arg(long, default_value = "0")]
        stake: f64,
        /// Our pick's win probability, 0-1
        #[arg(long, default_value = "0.7")]
        win_prob: f64,
        /// Equity held if our pick wins
        #[arg(long)]
        equity: f64,
        #[arg(long, default_value = "0")]
        buy_in: f64,
        /// Solve for the smallest stake guaranteeing this floor
        #[arg(long)]
        floor: Option<f64>,
    },
    /// Weekly Chicago-style hedge recommendation.
    Chicago {
        /// ml, even, ml_heavy or spread_heavy
        #[arg(long, default_value = "ml")]
        mode: ChicagoMode,
        #[arg(long)]
        week: u32,
        #[arg(long, allow_negative_numbers = true)]
        opponent_ml: f64,
        #[arg(long, allow_negative_numbers = true)]
        spread_price: Option<f64>,
        #[arg(long)]
        entry_fee: f64,
        #[arg(long, default_value = "0")]
        recouped: f64,
    },
}

fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    info!(data_file = %config.data_file.display(), "Starting pool admin");

    commands::run(cli.command, &config)
}
