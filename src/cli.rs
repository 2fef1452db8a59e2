use clap::{Parser, Subcommand};

/// NHL team statistics ingestion
///
/// Pulls per-game team statistics from the NHL stats API, derives each game's
/// win/loss (including shootouts) and stores one table per team.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Database URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest one or more seasons into the per-team tables
    Ingest {
        /// Year a season began, e.g. 2016 for 2016-17. Repeat for several seasons.
        #[arg(short, long = "season", required = true, num_args = 1..)]
        seasons: Vec<i32>,

        /// Only ingest the named team. Repeatable; defaults to every team.
        #[arg(short, long = "team")]
        teams: Vec<String>,

        /// Minimum milliseconds between game requests (overrides REQUEST_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// List the league's teams
    Teams,

    /// Cross-validate a win-prediction model on a team's stored games
    Evaluate {
        /// Team whose table to read
        #[arg(short, long)]
        team: String,

        /// Number of folds
        #[arg(long, default_value_t = 10)]
        folds: usize,
    },
}
