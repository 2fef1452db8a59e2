//! NHL per-game team statistics ingestion.
//!
//! Pipeline: team directory → season schedule (regular season only) → paced
//! per-game boxscore fetch with win/loss derivation → idempotent insert into
//! one SQLite table per team.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use nhl_stats_ingestion::{GameStore, GovernorPacer, Ingestor, NhlApiClient};
//!
//! # async fn run() -> Result<(), nhl_stats_ingestion::IngestError> {
//! let source = NhlApiClient::new("https://statsapi.web.nhl.com/api/v1", Duration::from_secs(30))?;
//! let pacer = GovernorPacer::new(Duration::from_secs(1)).expect("non-zero interval");
//! let store = GameStore::connect("sqlite://nhl-stats.sqlite3").await?;
//!
//! let ingestor = Ingestor::new(source, pacer, store);
//! let report = ingestor.ingest(2016, &["Chicago Blackhawks".to_string()]).await?;
//! println!("{} games stored", report.inserted());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod fetch;
pub mod game_id;
pub mod ingest;
pub mod model;
pub mod outcome;
pub mod pacing;
pub mod schedule;
pub mod source;
pub mod store;
pub mod testing;

pub use config::Config;
pub use error::IngestError;
pub use game_id::GameId;
pub use ingest::{IngestReport, Ingestor, TeamFailure, TeamSummary};
pub use model::{GameRecord, GameResult, TeamEntry, Venue};
pub use pacing::{GovernorPacer, Pacer};
pub use source::{NhlApiClient, StatsSource};
pub use store::{GameStore, UpsertOutcome};
