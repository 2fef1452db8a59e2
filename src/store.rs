//! Per-team game tables in SQLite.
//!
//! Each team gets a table named exactly after the team ("Chicago Blackhawks"),
//! keyed by `gameId`. Rows are only ever inserted; a second insert of the same
//! game is skipped by the primary key, so repeated ingestion never duplicates.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};
use crate::game_id::GameId;
use crate::model::{GameRecord, GameResult, Venue};

/// What `upsert_game` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    AlreadyPresent,
}

const COLUMNS: &str = r#""gameId", "season", "venue", "result", "goals", "pim", "shots",
    "powerPlayPercentage", "powerPlayGoals", "powerPlayOpportunities",
    "faceOffWinPercentage", "blocked", "takeaways", "giveaways", "hits""#;

/// Quote a team name for use as a table identifier.
pub fn quote_table_name(team_name: &str) -> Result<String> {
    if team_name.trim().is_empty()
        || team_name.contains('\0')
        || team_name.to_ascii_lowercase().starts_with("sqlite_")
    {
        return Err(IngestError::InvalidTeamName(team_name.to_string()));
    }
    Ok(format!("\"{}\"", team_name.replace('"', "\"\"")))
}

/// Delay before reconnect attempt `attempt + 1`: 2s, 4s, 8s, ... capped at 64s.
pub fn retry_backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt.min(6)))
}

#[derive(Clone)]
pub struct GameStore {
    pool: SqlitePool,
}

impl GameStore {
    /// Open (creating if missing) the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn connect_with_retry(url: &str, max_retries: u32) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::connect(url).await {
                Ok(store) => {
                    info!("Connected to {}", url);
                    return Ok(store);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(e);
                    }
                    warn!("Database connection attempt {} failed: {}. Retrying...", attempt, e);
                    tokio::time::sleep(retry_backoff(attempt)).await;
                }
            }
        }
    }

    /// Private in-memory database; lives as long as the store.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ensure_table(&self, team_name: &str) -> Result<()> {
        let table = quote_table_name(team_name)?;
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                "gameId" INTEGER PRIMARY KEY NOT NULL,
                "season" INTEGER NOT NULL,
                "venue" TEXT NOT NULL CHECK ("venue" IN ('home', 'away')),
                "result" TEXT NOT NULL CHECK ("result" IN ('win', 'loss')),
                "goals" INTEGER NOT NULL,
                "pim" INTEGER NOT NULL,
                "shots" INTEGER NOT NULL,
                "powerPlayPercentage" REAL NOT NULL,
                "powerPlayGoals" INTEGER NOT NULL,
                "powerPlayOpportunities" INTEGER NOT NULL,
                "faceOffWinPercentage" REAL NOT NULL,
                "blocked" INTEGER NOT NULL,
                "takeaways" INTEGER NOT NULL,
                "giveaways" INTEGER NOT NULL,
                "hits" INTEGER NOT NULL
            )
            "#
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        debug!("Ensured table {}", table);
        Ok(())
    }

    /// Insert `record` unless the team already has a row for its game.
    pub async fn upsert_game(&self, team_name: &str, record: &GameRecord) -> Result<UpsertOutcome> {
        let table = quote_table_name(team_name)?;
        let sql = format!(
            r#"
            INSERT INTO {table} ({COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT ("gameId") DO NOTHING
            "#
        );

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(&sql)
            .bind(record.game_id.0)
            .bind(record.season)
            .bind(record.venue.as_str())
            .bind(record.result.as_str())
            .bind(record.goals)
            .bind(record.pim)
            .bind(record.shots)
            .bind(record.power_play_percentage)
            .bind(record.power_play_goals)
            .bind(record.power_play_opportunities)
            .bind(record.face_off_win_percentage)
            .bind(record.blocked)
            .bind(record.takeaways)
            .bind(record.giveaways)
            .bind(record.hits)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        if inserted == 0 {
            debug!("{}: game {} already present", team_name, record.game_id);
            Ok(UpsertOutcome::AlreadyPresent)
        } else {
            Ok(UpsertOutcome::Inserted)
        }
    }

    pub async fn table_exists(&self, team_name: &str) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(team_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }

    /// Row count for a team; zero when its table does not exist yet.
    pub async fn count(&self, team_name: &str) -> Result<i64> {
        if !self.table_exists(team_name).await? {
            return Ok(0);
        }
        let table = quote_table_name(team_name)?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Stored records for a team, ordered by game id.
    pub async fn games(&self, team_name: &str) -> Result<Vec<GameRecord>> {
        let table = quote_table_name(team_name)?;
        let sql = format!(r#"SELECT {COLUMNS} FROM {table} ORDER BY "gameId""#);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<GameRecord> {
    let venue: String = row.try_get("venue")?;
    let result: String = row.try_get("result")?;

    Ok(GameRecord {
        game_id: GameId(row.try_get("gameId")?),
        season: row.try_get("season")?,
        venue: Venue::from_str(&venue).map_err(IngestError::CorruptRow)?,
        result: GameResult::from_str(&result).map_err(IngestError::CorruptRow)?,
        goals: row.try_get("goals")?,
        pim: row.try_get("pim")?,
        shots: row.try_get("shots")?,
        power_play_percentage: row.try_get("powerPlayPercentage")?,
        power_play_goals: row.try_get("powerPlayGoals")?,
        power_play_opportunities: row.try_get("powerPlayOpportunities")?,
        face_off_win_percentage: row.try_get("faceOffWinPercentage")?,
        blocked: row.try_get("blocked")?,
        takeaways: row.try_get("takeaways")?,
        giveaways: row.try_get("giveaways")?,
        hits: row.try_get("hits")?,
    })
}
