use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::game_id::GameId;
use crate::model::GameRecord;
use crate::outcome::resolve_outcome;
use crate::pacing::Pacer;
use crate::source::StatsSource;

/// Resolve every game of a team's season, strictly in schedule order. Each
/// game waits on `pacer` before its boxscore, and again before a tie-break
/// linescore. The first failure aborts the season.
///
/// Records come back in schedule order, one per game id.
pub async fn fetch_season<S, P>(
    source: &S,
    pacer: &P,
    team_id: u32,
    season_start_year: i32,
    schedule: &[GameId],
) -> Result<Vec<GameRecord>>
where
    S: StatsSource + ?Sized,
    P: Pacer + ?Sized,
{
    let start = Instant::now();
    let mut records = Vec::with_capacity(schedule.len());

    for (index, &game_id) in schedule.iter().enumerate() {
        let record = resolve_outcome(source, pacer, team_id, game_id).await.map_err(|e| {
            error!(
                "Season {} for team {} stopped at game {} ({}/{}): {}",
                season_start_year,
                team_id,
                game_id,
                index + 1,
                schedule.len(),
                e
            );
            e
        })?;

        debug!("Game {}: {} ({})", game_id, record.result, record.venue);
        records.push(record);
    }

    info!(
        "Fetched {} games for team {} season {} in {:?}",
        records.len(),
        team_id,
        season_start_year,
        start.elapsed()
    );
    Ok(records)
}
