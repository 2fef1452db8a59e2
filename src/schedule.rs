use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::game_id::GameId;
use crate::source::StatsSource;

/// Date window covering a season: September 1st through May 31st of the next year.
pub fn season_window(season_start_year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(season_start_year, 9, 1);
    let end = season_start_year
        .checked_add(1)
        .and_then(|year| NaiveDate::from_ymd_opt(year, 5, 31));
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(IngestError::InsufficientData(format!(
            "season {season_start_year} is outside the supported calendar"
        ))),
    }
}

/// Regular-season game ids for a team's season, in the order the source lists them.
pub async fn resolve_schedule<S>(
    source: &S,
    team_id: u32,
    season_start_year: i32,
) -> Result<Vec<GameId>>
where
    S: StatsSource + ?Sized,
{
    let (start, end) = season_window(season_start_year)?;
    let schedule = source.schedule(team_id, start, end).await?;

    let mut listed = 0usize;
    let game_ids: Vec<GameId> = schedule
        .game_ids()
        .inspect(|_| listed += 1)
        .filter(|id| id.is_regular_season())
        .collect();

    debug!(
        "Team {} season {}: {} listed, {} regular season",
        team_id,
        season_start_year,
        listed,
        game_ids.len()
    );
    info!(
        "Resolved {} regular-season games for team {} ({} to {})",
        game_ids.len(),
        team_id,
        start,
        end
    );
    Ok(game_ids)
}
