//! Win/loss derivation for one team in one game.
//!
//! Goals decide the game when they differ. When they are level the game went
//! to a shootout, and the linescore's shootout tallies decide it instead.

use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::game_id::GameId;
use crate::model::{BoxscoreResponse, GameRecord, GameResult, ShootoutInfo, TeamSkaterStats, Venue};
use crate::pacing::Pacer;
use crate::source::StatsSource;

/// Result decided by goals alone; `None` when level.
pub fn regulation_result(own_goals: i64, opponent_goals: i64) -> Option<GameResult> {
    match own_goals.cmp(&opponent_goals) {
        std::cmp::Ordering::Greater => Some(GameResult::Win),
        std::cmp::Ordering::Less => Some(GameResult::Loss),
        std::cmp::Ordering::Equal => None,
    }
}

/// Result from shootout tallies, seen from `venue`'s side.
pub fn shootout_result(shootout: &ShootoutInfo, venue: Venue) -> GameResult {
    let (own, opponent) = match venue {
        Venue::Home => (shootout.home.scores, shootout.away.scores),
        Venue::Away => (shootout.away.scores, shootout.home.scores),
    };
    if own > opponent {
        GameResult::Win
    } else {
        GameResult::Loss
    }
}

/// Total over goals and, when level, shootout tallies. `None` is a level game
/// with no shootout to break it.
pub fn derive_result(
    own_goals: i64,
    opponent_goals: i64,
    venue: Venue,
    shootout: Option<&ShootoutInfo>,
) -> Option<GameResult> {
    regulation_result(own_goals, opponent_goals)
        .or_else(|| shootout.map(|tallies| shootout_result(tallies, venue)))
}

/// The requested team's side of a boxscore and the opposing goal count.
pub fn locate_team(
    boxscore: &BoxscoreResponse,
    team_id: u32,
    game_id: GameId,
) -> Result<(Venue, &TeamSkaterStats, i64)> {
    let home = &boxscore.teams.home;
    let away = &boxscore.teams.away;

    if home.team.id == team_id {
        Ok((
            Venue::Home,
            &home.team_stats.team_skater_stats,
            away.team_stats.team_skater_stats.goals,
        ))
    } else if away.team.id == team_id {
        Ok((
            Venue::Away,
            &away.team_stats.team_skater_stats,
            home.team_stats.team_skater_stats.goals,
        ))
    } else {
        warn!(
            "Team {} not in game {} (home {}, away {})",
            team_id, game_id, home.team.id, away.team.id
        );
        Err(IngestError::TeamNotInGame { team_id, game_id })
    }
}

/// Fetch one game and build the team's record. The linescore is only
/// requested when goals are level. Every request waits on `pacer` first.
pub async fn resolve_outcome<S, P>(
    source: &S,
    pacer: &P,
    team_id: u32,
    game_id: GameId,
) -> Result<GameRecord>
where
    S: StatsSource + ?Sized,
    P: Pacer + ?Sized,
{
    pacer.wait().await;
    let boxscore = source.boxscore(game_id).await?;
    let (venue, stats, opponent_goals) = locate_team(&boxscore, team_id, game_id)?;

    let result = match regulation_result(stats.goals, opponent_goals) {
        Some(result) => result,
        None => {
            debug!("Game {} level at {}, checking shootout", game_id, stats.goals);
            pacer.wait().await;
            let linescore = source.linescore(game_id).await?;
            derive_result(stats.goals, opponent_goals, venue, linescore.shootout())
                .ok_or(IngestError::UnresolvedTie { game_id })?
        }
    };

    Ok(GameRecord::from_skater_stats(game_id, venue, result, stats))
}
