//! In-process stand-ins for the remote API and the request pacer.
//!
//! `StubSource` serves canned payloads and records every call it receives.
//! `RecordingPacer` appends `"wait"` to the same log, so tests can assert
//! how pacing interleaves with remote calls without real delays.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{IngestError, Result};
use crate::game_id::GameId;
use crate::model::{
    BoxscoreResponse, BoxscoreSide, BoxscoreTeams, LinescoreResponse, ScheduleDate,
    ScheduleResponse, ScheduledGame, ShootoutInfo, ShootoutTally, TeamEntry, TeamRef, TeamSkaterStats,
    TeamStats,
};
use crate::pacing::Pacer;
use crate::source::StatsSource;

pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct StubSource {
    teams: Option<Vec<TeamEntry>>,
    schedules: HashMap<u32, ScheduleResponse>,
    boxscores: HashMap<GameId, BoxscoreResponse>,
    linescores: HashMap<GameId, LinescoreResponse>,
    log: CallLog,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teams(mut self, teams: Vec<TeamEntry>) -> Self {
        self.teams = Some(teams);
        self
    }

    pub fn with_schedule(mut self, team_id: u32, game_ids: &[i64]) -> Self {
        self.schedules.insert(team_id, schedule_of(game_ids));
        self
    }

    pub fn with_boxscore(mut self, game_id: GameId, boxscore: BoxscoreResponse) -> Self {
        self.boxscores.insert(game_id, boxscore);
        self
    }

    pub fn with_linescore(mut self, game_id: GameId, linescore: LinescoreResponse) -> Self {
        self.linescores.insert(game_id, linescore);
        self
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    /// Snapshot of the calls received so far.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(call);
        }
    }
}

fn missing(what: String) -> IngestError {
    IngestError::source_unavailable(format!("stub://{what}"), "no canned response")
}

#[async_trait]
impl StatsSource for StubSource {
    async fn teams(&self) -> Result<Vec<TeamEntry>> {
        self.record("teams".to_string());
        self.teams.clone().ok_or_else(|| missing("teams".to_string()))
    }

    async fn schedule(
        &self,
        team_id: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleResponse> {
        self.record(format!("schedule:{team_id}:{start}:{end}"));
        self.schedules
            .get(&team_id)
            .cloned()
            .ok_or_else(|| missing(format!("schedule/{team_id}")))
    }

    async fn boxscore(&self, game_id: GameId) -> Result<BoxscoreResponse> {
        self.record(format!("boxscore:{game_id}"));
        self.boxscores
            .get(&game_id)
            .cloned()
            .ok_or_else(|| missing(format!("boxscore/{game_id}")))
    }

    async fn linescore(&self, game_id: GameId) -> Result<LinescoreResponse> {
        self.record(format!("linescore:{game_id}"));
        self.linescores
            .get(&game_id)
            .cloned()
            .ok_or_else(|| missing(format!("linescore/{game_id}")))
    }
}

/// Pacer that never sleeps and logs each wait.
#[derive(Clone, Default)]
pub struct RecordingPacer {
    log: CallLog,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log into an existing call log, typically a `StubSource`'s.
    pub fn sharing(log: CallLog) -> Self {
        Self { log }
    }

    pub fn waits(&self) -> usize {
        self.log
            .lock()
            .map(|log| log.iter().filter(|call| *call == "wait").count())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn wait(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.push("wait".to_string());
        }
    }
}

pub fn schedule_of(game_ids: &[i64]) -> ScheduleResponse {
    ScheduleResponse {
        dates: game_ids
            .iter()
            .map(|&id| ScheduleDate {
                date: String::new(),
                games: vec![ScheduledGame { game_pk: GameId(id) }],
            })
            .collect(),
    }
}

/// Skater stats with the given goal count and fixed, recognisable other values.
pub fn skater_stats(goals: i64) -> TeamSkaterStats {
    TeamSkaterStats {
        goals,
        pim: 6,
        shots: 30 + goals,
        power_play_percentage: 25.0,
        power_play_goals: 1,
        power_play_opportunities: 4,
        face_off_win_percentage: 51.5,
        blocked: 12,
        takeaways: 7,
        giveaways: 9,
        hits: 20,
    }
}

fn side(team_id: u32, goals: i64) -> BoxscoreSide {
    BoxscoreSide {
        team: TeamRef { id: team_id },
        team_stats: TeamStats {
            team_skater_stats: skater_stats(goals),
        },
    }
}

pub fn boxscore(home_id: u32, home_goals: i64, away_id: u32, away_goals: i64) -> BoxscoreResponse {
    BoxscoreResponse {
        teams: BoxscoreTeams {
            home: side(home_id, home_goals),
            away: side(away_id, away_goals),
        },
    }
}

pub fn linescore_with_shootout(home_scores: u32, away_scores: u32) -> LinescoreResponse {
    LinescoreResponse {
        has_shootout: true,
        shootout_info: Some(ShootoutInfo {
            home: ShootoutTally { scores: home_scores, attempts: 3 },
            away: ShootoutTally { scores: away_scores, attempts: 3 },
        }),
    }
}

pub fn team(name: &str, id: u32) -> TeamEntry {
    TeamEntry {
        name: name.to_string(),
        id,
    }
}
