//! Domain records and the payload shapes returned by the stats API.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::game_id::GameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn as_str(self) -> &'static str {
        match self {
            Venue::Home => "home",
            Venue::Away => "away",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Venue::Home),
            "away" => Ok(Venue::Away),
            other => Err(format!("unknown venue '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Loss => "loss",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(GameResult::Win),
            "loss" => Ok(GameResult::Loss),
            other => Err(format!("unknown result '{other}'")),
        }
    }
}

/// One team's statistics for one game, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub season: i32,
    pub game_id: GameId,
    pub venue: Venue,
    pub result: GameResult,
    pub goals: i64,
    pub pim: i64,
    pub shots: i64,
    pub power_play_percentage: f64,
    pub power_play_goals: i64,
    pub power_play_opportunities: i64,
    pub face_off_win_percentage: f64,
    pub blocked: i64,
    pub takeaways: i64,
    pub giveaways: i64,
    pub hits: i64,
}

impl GameRecord {
    pub fn from_skater_stats(
        game_id: GameId,
        venue: Venue,
        result: GameResult,
        stats: &TeamSkaterStats,
    ) -> Self {
        Self {
            season: game_id.season(),
            game_id,
            venue,
            result,
            goals: stats.goals,
            pim: stats.pim,
            shots: stats.shots,
            power_play_percentage: stats.power_play_percentage,
            power_play_goals: stats.power_play_goals,
            power_play_opportunities: stats.power_play_opportunities,
            face_off_win_percentage: stats.face_off_win_percentage,
            blocked: stats.blocked,
            takeaways: stats.takeaways,
            giveaways: stats.giveaways,
            hits: stats.hits,
        }
    }
}

/// A league team as listed by the directory endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    pub id: u32,
}

// ── API payloads ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleResponse {
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleDate {
    pub date: String,
    pub games: Vec<ScheduledGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledGame {
    #[serde(rename = "gamePk")]
    pub game_pk: GameId,
}

impl ScheduleResponse {
    /// All listed game ids in source order.
    pub fn game_ids(&self) -> impl Iterator<Item = GameId> + '_ {
        self.dates
            .iter()
            .flat_map(|date| date.games.iter().map(|game| game.game_pk))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxscoreResponse {
    pub teams: BoxscoreTeams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxscoreTeams {
    pub home: BoxscoreSide,
    pub away: BoxscoreSide,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxscoreSide {
    pub team: TeamRef,
    pub team_stats: TeamStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRef {
    pub id: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_skater_stats: TeamSkaterStats,
}

/// The API reports percentages as strings and some counts as floats.
/// Every stat is required; a partial block is a malformed payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSkaterStats {
    #[serde(deserialize_with = "lenient_i64")]
    pub goals: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub pim: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub shots: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub power_play_percentage: f64,
    #[serde(deserialize_with = "lenient_i64")]
    pub power_play_goals: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub power_play_opportunities: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub face_off_win_percentage: f64,
    #[serde(deserialize_with = "lenient_i64")]
    pub blocked: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub takeaways: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub giveaways: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub hits: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinescoreResponse {
    pub has_shootout: bool,
    pub shootout_info: Option<ShootoutInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShootoutInfo {
    pub home: ShootoutTally,
    pub away: ShootoutTally,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ShootoutTally {
    pub scores: u32,
    pub attempts: u32,
}

impl LinescoreResponse {
    /// Shootout tallies, if a shootout took place.
    pub fn shootout(&self) -> Option<&ShootoutInfo> {
        self.shootout_info.as_ref().filter(|_| self.has_shootout)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Numeric::deserialize(deserializer)? {
        Numeric::Int(v) => Ok(v),
        Numeric::Float(v) if v.fract() == 0.0 => Ok(v as i64),
        Numeric::Float(v) => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {v}"
        ))),
        Numeric::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Numeric::deserialize(deserializer)? {
        Numeric::Int(v) => Ok(v as f64),
        Numeric::Float(v) => Ok(v),
        Numeric::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skater_stats_accept_api_number_shapes() {
        let json = r#"{
            "goals": 3, "pim": 8, "shots": 31,
            "powerPlayPercentage": "33.3", "powerPlayGoals": 1.0,
            "powerPlayOpportunities": 3.0, "faceOffWinPercentage": "52.4",
            "blocked": 14, "takeaways": 6, "giveaways": 9, "hits": 22
        }"#;
        let stats: TeamSkaterStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.goals, 3);
        assert_eq!(stats.power_play_goals, 1);
        assert_eq!(stats.power_play_opportunities, 3);
        assert!((stats.power_play_percentage - 33.3).abs() < 1e-9);
        assert!((stats.face_off_win_percentage - 52.4).abs() < 1e-9);
        assert_eq!(stats.hits, 22);
    }

    #[test]
    fn test_fractional_count_is_rejected() {
        let json = r#"{
            "goals": 2.5, "pim": 8, "shots": 31,
            "powerPlayPercentage": "33.3", "powerPlayGoals": 1,
            "powerPlayOpportunities": 3, "faceOffWinPercentage": "52.4",
            "blocked": 14, "takeaways": 6, "giveaways": 9, "hits": 22
        }"#;
        let err = serde_json::from_str::<TeamSkaterStats>(json).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_missing_skater_stats_are_rejected() {
        assert!(serde_json::from_str::<TeamSkaterStats>("{}").is_err());

        let without_hits = r#"{
            "goals": 3, "pim": 8, "shots": 31,
            "powerPlayPercentage": "33.3", "powerPlayGoals": 1,
            "powerPlayOpportunities": 3, "faceOffWinPercentage": "52.4",
            "blocked": 14, "takeaways": 6, "giveaways": 9
        }"#;
        let err = serde_json::from_str::<TeamSkaterStats>(without_hits).unwrap_err();
        assert!(err.to_string().contains("hits"));
    }

    #[test]
    fn test_boxscore_team_needs_only_an_id() {
        let team: TeamRef =
            serde_json::from_str(r#"{ "id": 16, "name": "Chicago Blackhawks", "link": "/api/v1/teams/16" }"#)
                .unwrap();
        assert_eq!(team.id, 16);
    }

    #[test]
    fn test_schedule_flattens_dates_in_order() {
        let json = r#"{ "dates": [
            { "date": "2016-10-12", "games": [ { "gamePk": 2016020001 } ] },
            { "date": "2016-10-14", "games": [ { "gamePk": 2016020020 } ] }
        ] }"#;
        let schedule: ScheduleResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<GameId> = schedule.game_ids().collect();
        assert_eq!(ids, vec![GameId(2016020001), GameId(2016020020)]);
    }

    #[test]
    fn test_linescore_without_shootout() {
        let linescore: LinescoreResponse = serde_json::from_str(r#"{ "currentPeriod": 4 }"#).unwrap();
        assert!(linescore.shootout().is_none());
    }

    #[test]
    fn test_venue_and_result_parse() {
        assert_eq!("home".parse::<Venue>().unwrap(), Venue::Home);
        assert_eq!("loss".parse::<GameResult>().unwrap(), GameResult::Loss);
        assert!("draw".parse::<GameResult>().is_err());
    }
}
