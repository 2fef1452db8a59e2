use thiserror::Error;

use crate::game_id::GameId;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Remote endpoint unreachable, non-success status, or a payload we could not decode.
    #[error("Stats source unavailable: {message} (URL: {url})")]
    SourceUnavailable { url: String, message: String },

    /// The boxscore names neither side as the requested team.
    #[error("Team {team_id} not found in game {game_id}")]
    TeamNotInGame { team_id: u32, game_id: GameId },

    /// Goals were level but the linescore carries no shootout tally.
    #[error("Game {game_id} ended level with no shootout data")]
    UnresolvedTie { game_id: GameId },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Invalid team name for table: {0:?}")]
    InvalidTeamName(String),

    #[error("Stored row could not be decoded: {0}")]
    CorruptRow(String),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

impl IngestError {
    pub fn source_unavailable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::InvalidTeamName(_))
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
