use thiserror::Error;

use crate::league::{DivisionId, TeamId};

/// Errors raised while loading, resolving or simulating a league.
#[derive(Debug, Error)]
pub enum LeagueError {
    /// Too few completed games to model scoring. Reported as "no odds yet".
    #[error("insufficient data to simulate as of week {week}{}", team_suffix(.team))]
    InsufficientData { week: u32, team: Option<TeamId> },

    #[error("week {week} matchup references unknown team {team}")]
    UnknownTeam { team: TeamId, week: u32 },

    #[error("team {team} is in unknown division {division}")]
    UnknownDivision { team: TeamId, division: DivisionId },

    #[error("week {week} matchup pits team {team} against itself")]
    SelfMatchup { team: TeamId, week: u32 },

    #[error("cannot resolve standings for a league with no teams")]
    NoTeams,

    #[error("team {team} has an unusable scoring distribution (mean {mean}, std dev {std_dev})")]
    InvalidDistribution { team: TeamId, mean: f64, std_dev: f64 },

    #[error("malformed league input: {0}")]
    Input(#[from] serde_json::Error),
}

impl LeagueError {
    /// Whether the error should abort the computation. Insufficient data
    /// is an expected early-season state, everything else is not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LeagueError::InsufficientData { .. })
    }
}

fn team_suffix(team: &Option<TeamId>) -> String {
    team.map(|t| format!(" (team {t})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, LeagueError>;
