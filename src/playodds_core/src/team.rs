use serde::{Deserialize, Serialize};

use crate::league::{DivisionId, TeamId};

/// Win-loss-tie record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32, ties: u32) -> Self {
        Record { wins, losses, ties }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Win percentage counting a tie as half a win.
    ///
    /// Returns `None` for a team that has not played.
    pub fn win_percentage(&self) -> Option<f64> {
        let played = self.games_played();
        if played == 0 {
            None
        } else {
            Some((self.wins as f64 + 0.5 * self.ties as f64) / played as f64)
        }
    }
}

/// Fantasy team with its season-to-date record and scoring model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,

    pub name: String,

    pub owner: String,

    /// Logo reference as handed over by the data provider
    pub logo: String,

    pub division: DivisionId,

    pub record: Record,

    /// Total points scored
    pub points_for: f64,

    /// Total points allowed
    pub points_against: f64,

    /// Mean points per completed game. `None` before the first game.
    pub mean: Option<f64>,

    /// Population standard deviation of points per completed game.
    /// `None` until enough games have been played to trust it.
    pub std_dev: Option<f64>,

    /// Sum of pre-game win probabilities over games played so far
    pub expected_wins: f64,
}

impl Team {
    /// Create a team with no games played.
    pub fn new(id: TeamId, name: impl Into<String>, division: DivisionId) -> Self {
        Team {
            id,
            name: name.into(),
            owner: String::new(),
            logo: String::new(),
            division,
            record: Record::default(),
            points_for: 0.0,
            points_against: 0.0,
            mean: None,
            std_dev: None,
            expected_wins: 0.0,
        }
    }

    /// Mean and standard deviation, when both are defined.
    pub fn scoring(&self) -> Option<(f64, f64)> {
        Some((self.mean?, self.std_dev?))
    }

    /// Clear everything derived from the schedule.
    pub(crate) fn reset_totals(&mut self) {
        self.record = Record::default();
        self.points_for = 0.0;
        self.points_against = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_percentage_counts_half_ties() {
        let record = Record::new(6, 3, 1);
        assert!((record.win_percentage().unwrap() - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_win_percentage_undefined_without_games() {
        assert_eq!(Record::default().win_percentage(), None);
    }

    #[test]
    fn test_scoring_requires_both_moments() {
        let mut team = Team::new(1, "A", 0);
        team.mean = Some(100.0);
        assert_eq!(team.scoring(), None);

        team.std_dev = Some(8.0);
        assert_eq!(team.scoring(), Some((100.0, 8.0)));
    }
}
