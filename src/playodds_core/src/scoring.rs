use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::constants::MIN_COMPLETED_GAMES;
use crate::league::{Matchup, Outcome, TeamId};
use crate::team::Team;

/// Recompute every team's record, point totals and scoring distribution
/// from the games decided before `current_week`.
///
/// The standard deviation stays undefined until a team has played
/// `MIN_COMPLETED_GAMES` games; callers treat that as "not enough data"
/// rather than as a zero spread.
pub fn update_team_stats(
    teams: &mut BTreeMap<TeamId, Team>,
    schedule: &[Matchup],
    current_week: u32,
) {
    let completed: Vec<&Matchup> = schedule
        .iter()
        .filter(|m| m.week < current_week && m.outcome.is_decided())
        .collect();

    tally_records(teams, completed.iter().copied());

    for team in teams.values_mut() {
        let scores: Vec<f64> = completed
            .iter()
            .filter_map(|m| m.scores_for(team.id).map(|(scored, _)| scored))
            .collect();

        team.mean = if scores.is_empty() { None } else { Some(scores.iter().mean()) };
        team.std_dev = if scores.len() < MIN_COMPLETED_GAMES {
            None
        } else {
            Some(scores.iter().population_std_dev())
        };
    }
}

/// Rebuild records and point totals from a set of decided games.
///
/// Undecided games in `games` are skipped. Scoring distributions are left
/// alone, so this is what a simulated season uses once its games are filled in.
pub fn tally_records<'a>(
    teams: &mut BTreeMap<TeamId, Team>,
    games: impl IntoIterator<Item = &'a Matchup>,
) {
    for team in teams.values_mut() {
        team.reset_totals();
    }

    for game in games {
        if !game.outcome.is_decided() {
            continue;
        }
        if let Some(home) = teams.get_mut(&game.home) {
            home.points_for += game.home_score;
            home.points_against += game.away_score;
            match game.outcome {
                Outcome::HomeWin => home.record.wins += 1,
                Outcome::AwayWin => home.record.losses += 1,
                Outcome::Tie => home.record.ties += 1,
                Outcome::Pending => {}
            }
        }
        if let Some(away) = teams.get_mut(&game.away) {
            away.points_for += game.away_score;
            away.points_against += game.home_score;
            match game.outcome {
                Outcome::HomeWin => away.record.losses += 1,
                Outcome::AwayWin => away.record.wins += 1,
                Outcome::Tie => away.record.ties += 1,
                Outcome::Pending => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(ids: &[TeamId]) -> BTreeMap<TeamId, Team> {
        ids.iter().map(|&id| (id, Team::new(id, format!("T{id}"), 0))).collect()
    }

    #[test]
    fn test_three_games_define_std_dev() {
        let mut teams = teams(&[1, 2]);
        let schedule = vec![
            Matchup::played(1, 1, 2, 100.0, 80.0),
            Matchup::played(2, 2, 1, 95.0, 110.0),
            Matchup::played(3, 1, 2, 90.0, 120.0),
        ];

        update_team_stats(&mut teams, &schedule, 4);

        let a = &teams[&1];
        assert!((a.mean.unwrap() - 100.0).abs() < 1e-10);
        let expected = (200.0_f64 / 3.0).sqrt();
        assert!((a.std_dev.unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_two_games_leave_std_dev_undefined() {
        let mut teams = teams(&[1, 2]);
        let schedule = vec![
            Matchup::played(1, 1, 2, 100.0, 80.0),
            Matchup::played(2, 2, 1, 95.0, 110.0),
            Matchup::played(3, 1, 2, 90.0, 120.0),
        ];

        update_team_stats(&mut teams, &schedule, 3);

        let a = &teams[&1];
        assert!((a.mean.unwrap() - 105.0).abs() < 1e-10);
        assert_eq!(a.std_dev, None);
    }

    #[test]
    fn test_no_games_leave_mean_undefined() {
        let mut teams = teams(&[1, 2]);
        update_team_stats(&mut teams, &[Matchup::new(1, 1, 2)], 1);
        assert_eq!(teams[&1].mean, None);
        assert_eq!(teams[&1].record.games_played(), 0);
    }

    #[test]
    fn test_records_and_points() {
        let mut teams = teams(&[1, 2, 3]);
        let schedule = vec![
            Matchup::played(1, 1, 2, 100.0, 80.0),
            Matchup::played(1, 3, 1, 70.0, 70.0),
            Matchup::played(2, 2, 3, 90.0, 91.0),
            Matchup::new(3, 1, 3),
        ];

        update_team_stats(&mut teams, &schedule, 3);

        assert_eq!(teams[&1].record, crate::team::Record::new(1, 0, 1));
        assert_eq!(teams[&2].record, crate::team::Record::new(0, 2, 0));
        assert_eq!(teams[&3].record, crate::team::Record::new(1, 0, 1));
        assert!((teams[&1].points_for - 170.0).abs() < 1e-10);
        assert!((teams[&1].points_against - 150.0).abs() < 1e-10);
        assert!((teams[&2].points_against - 191.0).abs() < 1e-10);
    }

    #[test]
    fn test_pending_games_before_current_week_ignored() {
        let mut teams = teams(&[1, 2]);
        let schedule = vec![Matchup::played(1, 1, 2, 100.0, 80.0), Matchup::new(2, 1, 2)];

        update_team_stats(&mut teams, &schedule, 5);

        assert_eq!(teams[&1].record.games_played(), 1);
        assert_eq!(teams[&2].record.games_played(), 1);
    }

    #[test]
    fn test_tally_keeps_scoring_model() {
        let mut teams = teams(&[1, 2]);
        teams.get_mut(&1).unwrap().mean = Some(123.0);
        let schedule = vec![Matchup::played(1, 1, 2, 100.0, 80.0)];

        tally_records(&mut teams, &schedule);

        assert_eq!(teams[&1].mean, Some(123.0));
        assert_eq!(teams[&1].record.wins, 1);
        assert_eq!(teams[&2].record.losses, 1);
    }
}
