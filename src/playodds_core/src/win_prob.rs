use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;

use crate::league::{Matchup, TeamId};
use crate::team::Team;

/// Calculate the probability of the home team outscoring the away team.
///
/// Each team's score is modelled as an independent normal variable, so
/// the margin is normal with mean `home_mean - away_mean` and variance
/// `home_std² + away_std²`.
///
/// # Returns
/// Probability of a home win (0.0-1.0), or `None` if either team's
/// scoring spread is still undefined.
pub fn calculate_win_prob(home: &Team, away: &Team) -> Option<f64> {
    let (home_mean, home_std) = home.scoring()?;
    let (away_mean, away_std) = away.scoring()?;
    Some(margin_win_prob(home_mean - away_mean, home_std.hypot(away_std)))
}

/// P(margin > 0) for a normally distributed margin.
pub fn margin_win_prob(mean: f64, std_dev: f64) -> f64 {
    match Normal::new(mean, std_dev) {
        Ok(margin) => 1.0 - margin.cdf(0.0),
        // Zero spread: the margin is exactly `mean`, and a certain tie is not a win
        Err(_) if mean > 0.0 => 1.0,
        Err(_) => 0.0,
    }
}

/// Annotate every matchup with the home team's win probability.
pub fn annotate_win_probs(schedule: &mut [Matchup], teams: &BTreeMap<TeamId, Team>) {
    for matchup in schedule.iter_mut() {
        matchup.win_prob = match (teams.get(&matchup.home), teams.get(&matchup.away)) {
            (Some(home), Some(away)) => calculate_win_prob(home, away),
            _ => None,
        };
    }
}

/// Sum each team's pre-game win probabilities over the games played
/// before `current_week`.
///
/// Postponed games and games whose probability is not computable
/// contribute nothing.
pub fn update_expected_wins(
    teams: &mut BTreeMap<TeamId, Team>,
    schedule: &[Matchup],
    current_week: u32,
) {
    for team in teams.values_mut() {
        team.expected_wins = 0.0;
    }

    let played = schedule
        .iter()
        .filter(|m| m.week < current_week && m.outcome.is_decided());
    for matchup in played {
        let Some(p) = matchup.win_prob else {
            continue;
        };
        if let Some(home) = teams.get_mut(&matchup.home) {
            home.expected_wins += p;
        }
        if let Some(away) = teams.get_mut(&matchup.away) {
            away.expected_wins += 1.0 - p;
        }
    }
}
