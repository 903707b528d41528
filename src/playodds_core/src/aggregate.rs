use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::league::TeamId;

/// Per-team counts of how often each seed was reached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeedDistribution {
    counts: BTreeMap<TeamId, Vec<u64>>,
    trials: u64,
}

impl SeedDistribution {
    /// Empty tally for a league of `team_ids.len()` seeds.
    pub fn new(team_ids: &[TeamId]) -> Self {
        let seeds = team_ids.len();
        SeedDistribution {
            counts: team_ids.iter().map(|&id| (id, vec![0; seeds])).collect(),
            trials: 0,
        }
    }

    /// Tally a batch of trial standings.
    pub fn from_standings(team_ids: &[TeamId], standings: &[Vec<TeamId>]) -> Self {
        standings
            .par_iter()
            .fold(
                || SeedDistribution::new(team_ids),
                |mut acc, trial| {
                    acc.record(trial);
                    acc
                },
            )
            .reduce(
                || SeedDistribution::new(team_ids),
                |mut a, b| {
                    a.merge(&b);
                    a
                },
            )
    }

    /// Count one trial's standings.
    pub fn record(&mut self, standings: &[TeamId]) {
        for (seed, team) in standings.iter().enumerate() {
            if let Some(slot) = self.counts.get_mut(team).and_then(|c| c.get_mut(seed)) {
                *slot += 1;
            }
        }
        self.trials += 1;
    }

    /// Fold another tally over the same teams into this one.
    pub fn merge(&mut self, other: &SeedDistribution) {
        for (team, theirs) in &other.counts {
            if let Some(ours) = self.counts.get_mut(team) {
                for (a, b) in ours.iter_mut().zip(theirs) {
                    *a += b;
                }
            }
        }
        self.trials += other.trials;
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn seed_count(&self) -> usize {
        self.counts.values().next().map_or(0, Vec::len)
    }

    /// Probability of `team` finishing at each seed, seed 1 first.
    ///
    /// `None` for an unknown team or an empty tally.
    pub fn probabilities(&self, team: TeamId) -> Option<Vec<f64>> {
        if self.trials == 0 {
            return None;
        }
        let trials = self.trials as f64;
        self.counts
            .get(&team)
            .map(|c| c.iter().map(|&n| n as f64 / trials).collect())
    }

    /// Probabilities for every team.
    pub fn seed_probabilities(&self) -> BTreeMap<TeamId, Vec<f64>> {
        self.counts
            .keys()
            .filter_map(|&team| self.probabilities(team).map(|p| (team, p)))
            .collect()
    }

    /// Probability of `team` finishing in the top `playoff_teams` seeds.
    pub fn playoff_probability(&self, team: TeamId, playoff_teams: usize) -> Option<f64> {
        self.probabilities(team).map(|p| p.iter().take(playoff_teams).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standings() -> Vec<Vec<TeamId>> {
        vec![vec![1, 2, 3], vec![2, 1, 3], vec![1, 3, 2], vec![1, 2, 3]]
    }

    #[test]
    fn test_probabilities() {
        let dist = SeedDistribution::from_standings(&[1, 2, 3], &standings());

        assert_eq!(dist.trials(), 4);
        assert_eq!(dist.probabilities(1), Some(vec![0.75, 0.25, 0.0]));
        assert_eq!(dist.probabilities(2), Some(vec![0.25, 0.5, 0.25]));
        assert_eq!(dist.probabilities(3), Some(vec![0.0, 0.25, 0.75]));
        assert_eq!(dist.probabilities(9), None);
    }

    #[test]
    fn test_rows_and_columns_sum_to_one() {
        let dist = SeedDistribution::from_standings(&[1, 2, 3], &standings());
        let probs = dist.seed_probabilities();

        for row in probs.values() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        for seed in 0..3 {
            let column: f64 = probs.values().map(|row| row[seed]).sum();
            assert!((column - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let all = standings();
        let whole = SeedDistribution::from_standings(&[1, 2, 3], &all);

        let mut first = SeedDistribution::from_standings(&[1, 2, 3], &all[..1]);
        let second = SeedDistribution::from_standings(&[1, 2, 3], &all[1..]);
        first.merge(&second);

        assert_eq!(first, whole);
    }

    #[test]
    fn test_empty_tally_has_no_probabilities() {
        let dist = SeedDistribution::new(&[1, 2]);
        assert_eq!(dist.probabilities(1), None);
        assert!(dist.seed_probabilities().is_empty());
        assert_eq!(dist.seed_count(), 2);
    }

    #[test]
    fn test_playoff_probability() {
        let dist = SeedDistribution::from_standings(&[1, 2, 3], &standings());
        assert_eq!(dist.playoff_probability(2, 2), Some(0.75));
        assert_eq!(dist.playoff_probability(3, 2), Some(0.25));
    }
}
