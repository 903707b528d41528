use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::league::{Matchup, TeamId, TiebreakMethod};
use crate::team::Team;

/// Everything a tiebreak rule may look at: season totals and the decided
/// games the totals were built from.
#[derive(Clone, Copy)]
pub struct TiebreakContext<'a> {
    pub teams: &'a BTreeMap<TeamId, Team>,
    pub games: &'a [&'a Matchup],
}

/// Head-to-head results of one team against the rest of a tied group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadToHead {
    pub team: TeamId,
    pub wins: f64,
    pub games: u32,
}

impl<'a> TiebreakContext<'a> {
    pub fn new(teams: &'a BTreeMap<TeamId, Team>, games: &'a [&'a Matchup]) -> Self {
        TiebreakContext { teams, games }
    }

    fn points_for(&self, team: TeamId) -> f64 {
        self.teams.get(&team).map_or(0.0, |t| t.points_for)
    }

    fn points_against(&self, team: TeamId) -> f64 {
        self.teams.get(&team).map_or(0.0, |t| t.points_against)
    }

    /// Head-to-head record of every tied team against the others.
    pub fn head_to_head(&self, tied: &[TeamId]) -> Vec<HeadToHead> {
        tied.iter()
            .map(|&team| {
                let mut h2h = HeadToHead { team, wins: 0.0, games: 0 };
                for game in self.games {
                    let Some(opponent) = game.opponent(team) else {
                        continue;
                    };
                    if !tied.contains(&opponent) {
                        continue;
                    }
                    if let Some(credit) = game.credit_for(team) {
                        h2h.wins += credit;
                        h2h.games += 1;
                    }
                }
                h2h
            })
            .collect()
    }

    /// Win percentage in games against the team's own division.
    ///
    /// `None` when the team has no decided divisional games.
    pub fn division_win_percentage(&self, team: TeamId) -> Option<f64> {
        let division = self.teams.get(&team)?.division;
        let (mut wins, mut played) = (0.0, 0u32);
        for game in self.games {
            let Some(opponent) = game.opponent(team) else {
                continue;
            };
            if self.teams.get(&opponent).map(|t| t.division) != Some(division) {
                continue;
            }
            if let Some(credit) = game.credit_for(team) {
                wins += credit;
                played += 1;
            }
        }
        (played > 0).then(|| wins / played as f64)
    }

    /// Winner by head-to-head record, with points-for breaking equal
    /// records. If the tied teams have not all played the same number of
    /// games against each other, head-to-head does not apply and the
    /// highest points-for wins outright.
    pub fn head_to_head_winner(&self, tied: &[TeamId]) -> Option<TeamId> {
        let mut results = self.head_to_head(tied);
        results.sort_by(|a, b| descending(self.points_for(a.team), self.points_for(b.team)));

        let games = results.first()?.games;
        if results.iter().all(|r| r.games == games) {
            results.sort_by(|a, b| descending(a.wins, b.wins));
        }
        results.first().map(|r| r.team)
    }

    /// Full order of the tied teams by repeatedly taking the head-to-head winner.
    pub fn head_to_head_order(&self, tied: &[TeamId]) -> Vec<TeamId> {
        let mut remaining = tied.to_vec();
        let mut ordered = Vec::with_capacity(tied.len());
        while remaining.len() > 1 {
            let Some(winner) = self.head_to_head_winner(&remaining) else {
                break;
            };
            remaining.retain(|&t| t != winner);
            ordered.push(winner);
        }
        ordered.append(&mut remaining);
        ordered
    }

    /// Head-to-head order, then re-ranked by divisional win percentage.
    pub fn division_record_winner(&self, tied: &[TeamId]) -> Option<TeamId> {
        let mut ordered = self.head_to_head_order(tied);
        ordered.sort_by(|&a, &b| {
            descending_defined(self.division_win_percentage(a), self.division_win_percentage(b))
        });
        ordered.first().copied()
    }

    /// Head-to-head order, then re-ranked by points against. More points
    /// allowed ranks higher.
    pub fn points_against_winner(&self, tied: &[TeamId]) -> Option<TeamId> {
        let mut ordered = self.head_to_head_order(tied);
        ordered.sort_by(|&a, &b| descending(self.points_against(a), self.points_against(b)));
        ordered.first().copied()
    }

    /// Team with the most points scored. Earlier teams win exact ties.
    pub fn points_for_winner(&self, tied: &[TeamId]) -> Option<TeamId> {
        let mut ordered = tied.to_vec();
        ordered.sort_by(|&a, &b| descending(self.points_for(a), self.points_for(b)));
        ordered.first().copied()
    }

    /// Pick the single winner of a tie under `method`.
    pub fn winner(&self, method: TiebreakMethod, tied: &[TeamId]) -> Option<TeamId> {
        match method {
            TiebreakMethod::HeadToHead => self.head_to_head_winner(tied),
            TiebreakMethod::DivisionRecord => self.division_record_winner(tied),
            TiebreakMethod::PointsAgainst => self.points_against_winner(tied),
            TiebreakMethod::PointsFor => self.points_for_winner(tied),
        }
    }

    /// Total order of a tied group: extract winners one at a time until a
    /// single team is left, which goes last.
    pub fn order(&self, method: TiebreakMethod, tied: &[TeamId]) -> Vec<TeamId> {
        let mut remaining = tied.to_vec();
        let mut ordered = Vec::with_capacity(tied.len());
        while remaining.len() > 1 {
            let Some(winner) = self.winner(method, &remaining) else {
                break;
            };
            remaining.retain(|&t| t != winner);
            ordered.push(winner);
        }
        ordered.append(&mut remaining);
        ordered
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Descending, with undefined values after every defined one.
fn descending_defined(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => descending(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(rows: &[(TeamId, i64, f64, f64)]) -> BTreeMap<TeamId, Team> {
        rows.iter()
            .map(|&(id, division, pf, pa)| {
                let team = Team {
                    points_for: pf,
                    points_against: pa,
                    ..Team::new(id, format!("T{id}"), division)
                };
                (id, team)
            })
            .collect()
    }

    #[test]
    fn test_head_to_head_single_game_decides() {
        // B has more points but lost the only meeting
        let teams = teams(&[(1, 0, 1000.0, 0.0), (2, 0, 1200.0, 0.0)]);
        let schedule = [Matchup::played(4, 1, 2, 110.0, 100.0)];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        assert_eq!(ctx.head_to_head_winner(&[1, 2]), Some(1));
        assert_eq!(ctx.head_to_head_winner(&[2, 1]), Some(1));
    }

    #[test]
    fn test_head_to_head_unequal_games_falls_back_to_points_for() {
        // A beat B twice, B beat C once; C has the most points
        let teams = teams(&[(1, 0, 900.0, 0.0), (2, 0, 950.0, 0.0), (3, 0, 1000.0, 0.0)]);
        let schedule = [
            Matchup::played(1, 1, 2, 100.0, 90.0),
            Matchup::played(5, 2, 1, 80.0, 90.0),
            Matchup::played(3, 2, 3, 120.0, 90.0),
        ];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        assert_eq!(ctx.head_to_head_winner(&[1, 2, 3]), Some(3));
    }

    #[test]
    fn test_head_to_head_equal_record_uses_points_for() {
        let teams = teams(&[(1, 0, 900.0, 0.0), (2, 0, 950.0, 0.0)]);
        let schedule = [
            Matchup::played(1, 1, 2, 100.0, 90.0),
            Matchup::played(2, 2, 1, 100.0, 90.0),
        ];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        let h2h = ctx.head_to_head(&[1, 2]);
        assert_eq!(h2h[0], HeadToHead { team: 1, wins: 1.0, games: 2 });
        assert_eq!(ctx.head_to_head_winner(&[1, 2]), Some(2));
    }

    #[test]
    fn test_head_to_head_tie_counts_half() {
        let teams = teams(&[(1, 0, 0.0, 0.0), (2, 0, 0.0, 0.0), (3, 0, 0.0, 0.0)]);
        let schedule = [
            Matchup::played(1, 1, 2, 100.0, 100.0),
            Matchup::played(2, 3, 1, 90.0, 100.0),
            Matchup::played(3, 2, 3, 95.0, 100.0),
        ];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        let h2h = ctx.head_to_head(&[1, 2, 3]);
        assert_eq!(h2h[0].wins, 1.5);
        assert_eq!(h2h[1].wins, 0.5);
        assert_eq!(h2h[2].wins, 1.0);
        assert_eq!(ctx.head_to_head_order(&[1, 2, 3]), vec![1, 3, 2]);
    }

    #[test]
    fn test_head_to_head_ignores_games_outside_group() {
        let teams = teams(&[(1, 0, 500.0, 0.0), (2, 0, 600.0, 0.0), (3, 0, 0.0, 0.0)]);
        let schedule = [
            Matchup::played(1, 1, 3, 100.0, 90.0),
            Matchup::played(2, 1, 2, 100.0, 90.0),
        ];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        let h2h = ctx.head_to_head(&[1, 2]);
        assert_eq!(h2h[0], HeadToHead { team: 1, wins: 1.0, games: 1 });
        assert_eq!(h2h[1], HeadToHead { team: 2, wins: 0.0, games: 1 });
    }

    #[test]
    fn test_points_for_returns_highest_scorer() {
        let teams = teams(&[(1, 0, 800.0, 0.0), (2, 0, 950.0, 0.0), (3, 0, 900.0, 0.0)]);
        let ctx = TiebreakContext::new(&teams, &[]);

        assert_eq!(ctx.points_for_winner(&[1, 2, 3]), Some(2));
        assert_eq!(ctx.order(TiebreakMethod::PointsFor, &[1, 2, 3]), vec![2, 3, 1]);
    }

    #[test]
    fn test_points_against_prefers_more_allowed() {
        let teams = teams(&[(1, 0, 900.0, 700.0), (2, 0, 900.0, 850.0)]);
        let schedule = [Matchup::played(1, 1, 2, 120.0, 80.0)];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        assert_eq!(ctx.points_against_winner(&[1, 2]), Some(2));
    }

    #[test]
    fn test_division_record_winner() {
        // 1 and 2 in division 0; 3 and 4 in division 1
        let teams = teams(&[
            (1, 0, 1000.0, 0.0),
            (2, 0, 900.0, 0.0),
            (3, 1, 0.0, 0.0),
            (4, 1, 0.0, 0.0),
        ]);
        let schedule = [
            Matchup::played(1, 1, 2, 100.0, 110.0),
            Matchup::played(2, 2, 1, 100.0, 110.0),
            Matchup::played(3, 2, 3, 100.0, 90.0),
            Matchup::played(4, 1, 4, 100.0, 90.0),
            Matchup::played(5, 3, 4, 100.0, 90.0),
        ];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        assert_eq!(ctx.division_win_percentage(1), Some(0.5));
        assert_eq!(ctx.division_win_percentage(3), Some(1.0));
        // 1 and 2 split head to head and are level in division; points-for orders them
        assert_eq!(ctx.division_record_winner(&[1, 2]), Some(1));
        // 3 is unbeaten in division play
        assert_eq!(ctx.division_record_winner(&[1, 3]), Some(3));
    }

    #[test]
    fn test_division_percentage_undefined_sorts_last() {
        let teams = teams(&[(1, 0, 1000.0, 0.0), (2, 1, 0.0, 0.0), (3, 1, 0.0, 0.0)]);
        let schedule = [Matchup::played(1, 3, 2, 80.0, 100.0)];
        let games: Vec<&Matchup> = schedule.iter().collect();
        let ctx = TiebreakContext::new(&teams, &games);

        assert_eq!(ctx.division_win_percentage(1), None);
        assert_eq!(ctx.division_record_winner(&[1, 3]), Some(3));
    }

    #[test]
    fn test_order_is_permutation() {
        let teams = teams(&[(1, 0, 10.0, 5.0), (2, 0, 30.0, 1.0), (3, 0, 20.0, 9.0)]);
        let ctx = TiebreakContext::new(&teams, &[]);

        for method in [
            TiebreakMethod::HeadToHead,
            TiebreakMethod::PointsFor,
            TiebreakMethod::DivisionRecord,
            TiebreakMethod::PointsAgainst,
        ] {
            let mut ordered = ctx.order(method, &[1, 2, 3]);
            ordered.sort_unstable();
            assert_eq!(ordered, vec![1, 2, 3], "{method:?}");
        }
    }
}
