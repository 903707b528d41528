use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::error::{LeagueError, Result};
use crate::league::{Division, DivisionId, League, Matchup, TeamId, TiebreakMethod};
use crate::team::{Record, Team};
use crate::tiebreak::TiebreakContext;

/// Order every team into playoff seeds.
///
/// Teams are grouped by identical record, groups are ranked by win
/// percentage (teams without a game rank last), ties inside a group are
/// broken with `method`, and finally each division's best team is moved
/// into the top seeds.
///
/// # Arguments
/// * `teams` - Teams with their season totals
/// * `games` - Games the totals were built from; undecided games are ignored
/// * `method` - League tiebreak rule
/// * `divisions` - League divisions; empty for a league without divisions
///
/// When `divisions` is non-empty every team must belong to one of them,
/// otherwise `UnknownDivision` is returned. A league without divisions
/// skips that check and accepts any division id.
///
/// # Returns
/// Team ids, index 0 being the first seed
pub fn resolve<'a>(
    teams: &BTreeMap<TeamId, Team>,
    games: impl IntoIterator<Item = &'a Matchup>,
    method: TiebreakMethod,
    divisions: &BTreeMap<DivisionId, Division>,
) -> Result<Vec<TeamId>> {
    if teams.is_empty() {
        return Err(LeagueError::NoTeams);
    }
    if !divisions.is_empty() {
        if let Some(team) = teams.values().find(|t| !divisions.contains_key(&t.division)) {
            return Err(LeagueError::UnknownDivision { team: team.id, division: team.division });
        }
    }

    let decided: Vec<&Matchup> = games.into_iter().filter(|m| m.outcome.is_decided()).collect();
    let ctx = TiebreakContext::new(teams, &decided);

    let base = base_seeding(&ctx, method);
    if divisions.is_empty() {
        return Ok(base);
    }
    Ok(promote_division_winners(teams, &base))
}

/// Seeding by record and tiebreaks alone.
pub fn base_seeding(ctx: &TiebreakContext<'_>, method: TiebreakMethod) -> Vec<TeamId> {
    let mut groups: Vec<(Record, Vec<TeamId>)> = Vec::new();
    for team in ctx.teams.values() {
        match groups.iter_mut().find(|(record, _)| *record == team.record) {
            Some((_, members)) => members.push(team.id),
            None => groups.push((team.record, vec![team.id])),
        }
    }

    groups.sort_by(|(a, _), (b, _)| match (a.win_percentage(), b.win_percentage()) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    groups
        .into_iter()
        .flat_map(|(_, tied)| {
            if tied.len() > 1 {
                ctx.order(method, &tied)
            } else {
                tied
            }
        })
        .collect()
}

/// Move the first team of each division, in seeding order, into the top
/// slots. Everybody else keeps their relative order behind them.
pub fn promote_division_winners(teams: &BTreeMap<TeamId, Team>, base: &[TeamId]) -> Vec<TeamId> {
    let mut represented: HashSet<DivisionId> = HashSet::new();
    let mut promoted = Vec::new();
    let mut rest = Vec::with_capacity(base.len());

    for &id in base {
        let first_of_division = teams.get(&id).is_some_and(|t| represented.insert(t.division));
        if first_of_division {
            promoted.push(id);
        } else {
            rest.push(id);
        }
    }

    promoted.append(&mut rest);
    promoted
}

impl League {
    /// Standings from the games played before the current week.
    pub fn standings(&self) -> Result<Vec<TeamId>> {
        resolve(&self.teams, self.completed_games(), self.tiebreak, &self.divisions)
    }
}
