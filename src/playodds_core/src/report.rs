use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::SeedDistribution;
use crate::error::{LeagueError, Result};
use crate::league::{DivisionId, League, TeamId, TiebreakMethod};
use crate::simulation::{self, SimulationConfig, SimulationControl, SimulationRun};
use crate::team::Team;

/// How far the simulator got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Complete,
    /// Stopped by cancellation or deadline; odds cover the trials that finished
    Partial,
    /// Too early in the season to model scoring
    InsufficientData,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeagueSummary {
    pub name: String,
    pub team_count: usize,
    pub playoff_team_count: usize,
    pub tiebreak: TiebreakMethod,
    pub current_week: u32,
    pub regular_season_length: u32,
    pub divisions: BTreeMap<DivisionId, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamReport {
    pub id: TeamId,
    pub name: String,
    pub owner: String,
    pub logo: String,
    pub division: DivisionId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub expected_wins: f64,

    /// Seed number (1-based) to probability; absent when no odds were computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds: Option<BTreeMap<usize, f64>>,

    /// Probability of a top `playoff_team_count` finish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playoff_odds: Option<f64>,
}

impl TeamReport {
    fn new(team: &Team, odds: Option<&SeedDistribution>, playoff_teams: usize) -> Self {
        let seeds = odds.and_then(|d| d.probabilities(team.id));
        let playoff_odds = odds.and_then(|d| d.playoff_probability(team.id, playoff_teams));
        TeamReport {
            id: team.id,
            name: team.name.clone(),
            owner: team.owner.clone(),
            logo: team.logo.clone(),
            division: team.division,
            wins: team.record.wins,
            losses: team.record.losses,
            ties: team.record.ties,
            points_for: team.points_for,
            points_against: team.points_against,
            mean: team.mean,
            std_dev: team.std_dev,
            expected_wins: team.expected_wins,
            odds: seeds.map(|p| p.into_iter().enumerate().map(|(i, prob)| (i + 1, prob)).collect()),
            playoff_odds,
        }
    }
}

/// Everything the presentation layer shows for one league.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeagueReport {
    pub league: LeagueSummary,
    pub status: SimulationStatus,
    pub trials_requested: usize,
    pub trials_completed: usize,
    pub teams: BTreeMap<TeamId, TeamReport>,
}

impl LeagueReport {
    /// Combine a league with the outcome of simulating it.
    ///
    /// `InsufficientData` becomes a report without odds; any other error
    /// is passed through.
    pub fn new(league: &League, outcome: Result<SimulationRun>) -> Result<Self> {
        let (status, run) = match outcome {
            Ok(run) if run.is_partial() => (SimulationStatus::Partial, run),
            Ok(run) => (SimulationStatus::Complete, run),
            Err(LeagueError::InsufficientData { .. }) => {
                (SimulationStatus::InsufficientData, SimulationRun::default())
            }
            Err(err) => return Err(err),
        };

        let odds = (status != SimulationStatus::InsufficientData)
            .then(|| SeedDistribution::from_standings(&league.team_ids(), &run.standings));

        let teams = league
            .teams
            .values()
            .map(|t| (t.id, TeamReport::new(t, odds.as_ref(), league.playoff_team_count)))
            .collect();

        Ok(LeagueReport {
            league: LeagueSummary {
                name: league.name.clone(),
                team_count: league.team_count,
                playoff_team_count: league.playoff_team_count,
                tiebreak: league.tiebreak,
                current_week: league.current_week,
                regular_season_length: league.regular_season_length,
                divisions: league.divisions.values().map(|d| (d.id, d.name.clone())).collect(),
            },
            status,
            trials_requested: run.requested,
            trials_completed: run.completed(),
            teams,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Simulate `league` under `config` and build its report.
///
/// With `as_of_week` set, both the simulation and the report use the
/// league as it stood at the start of that week.
pub fn simulate_league(
    league: &League,
    config: &SimulationConfig,
    control: &SimulationControl,
) -> Result<LeagueReport> {
    match config.as_of_week {
        Some(week) if week != league.current_week => {
            let as_of = league.as_of_week(week);
            let outcome = simulation::run_at_current_week(&as_of, config, control);
            LeagueReport::new(&as_of, outcome)
        }
        _ => LeagueReport::new(league, simulation::run_at_current_week(league, config, control)),
    }
}

/// Provider JSON in, report JSON out.
pub fn simulate_json(input: &str, config: &SimulationConfig) -> Result<String> {
    let league = League::from_json(input)?;
    simulate_league(&league, config, &SimulationControl::new())?.to_json()
}
