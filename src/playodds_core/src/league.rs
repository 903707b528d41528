use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::constants::{
    OUTCOME_AWAY_WIN, OUTCOME_HOME_WIN, OUTCOME_PENDING, OUTCOME_TIE, TIEBREAK_DIVISION_RECORD,
    TIEBREAK_HEAD_TO_HEAD, TIEBREAK_POINTS_AGAINST, TIEBREAK_POINTS_FOR,
};
use crate::error::{LeagueError, Result};
use crate::scoring::update_team_stats;
use crate::team::Team;
use crate::win_prob::{annotate_win_probs, update_expected_wins};

/// Provider team identifier.
pub type TeamId = i64;

/// Provider division identifier.
pub type DivisionId = i64;

/// Result of a single game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    HomeWin,
    AwayWin,
    Tie,
}

impl Outcome {
    /// Decode a provider outcome code. Unknown codes read as pending.
    pub fn from_code(code: u8) -> Self {
        match code {
            OUTCOME_HOME_WIN => Outcome::HomeWin,
            OUTCOME_AWAY_WIN => Outcome::AwayWin,
            OUTCOME_TIE => Outcome::Tie,
            OUTCOME_PENDING => Outcome::Pending,
            other => {
                log::debug!("unknown outcome code {other}, treating game as pending");
                Outcome::Pending
            }
        }
    }

    /// Outcome implied by a pair of final scores.
    pub fn from_scores(home_score: f64, away_score: f64) -> Self {
        if home_score > away_score {
            Outcome::HomeWin
        } else if away_score > home_score {
            Outcome::AwayWin
        } else {
            Outcome::Tie
        }
    }

    pub fn is_decided(&self) -> bool {
        *self != Outcome::Pending
    }
}

/// Rule used to order teams with identical records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakMethod {
    HeadToHead,
    #[default]
    PointsFor,
    DivisionRecord,
    PointsAgainst,
}

impl TiebreakMethod {
    /// Decode a provider tiebreak code, `None` if the code is not recognised.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            TIEBREAK_HEAD_TO_HEAD => Some(TiebreakMethod::HeadToHead),
            TIEBREAK_POINTS_FOR => Some(TiebreakMethod::PointsFor),
            TIEBREAK_DIVISION_RECORD => Some(TiebreakMethod::DivisionRecord),
            TIEBREAK_POINTS_AGAINST => Some(TiebreakMethod::PointsAgainst),
            _ => None,
        }
    }

    /// Decode a provider tiebreak code, falling back to points-for.
    pub fn from_code_or_default(code: i32) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            log::warn!("unrecognised tiebreak code {code}, falling back to points-for");
            TiebreakMethod::PointsFor
        })
    }
}

/// One scheduled game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: f64,
    pub away_score: f64,
    pub outcome: Outcome,

    /// Probability the home team wins. `None` until both teams have a
    /// defined scoring spread.
    pub win_prob: Option<f64>,
}

impl Matchup {
    pub fn new(week: u32, home: TeamId, away: TeamId) -> Self {
        Matchup {
            week,
            home,
            away,
            home_score: 0.0,
            away_score: 0.0,
            outcome: Outcome::Pending,
            win_prob: None,
        }
    }

    /// Create a decided game with the outcome derived from the scores.
    pub fn played(week: u32, home: TeamId, away: TeamId, home_score: f64, away_score: f64) -> Self {
        Matchup {
            home_score,
            away_score,
            outcome: Outcome::from_scores(home_score, away_score),
            ..Matchup::new(week, home, away)
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }

    /// The other team in the game, if `team` plays in it.
    pub fn opponent(&self, team: TeamId) -> Option<TeamId> {
        if self.home == team {
            Some(self.away)
        } else if self.away == team {
            Some(self.home)
        } else {
            None
        }
    }

    /// Win credit earned by `team`: 1 for a win, 0.5 for a tie, 0 for a loss.
    ///
    /// `None` if the team is not in the game or the game is undecided.
    pub fn credit_for(&self, team: TeamId) -> Option<f64> {
        if !self.involves(team) {
            return None;
        }
        let home = self.home == team;
        match self.outcome {
            Outcome::Pending => None,
            Outcome::Tie => Some(0.5),
            Outcome::HomeWin => Some(if home { 1.0 } else { 0.0 }),
            Outcome::AwayWin => Some(if home { 0.0 } else { 1.0 }),
        }
    }

    /// (points scored, points allowed) for `team`, if it plays in the game.
    pub fn scores_for(&self, team: TeamId) -> Option<(f64, f64)> {
        if self.home == team {
            Some((self.home_score, self.away_score))
        } else if self.away == team {
            Some((self.away_score, self.home_score))
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,

    /// Member team ids in ascending order
    pub members: Vec<TeamId>,
}

/// A league's settings, teams and full schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub team_count: usize,
    pub playoff_team_count: usize,
    pub tiebreak: TiebreakMethod,

    /// First week whose games are not yet counted
    pub current_week: u32,

    /// Number of regular-season weeks
    pub regular_season_length: u32,

    pub schedule: Vec<Matchup>,
    pub divisions: BTreeMap<DivisionId, Division>,
    pub teams: BTreeMap<TeamId, Team>,
}

impl League {
    /// Assemble a league, validate it and compute its team statistics and
    /// matchup probabilities.
    pub fn new(
        name: impl Into<String>,
        tiebreak: TiebreakMethod,
        current_week: u32,
        regular_season_length: u32,
        teams: Vec<Team>,
        division_names: BTreeMap<DivisionId, String>,
        schedule: Vec<Matchup>,
    ) -> Result<Self> {
        let teams: BTreeMap<TeamId, Team> = teams.into_iter().map(|t| (t.id, t)).collect();

        let mut divisions: BTreeMap<DivisionId, Division> = division_names
            .into_iter()
            .map(|(id, name)| (id, Division { id, name, members: Vec::new() }))
            .collect();
        if !divisions.is_empty() {
            for team in teams.values() {
                let division = divisions.get_mut(&team.division).ok_or(
                    LeagueError::UnknownDivision { team: team.id, division: team.division },
                )?;
                division.members.push(team.id);
            }
        }

        let mut league = League {
            name: name.into(),
            team_count: teams.len(),
            playoff_team_count: 0,
            tiebreak,
            current_week,
            regular_season_length,
            schedule,
            divisions,
            teams,
        };
        league.validate()?;
        league.refresh();
        Ok(league)
    }

    /// Parse the data provider's JSON document into a league.
    pub fn from_json(json: &str) -> Result<Self> {
        let input: LeagueInput = serde_json::from_str(json)?;
        input.into_league()
    }

    /// Check that every matchup names two distinct known teams.
    pub fn validate(&self) -> Result<()> {
        for matchup in &self.schedule {
            for team in [matchup.home, matchup.away] {
                if !self.teams.contains_key(&team) {
                    return Err(LeagueError::UnknownTeam { team, week: matchup.week });
                }
            }
            if matchup.home == matchup.away {
                return Err(LeagueError::SelfMatchup { team: matchup.home, week: matchup.week });
            }
        }
        Ok(())
    }

    /// Recompute team statistics, matchup probabilities and expected wins
    /// from the games played before the current week.
    pub fn refresh(&mut self) {
        update_team_stats(&mut self.teams, &self.schedule, self.current_week);
        annotate_win_probs(&mut self.schedule, &self.teams);
        update_expected_wins(&mut self.teams, &self.schedule, self.current_week);
    }

    /// Copy of the league as it stood at the start of `week`.
    pub fn as_of_week(&self, week: u32) -> Self {
        let mut league = self.clone();
        league.current_week = week;
        league.refresh();
        league
    }

    /// Games counted towards the season so far.
    pub fn completed_games(&self) -> impl Iterator<Item = &Matchup> {
        let week = self.current_week;
        self.schedule
            .iter()
            .filter(move |m| m.week < week && m.outcome.is_decided())
    }

    /// Regular-season games, played or not.
    pub fn regular_season(&self) -> impl Iterator<Item = &Matchup> {
        let length = self.regular_season_length;
        self.schedule.iter().filter(move |m| m.week <= length)
    }

    /// Fail with `InsufficientData` unless every team has a usable
    /// scoring distribution.
    pub fn ready_for_simulation(&self) -> Result<()> {
        if self.current_week < crate::constants::MIN_SIMULATION_WEEK {
            return Err(LeagueError::InsufficientData { week: self.current_week, team: None });
        }
        match self.teams.values().find(|t| t.scoring().is_none()) {
            Some(team) => Err(LeagueError::InsufficientData {
                week: self.current_week,
                team: Some(team.id),
            }),
            None => Ok(()),
        }
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.keys().copied().collect()
    }
}

/// League settings as delivered by the data provider.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeagueInfoInput {
    pub name: String,
    pub team_count: usize,
    pub playoff_team_count: usize,
    pub tiebreak: i32,
    pub regular_season_length: u32,
    pub current_week: u32,
    pub divisions: BTreeMap<DivisionId, String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamInput {
    pub name: String,
    pub owner: String,
    pub logo: String,
    pub division: DivisionId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MatchupInput {
    pub week: u32,
    pub home_id: TeamId,
    pub away_id: TeamId,
    #[serde(default)]
    pub home_score: f64,
    #[serde(default)]
    pub away_score: f64,
    #[serde(default)]
    pub outcome: u8,
}

/// Document produced by the data-fetch collaborator.
#[derive(Clone, Debug, Deserialize)]
pub struct LeagueInput {
    pub league: LeagueInfoInput,
    pub teams: BTreeMap<TeamId, TeamInput>,
    #[serde(default)]
    pub schedule: Vec<MatchupInput>,
}

impl LeagueInput {
    pub fn into_league(self) -> Result<League> {
        let info = self.league;
        let tiebreak = TiebreakMethod::from_code_or_default(info.tiebreak);

        let teams = self
            .teams
            .into_iter()
            .map(|(id, t)| Team {
                owner: t.owner,
                logo: t.logo,
                ..Team::new(id, t.name, t.division)
            })
            .collect::<Vec<_>>();
        let known: HashSet<TeamId> = teams.iter().map(|t| t.id).collect();

        let mut schedule = Vec::with_capacity(self.schedule.len());
        for m in self.schedule {
            // Byes and unfilled playoff slots carry negative ids
            if m.home_id < 0 || m.away_id < 0 {
                log::debug!("dropping placeholder matchup in week {}", m.week);
                continue;
            }
            for team in [m.home_id, m.away_id] {
                if !known.contains(&team) {
                    return Err(LeagueError::UnknownTeam { team, week: m.week });
                }
            }
            schedule.push(Matchup {
                home_score: m.home_score,
                away_score: m.away_score,
                outcome: Outcome::from_code(m.outcome),
                ..Matchup::new(m.week, m.home_id, m.away_id)
            });
        }

        let mut league = League::new(
            info.name,
            tiebreak,
            info.current_week,
            info.regular_season_length,
            teams,
            info.divisions,
            schedule,
        )?;
        if info.team_count != 0 && info.team_count != league.teams.len() {
            log::warn!(
                "league reports {} teams but {} were supplied",
                info.team_count,
                league.teams.len()
            );
        }
        league.playoff_team_count = info.playoff_team_count;
        Ok(league)
    }
}
