use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::DEFAULT_TRIALS;
use crate::error::{LeagueError, Result};
use crate::league::{Division, DivisionId, League, Matchup, Outcome, TeamId, TiebreakMethod};
use crate::scoring::tally_records;
use crate::standings::resolve;
use crate::team::Team;

/// Caller-facing simulation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_trials")]
    pub trials: usize,

    /// Master seed. `None` draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wall-clock budget in milliseconds
    #[serde(default)]
    pub deadline_ms: Option<u64>,

    /// Simulate from the start of this week instead of the league's current week
    #[serde(default)]
    pub as_of_week: Option<u32>,
}

impl SimulationConfig {
    const fn default_trials() -> usize {
        DEFAULT_TRIALS
    }

    /// Parse a configuration object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reproducible configuration.
    pub fn seeded(trials: usize, seed: u64) -> Self {
        SimulationConfig { trials, seed: Some(seed), ..Self::default() }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: Self::default_trials(),
            seed: None,
            deadline_ms: None,
            as_of_week: None,
        }
    }
}

/// Cancellation flag and optional deadline shared with the trial workers.
///
/// Checked before every trial; trials already running are allowed to finish.
#[derive(Clone, Debug, Default)]
pub struct SimulationControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SimulationControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        SimulationControl {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Frozen pre-trial state every trial starts from.
#[derive(Clone, Debug)]
pub struct SeasonSnapshot {
    teams: BTreeMap<TeamId, Team>,
    schedule: Vec<Matchup>,
    divisions: BTreeMap<DivisionId, Division>,
    tiebreak: TiebreakMethod,
    current_week: u32,
}

impl SeasonSnapshot {
    /// Capture a league's regular season.
    ///
    /// Fails with `InsufficientData` if some team's scoring distribution is
    /// not defined yet.
    pub fn new(league: &League) -> Result<Self> {
        league.ready_for_simulation()?;
        Ok(SeasonSnapshot {
            teams: league.teams.clone(),
            schedule: league.regular_season().cloned().collect(),
            divisions: league.divisions.clone(),
            tiebreak: league.tiebreak,
            current_week: league.current_week,
        })
    }

    /// Number of games each trial has to sample.
    pub fn remaining_games(&self) -> usize {
        self.schedule.iter().filter(|m| m.week >= self.current_week).count()
    }

    /// Play out the rest of the regular season once and return the final seeding.
    pub fn run_trial<R: Rng>(&self, rng: &mut R) -> Result<Vec<TeamId>> {
        let mut schedule = self.schedule.clone();
        for game in schedule.iter_mut().filter(|m| m.week >= self.current_week) {
            game.home_score = self.sample_score(game.home, rng)?;
            game.away_score = self.sample_score(game.away, rng)?;
            game.outcome = Outcome::from_scores(game.home_score, game.away_score);
        }

        let mut teams = self.teams.clone();
        tally_records(&mut teams, &schedule);
        resolve(&teams, &schedule, self.tiebreak, &self.divisions)
    }

    fn sample_score<R: Rng>(&self, team: TeamId, rng: &mut R) -> Result<f64> {
        let (mean, std_dev) = self
            .teams
            .get(&team)
            .and_then(Team::scoring)
            .ok_or(LeagueError::InsufficientData { week: self.current_week, team: Some(team) })?;

        let invalid = || LeagueError::InvalidDistribution { team, mean, std_dev };
        // Every completed game had the same score
        if std_dev == 0.0 && mean.is_finite() {
            return Ok(mean);
        }
        let score = rng.sample(Normal::new(mean, std_dev).map_err(|_| invalid())?);
        if score.is_finite() {
            Ok(score)
        } else {
            Err(invalid())
        }
    }
}

/// Standings produced by a simulation run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationRun {
    /// One seeding per completed trial
    pub standings: Vec<Vec<TeamId>>,

    /// Trials asked for; more than `completed()` if the run was stopped early
    pub requested: usize,
}

impl SimulationRun {
    pub fn completed(&self) -> usize {
        self.standings.len()
    }

    pub fn is_partial(&self) -> bool {
        self.completed() < self.requested
    }
}

/// Run `trials` independent trials of the rest of the regular season.
///
/// Per-trial seeds are drawn from `rng` up front, so a given random
/// source always yields the same standings in the same order no matter
/// how the trials are scheduled.
pub fn simulate<R: Rng>(league: &League, trials: usize, rng: &mut R) -> Result<SimulationRun> {
    simulate_with_control(league, trials, rng, &SimulationControl::new())
}

/// `simulate` that stops starting new trials once `control` says so.
pub fn simulate_with_control<R: Rng>(
    league: &League,
    trials: usize,
    rng: &mut R,
    control: &SimulationControl,
) -> Result<SimulationRun> {
    let snapshot = match SeasonSnapshot::new(league) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::debug!("not simulating {}: {err}", league.name);
            return Err(err);
        }
    };

    log::info!(
        "simulating {} trials of {} ({} games remaining)",
        trials,
        league.name,
        snapshot.remaining_games()
    );

    let seeds: Vec<u64> = (0..trials).map(|_| rng.gen::<u64>()).collect();
    let results = seeds
        .into_par_iter()
        .map(|seed| {
            if control.should_stop() {
                return Ok(None);
            }
            let mut trial_rng = ChaCha8Rng::seed_from_u64(seed);
            snapshot.run_trial(&mut trial_rng).map(Some)
        })
        .collect::<Result<Vec<_>>>()?;

    let run = SimulationRun {
        standings: results.into_iter().flatten().collect(),
        requested: trials,
    };
    if run.is_partial() {
        log::warn!(
            "simulation of {} stopped after {} of {} trials",
            league.name,
            run.completed(),
            run.requested
        );
    } else {
        log::info!("finished {} trials of {}", run.completed(), league.name);
    }
    Ok(run)
}

/// Run a simulation as described by `config`.
pub fn run(
    league: &League,
    config: &SimulationConfig,
    control: &SimulationControl,
) -> Result<SimulationRun> {
    match config.as_of_week {
        Some(week) if week != league.current_week => {
            let as_of = league.as_of_week(week);
            run_at_current_week(&as_of, config, control)
        }
        _ => run_at_current_week(league, config, control),
    }
}

/// Run `config` against the league as loaded, ignoring `as_of_week`.
pub(crate) fn run_at_current_week(
    league: &League,
    config: &SimulationConfig,
    control: &SimulationControl,
) -> Result<SimulationRun> {
    let control = match config.deadline_ms {
        Some(ms) => {
            let timed = SimulationControl::with_timeout(Duration::from_millis(ms));
            SimulationControl { cancelled: Arc::clone(&control.cancelled), ..timed }
        }
        None => control.clone(),
    };

    let mut rng = match config.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    simulate_with_control(league, config.trials, &mut rng, &control)
}
