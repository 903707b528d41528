//! Playodds Core - fantasy league playoff odds.
//!
//! Models each team's weekly scoring as a normal distribution, plays out
//! the rest of the regular season many times over, and reports how often
//! each team lands at each playoff seed. Seeding follows the league's
//! tiebreak rule and promotes division winners to the top seeds.
//!
//! Python bindings are available with the `python` feature.

pub mod aggregate;
pub mod constants;
pub mod error;
pub mod league;
pub mod report;
pub mod scoring;
pub mod simulation;
pub mod standings;
pub mod team;
pub mod tiebreak;
pub mod win_prob;

#[cfg(feature = "python")]
mod python;

pub use aggregate::SeedDistribution;
pub use constants::{DEFAULT_TRIALS, MIN_COMPLETED_GAMES, MIN_SIMULATION_WEEK};
pub use error::{LeagueError, Result};
pub use league::{
    Division, DivisionId, League, LeagueInput, Matchup, Outcome, TeamId, TiebreakMethod,
};
pub use report::{simulate_json, simulate_league, LeagueReport, SimulationStatus, TeamReport};
pub use simulation::{
    simulate, simulate_with_control, SeasonSnapshot, SimulationConfig, SimulationControl,
    SimulationRun,
};
pub use standings::resolve;
pub use team::{Record, Team};
pub use win_prob::calculate_win_prob;
