//! Python bindings for the web front end.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::constants::DEFAULT_TRIALS;
use crate::error::LeagueError;
use crate::league::{League, TeamId};
use crate::report::{simulate_league, LeagueReport};
use crate::simulation::{self, SimulationConfig, SimulationControl};

fn to_py_err(err: LeagueError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Simulate a league given as provider JSON and return the report as JSON.
///
/// `config` is an optional JSON object with `trials`, `seed`,
/// `deadline_ms` and `as_of_week`.
#[pyfunction]
#[pyo3(signature = (input, config = None))]
fn simulate_json(py: Python<'_>, input: &str, config: Option<&str>) -> PyResult<String> {
    let config = match config {
        Some(json) => SimulationConfig::from_json(json).map_err(to_py_err)?,
        None => SimulationConfig::default(),
    };
    py.allow_threads(|| crate::report::simulate_json(input, &config))
        .map_err(to_py_err)
}

/// A loaded league that can be simulated repeatedly.
#[pyclass]
pub struct Simulator {
    league: League,
}

#[pymethods]
impl Simulator {
    #[new]
    pub fn new(input: &str) -> PyResult<Self> {
        let league = League::from_json(input).map_err(to_py_err)?;
        Ok(Simulator { league })
    }

    #[getter]
    pub fn name(&self) -> String {
        self.league.name.clone()
    }

    #[getter]
    pub fn current_week(&self) -> u32 {
        self.league.current_week
    }

    /// Seeding from the games played so far.
    pub fn standings(&self) -> PyResult<Vec<TeamId>> {
        self.league.standings().map_err(to_py_err)
    }

    /// Whether enough games have been played to compute odds.
    pub fn can_simulate(&self) -> bool {
        simulation::SeasonSnapshot::new(&self.league).is_ok()
    }

    /// Run the simulation and return the report as JSON.
    #[pyo3(signature = (trials = DEFAULT_TRIALS, seed = None, deadline_ms = None))]
    pub fn run(
        &self,
        py: Python<'_>,
        trials: usize,
        seed: Option<u64>,
        deadline_ms: Option<u64>,
    ) -> PyResult<String> {
        let config = SimulationConfig { trials, seed, deadline_ms, as_of_week: None };
        py.allow_threads(|| {
            simulate_league(&self.league, &config, &SimulationControl::new())
                .and_then(|r: LeagueReport| r.to_json())
        })
        .map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "Simulator({:?}, {} teams, week {})",
            self.league.name,
            self.league.teams.len(),
            self.league.current_week
        )
    }
}

/// Python module definition
#[pymodule]
fn playodds_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Simulator>()?;
    m.add_function(wrap_pyfunction!(simulate_json, m)?)?;
    m.add("DEFAULT_TRIALS", DEFAULT_TRIALS)?;
    Ok(())
}
