//! Sandtrek Planning Engine
//!
//! Platform-agnostic core logic for the Sandtrek desert-journey planner.
//! This crate models the map and economy, samples daily weather, searches
//! for day-by-day plans, and evaluates them statistically, all without UI
//! or platform-specific dependencies.

pub mod config;
pub mod env;
pub mod forecast;
pub mod map;
pub mod monte_carlo;
pub mod numbers;
pub mod rng;
pub mod solver;
pub mod state;
pub mod weather;

// Re-export commonly used types
pub use config::{BagConfig, ConfigError, EconomicConfig, ProblemConfig};
pub use env::{ActionSet, Environment};
pub use forecast::{
    IidWeatherSampler, MarkovWeatherSampler, StageProfile, WeatherError, WeatherSampler,
};
pub use map::{MapEdge, MapError, MapGraph, MapNode, NodeId, NodeKind, SupplyPoint};
pub use monte_carlo::{MonteCarloDriver, MonteCarloSummary, TrialRecord};
pub use solver::{BeamSearchSolver, DEFAULT_BEAM_WIDTH, ScoreWeights};
pub use state::{Action, DayRecord, TrekState};
pub use weather::{DayCondition, WeatherEffect, WeatherRules, default_weather_rules};

/// Bind a known weather sequence into `cfg` and plan once against it.
///
/// Convenience for callers holding a forecast rather than a sampler; the
/// Monte Carlo driver goes through the same derivation per trial.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the bound configuration fails validation.
pub fn solve_with_forecast(
    cfg: &ProblemConfig,
    tags: Vec<String>,
    beam_width: usize,
) -> Result<Option<TrekState>, ConfigError> {
    let bound = cfg.with_day_conditions(DayCondition::sequence(tags));
    let env = Environment::new(&bound)?;
    let solver = BeamSearchSolver::new(beam_width);
    Ok(solver.solve_once(&env, &env.initial_state()))
}
