//! Monte Carlo evaluation of a journey under resampled weather.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ProblemConfig;
use crate::env::Environment;
use crate::forecast::WeatherSampler;
use crate::numbers;
use crate::rng::derive_stream_seed;
use crate::solver::{BeamSearchSolver, DEFAULT_BEAM_WIDTH};
use crate::state::TrekState;
use crate::weather::DayCondition;

/// Outcome of a single resampled trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub sample_index: u32,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_cash: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_used: Option<u32>,
}

/// Aggregate over one full run. Averages cover successful trials only and
/// are absent when every trial failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub records: Vec<TrialRecord>,
    pub trials: u32,
    pub successes: u32,
    pub success_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_final_cash: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_days_used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<TrekState>,
}

/// Runs `trials` independent journeys, each against a privately derived
/// config whose day conditions come from one fresh sampler draw.
///
/// The base config is never mutated; every trial builds its own
/// [`Environment`] and shares nothing with its neighbors. Trial seeds are
/// domain-separated from the master seed, so a whole run is reproducible
/// from `(base, sampler, trials, master_seed, beam_width)`.
#[derive(Debug, Clone)]
pub struct MonteCarloDriver<S> {
    base: ProblemConfig,
    sampler: S,
    trials: u32,
    master_seed: u64,
    beam_width: usize,
}

impl<S: WeatherSampler> MonteCarloDriver<S> {
    #[must_use]
    pub const fn new(base: ProblemConfig, sampler: S, trials: u32, master_seed: u64) -> Self {
        Self {
            base,
            sampler,
            trials,
            master_seed,
            beam_width: DEFAULT_BEAM_WIDTH,
        }
    }

    #[must_use]
    pub const fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    #[must_use]
    pub const fn base(&self) -> &ProblemConfig {
        &self.base
    }

    /// Run every trial and aggregate the outcomes.
    ///
    /// The best state is the successful terminal state with the strictly
    /// highest cash; the earliest trial wins ties.
    ///
    /// # Errors
    ///
    /// Fails when the sampler's tables are malformed or a derived config
    /// does not validate. Infeasible trials are recorded, not errors.
    pub fn run(&self) -> Result<MonteCarloSummary> {
        let mut records = Vec::with_capacity(self.trials as usize);
        let mut best: Option<TrekState> = None;
        let mut successes = 0u32;

        for i in 0..self.trials {
            let trial_seed = derive_stream_seed(self.master_seed, &format!("trial/{i}"));
            let tags = self
                .sampler
                .generate(self.base.days, trial_seed)
                .with_context(|| format!("weather sample for trial {i}"))?;
            let trial_cfg = self.base.with_day_conditions(DayCondition::sequence(tags));
            let env = Environment::new(&trial_cfg)
                .with_context(|| format!("derived config for trial {i}"))?;
            let solver = BeamSearchSolver::new(self.beam_width);

            match solver.solve_once(&env, &env.initial_state()) {
                Some(state) => {
                    successes += 1;
                    log::debug!(
                        "trial {i}: reached {} with cash {:.2} in {} days",
                        state.position,
                        state.cash,
                        state.days_used()
                    );
                    records.push(TrialRecord {
                        sample_index: i,
                        success: true,
                        final_cash: Some(state.cash),
                        days_used: Some(state.days_used()),
                    });
                    if best.as_ref().is_none_or(|b| state.cash > b.cash) {
                        best = Some(state);
                    }
                }
                None => {
                    log::debug!("trial {i}: no feasible plan");
                    records.push(TrialRecord {
                        sample_index: i,
                        success: false,
                        final_cash: None,
                        days_used: None,
                    });
                }
            }
        }

        let success_rate = numbers::ratio(successes, self.trials);
        let (avg_final_cash, avg_days_used) = if successes == 0 {
            (None, None)
        } else {
            let n = numbers::u32_to_f64(successes);
            let cash_sum: f64 = records.iter().filter_map(|r| r.final_cash).sum();
            let days_sum: f64 = records
                .iter()
                .filter_map(|r| r.days_used)
                .map(numbers::u32_to_f64)
                .sum();
            (Some(cash_sum / n), Some(days_sum / n))
        };
        log::info!(
            "monte carlo: {successes}/{} trials reached the end ({:.1}%)",
            self.trials,
            success_rate * 100.0
        );

        Ok(MonteCarloSummary {
            records,
            trials: self.trials,
            successes,
            success_rate,
            avg_final_cash,
            avg_days_used,
            best,
        })
    }
}
