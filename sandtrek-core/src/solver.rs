//! Beam-search planner over the day-indexed state frontier.

use crate::env::Environment;
use crate::state::TrekState;

/// Frontier width used when none is configured.
pub const DEFAULT_BEAM_WIDTH: usize = 30;

/// Linear weights applied by the state score.
///
/// The score is `-1` away from the end node, `0` on it, plus
/// `cash * state.cash + supplies * (food + water)`. The cash term dominates
/// the supply term so the planner liquidates nothing it does not need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub cash: f64,
    pub supplies: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cash: 0.01,
            supplies: 0.005,
        }
    }
}

/// Deterministic beam search: expand every frontier state through the
/// bounded action set, keep the `beam_width` best successors, repeat for
/// the remaining horizon. Incomplete on purpose; pruning may drop the only
/// feasible route.
#[derive(Debug, Clone)]
pub struct BeamSearchSolver {
    beam_width: usize,
    weights: ScoreWeights,
}

impl Default for BeamSearchSolver {
    fn default() -> Self {
        Self::new(DEFAULT_BEAM_WIDTH)
    }
}

impl BeamSearchSolver {
    #[must_use]
    pub fn new(beam_width: usize) -> Self {
        Self {
            beam_width,
            weights: ScoreWeights::default(),
        }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub const fn beam_width(&self) -> usize {
        self.beam_width
    }

    /// Rank a state. The goal indicator compares against the resolved end
    /// id, so a state can sit on an end-kind node under a different id and
    /// still carry the penalty.
    fn score(&self, env: &Environment, state: &TrekState) -> f64 {
        let arrival = if state.position == env.end_node() {
            0.0
        } else {
            -1.0
        };
        arrival
            + self.weights.cash * state.cash
            + self.weights.supplies * (state.food + state.water)
    }

    /// Search from `init` for a state standing on the end node.
    ///
    /// Each iteration scans the frontier first, returning as soon as a
    /// surviving state has reached the end, then expands and prunes. When
    /// the horizon runs out, the top of the last frontier is accepted only
    /// if it reached the end; everything else is `None`.
    #[must_use]
    pub fn solve_once(&self, env: &Environment, init: &TrekState) -> Option<TrekState> {
        let horizon = env.config().days.saturating_add(1).saturating_sub(init.day);
        let mut frontier = vec![(self.score(env, init), init.clone())];
        let mut best = frontier.first().map(|(_, state)| state.clone());

        for _ in 0..horizon {
            let mut pool: Vec<(f64, TrekState)> = Vec::new();
            for (_, state) in &frontier {
                if env.reached_end(state) {
                    return Some(state.clone());
                }
                for action in env.candidate_actions(state) {
                    if let Some(next) = env.step(state, &action) {
                        pool.push((self.score(env, &next), next));
                    }
                }
            }
            if pool.is_empty() {
                break;
            }
            pool.sort_by(|a, b| b.0.total_cmp(&a.0));
            pool.truncate(self.beam_width);
            frontier = pool;
            best = frontier.first().map(|(_, state)| state.clone());
        }

        best.filter(|state| env.reached_end(state))
    }
}
