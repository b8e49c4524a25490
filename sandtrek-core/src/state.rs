//! Planner state, actions, and the append-only transition history.

use serde::{Deserialize, Serialize};

use crate::config::BagConfig;
use crate::map::NodeId;
use crate::numbers::usize_to_u32;

/// One day's choice. Moving and trading are structurally exclusive; a
/// trade always happens at the node the day starts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Rest,
    Move {
        to: NodeId,
    },
    Trade {
        buy_food: f64,
        buy_water: f64,
        sell_food: f64,
        sell_water: f64,
    },
}

impl Action {
    /// A stay-and-buy action with no sells.
    #[must_use]
    pub const fn purchase(buy_food: f64, buy_water: f64) -> Self {
        Self::Trade {
            buy_food,
            buy_water,
            sell_food: 0.0,
            sell_water: 0.0,
        }
    }

    #[must_use]
    pub const fn move_to(to: NodeId) -> Self {
        Self::Move { to }
    }

    /// The (buy_food, buy_water, sell_food, sell_water) quantities; zeros
    /// for non-trade actions.
    #[must_use]
    pub const fn trade_quantities(&self) -> (f64, f64, f64, f64) {
        match self {
            Self::Trade {
                buy_food,
                buy_water,
                sell_food,
                sell_water,
            } => (*buy_food, *buy_water, *sell_food, *sell_water),
            Self::Rest | Self::Move { .. } => (0.0, 0.0, 0.0, 0.0),
        }
    }

    #[must_use]
    pub fn move_target(&self) -> Option<&str> {
        match self {
            Self::Move { to } => Some(to.as_str()),
            Self::Rest | Self::Trade { .. } => None,
        }
    }
}

/// One row of the exported journey log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    pub pos: NodeId,
    pub next_pos: NodeId,
    pub move_dist: f64,
    pub buy_food: f64,
    pub buy_water: f64,
    pub sell_food: f64,
    pub sell_water: f64,
    pub cash: f64,
    pub food: f64,
    pub water: f64,
    /// The configured tag for the day, recorded raw (possibly empty).
    pub weather: String,
}

/// A point in the day-indexed search space. States are produced only by
/// the environment's transition function and never mutated afterwards;
/// each successor carries its predecessor's history plus one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrekState {
    pub day: u32,
    pub position: NodeId,
    pub food: f64,
    pub water: f64,
    pub cash: f64,
    pub history: Vec<DayRecord>,
}

impl TrekState {
    /// The day-1 state: empty bag, full purse, no history.
    #[must_use]
    pub const fn initial(position: NodeId, cash: f64) -> Self {
        Self {
            day: 1,
            position,
            food: 0.0,
            water: 0.0,
            cash,
            history: Vec::new(),
        }
    }

    /// Weight currently carried under the given bag limits.
    #[must_use]
    pub fn carried_weight(&self, bag: &BagConfig) -> f64 {
        bag.load_weight(self.food, self.water)
    }

    /// Days consumed so far: one per history record.
    #[must_use]
    pub fn days_used(&self) -> u32 {
        usize_to_u32(self.history.len())
    }
}
