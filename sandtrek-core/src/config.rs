//! Problem configuration: limits, base rates, forecast, and map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map::{MapError, MapGraph};
use crate::weather::{DayCondition, WeatherRules, default_weather_rules};

const fn default_travel_base() -> f64 {
    12.0
}

const fn default_food_base() -> f64 {
    2.0
}

const fn default_water_base() -> f64 {
    3.0
}

/// Shape problems detected eagerly at construction time. The engine never
/// recovers from these; the run is over before it starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("configuration JSON is invalid: {0}")]
    Parse(String),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("horizon is zero days")]
    ZeroHorizon,
    #[error("{actual} day conditions cover a {expected}-day horizon")]
    DayConditionShortfall { expected: u32, actual: usize },
}

/// Carry limits and per-unit weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BagConfig {
    pub max_weight: f64,
    pub food_unit_weight: f64,
    pub water_unit_weight: f64,
}

impl BagConfig {
    /// Total carried weight for the given quantities.
    #[must_use]
    pub fn load_weight(&self, food: f64, water: f64) -> f64 {
        food * self.food_unit_weight + water * self.water_unit_weight
    }
}

impl Default for BagConfig {
    /// The published parameter-sheet values.
    fn default() -> Self {
        Self {
            max_weight: 1200.0,
            food_unit_weight: 3.0,
            water_unit_weight: 5.0,
        }
    }
}

/// Starting funds and the per-day yield of the excluded profit model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicConfig {
    pub initial_cash: f64,
    #[serde(default)]
    pub base_profit: f64,
}

impl Default for EconomicConfig {
    /// The published parameter-sheet values.
    fn default() -> Self {
        Self {
            initial_cash: 10000.0,
            base_profit: 1000.0,
        }
    }
}

/// Everything one planning run needs. Immutable for the duration of a
/// solve; Monte Carlo trials derive per-trial values instead of mutating a
/// shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub days: u32,
    pub bag: BagConfig,
    pub economy: EconomicConfig,
    #[serde(default)]
    pub day_conditions: Vec<DayCondition>,
    pub map: MapGraph,
    #[serde(default = "default_weather_rules")]
    pub weather_rules: WeatherRules,
    #[serde(default = "default_travel_base")]
    pub travel_base: f64,
    #[serde(default = "default_food_base")]
    pub food_base: f64,
    #[serde(default = "default_water_base")]
    pub water_base: f64,
}

impl ProblemConfig {
    /// Parse a configuration from JSON, rebuild the derived adjacency
    /// table, and validate the shape.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the JSON is malformed or any shape
    /// check of [`ProblemConfig::validate`] fails.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.map.rebuild()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural invariants the engine assumes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero horizon, non-positive bag
    /// limits or base rates, or a forecast shorter than the horizon. Extra
    /// day conditions beyond the horizon are ignored.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        for (field, value) in [
            ("bag.max_weight", self.bag.max_weight),
            ("bag.food_unit_weight", self.bag.food_unit_weight),
            ("bag.water_unit_weight", self.bag.water_unit_weight),
            ("travel_base", self.travel_base),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [("food_base", self.food_base), ("water_base", self.water_base)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.day_conditions.len() < self.days as usize {
            return Err(ConfigError::DayConditionShortfall {
                expected: self.days,
                actual: self.day_conditions.len(),
            });
        }
        Ok(())
    }

    /// Derive a trial-local configuration carrying the given forecast.
    /// The receiver is left untouched; Monte Carlo trials never share a
    /// mutated config.
    #[must_use]
    pub fn with_day_conditions(&self, day_conditions: Vec<DayCondition>) -> Self {
        Self {
            day_conditions,
            ..self.clone()
        }
    }

    /// The weather tag configured for a 0-based day index, if any.
    #[must_use]
    pub fn weather_on(&self, day_idx: usize) -> Option<&str> {
        self.day_conditions
            .get(day_idx)
            .map(|condition| condition.weather.as_str())
    }
}
