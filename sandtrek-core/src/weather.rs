//! Weather tags, multiplier rules, and per-day conditions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical weather tags. The tables are open: any string tag is accepted
/// and unknown tags fall back to identity multipliers at lookup time.
pub const WEATHER_SUNNY: &str = "Sunny";
pub const WEATHER_HOT: &str = "Hot";
pub const WEATHER_SAND: &str = "Sand";

const fn default_one_f64() -> f64 {
    1.0
}

/// Scaling factors a weather tag applies to the daily base rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    #[serde(default = "default_one_f64")]
    pub travel_mult: f64,
    #[serde(default = "default_one_f64")]
    pub food_mult: f64,
    #[serde(default = "default_one_f64")]
    pub water_mult: f64,
}

impl WeatherEffect {
    /// Identity effect: the day behaves exactly like the base rates.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            travel_mult: 1.0,
            food_mult: 1.0,
            water_mult: 1.0,
        }
    }
}

impl Default for WeatherEffect {
    fn default() -> Self {
        Self::identity()
    }
}

/// Weather tag to multiplier table.
pub type WeatherRules = HashMap<String, WeatherEffect>;

/// The canonical multiplier table for the three standard tags.
#[must_use]
pub fn default_weather_rules() -> WeatherRules {
    HashMap::from([
        (
            WEATHER_SUNNY.to_string(),
            WeatherEffect {
                travel_mult: 1.0,
                food_mult: 1.0,
                water_mult: 1.0,
            },
        ),
        (
            WEATHER_HOT.to_string(),
            WeatherEffect {
                travel_mult: 0.8,
                food_mult: 1.1,
                water_mult: 1.3,
            },
        ),
        (
            WEATHER_SAND.to_string(),
            WeatherEffect {
                travel_mult: 0.5,
                food_mult: 1.2,
                water_mult: 1.5,
            },
        ),
    ])
}

/// One day's forecast entry. Days are numbered from 1. An empty tag is
/// legal and is read as Sunny when rates are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCondition {
    pub day: u32,
    #[serde(default)]
    pub weather: String,
}

impl DayCondition {
    #[must_use]
    pub const fn new(day: u32, weather: String) -> Self {
        Self { day, weather }
    }

    /// Number a list of tags into 1-based day conditions.
    #[must_use]
    pub fn sequence<I>(tags: I) -> Vec<Self>
    where
        I: IntoIterator<Item = String>,
    {
        tags.into_iter()
            .enumerate()
            .map(|(idx, weather)| Self::new(crate::numbers::usize_to_u32(idx) + 1, weather))
            .collect()
    }
}
