//! Seeded weather sequence samplers.
//!
//! Two interchangeable strategies share the [`WeatherSampler`] contract:
//! independent categorical draws and a first-order Markov chain. Both are
//! pure functions of (day count, seed, parameters); the same inputs always
//! produce the same sequence. Probability tables are `BTreeMap`s so the
//! iteration order behind each draw is part of that contract.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::rng::seeded_rng;
use crate::weather::{WEATHER_HOT, WEATHER_SAND, WEATHER_SUNNY};

/// Probability-table problems caught before any draw happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("weights for {context} sum to zero")]
    ZeroTotal { context: String },
    #[error("invalid weight {weight} for tag '{tag}' in {context}")]
    InvalidWeight {
        context: String,
        tag: String,
        weight: f64,
    },
}

/// A day-indexed weather sequence generator.
pub trait WeatherSampler {
    /// Produce exactly `days` weather tags for the given seed.
    ///
    /// # Errors
    ///
    /// Returns a [`WeatherError`] when a probability table is malformed;
    /// sampling itself never fails.
    fn generate(&self, days: u32, seed: u64) -> Result<Vec<String>, WeatherError>;
}

/// Renormalize a weight table to a probability list summing to 1.0.
fn normalized(
    weights: &BTreeMap<String, f64>,
    context: &str,
) -> Result<Vec<(String, f64)>, WeatherError> {
    let mut total = 0.0;
    for (tag, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(WeatherError::InvalidWeight {
                context: context.to_string(),
                tag: tag.clone(),
                weight: *weight,
            });
        }
        total += *weight;
    }
    if total <= 0.0 {
        return Err(WeatherError::ZeroTotal {
            context: context.to_string(),
        });
    }
    Ok(weights
        .iter()
        .map(|(tag, weight)| (tag.clone(), weight / total))
        .collect())
}

/// Walk the cumulative distribution; float dust lands on the last entry.
fn pick<'a>(entries: &'a [(String, f64)], mut roll: f64) -> &'a str {
    for (tag, weight) in entries {
        if roll < *weight {
            return tag;
        }
        roll -= *weight;
    }
    entries.last().map_or(WEATHER_SUNNY, |(tag, _)| tag.as_str())
}

/// Draws each day independently from one categorical distribution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IidWeatherSampler {
    pub weights: BTreeMap<String, f64>,
}

impl IidWeatherSampler {
    #[must_use]
    pub const fn new(weights: BTreeMap<String, f64>) -> Self {
        Self { weights }
    }
}

impl WeatherSampler for IidWeatherSampler {
    fn generate(&self, days: u32, seed: u64) -> Result<Vec<String>, WeatherError> {
        let entries = normalized(&self.weights, "categorical weights")?;
        let mut rng = seeded_rng(seed);
        let mut sequence = Vec::with_capacity(days as usize);
        for _ in 0..days {
            let roll = rng.gen_range(0.0..1.0);
            sequence.push(pick(&entries, roll).to_string());
        }
        Ok(sequence)
    }
}

/// First-order Markov chain over weather tags.
///
/// Day 1 is pinned to `initial`; each later day is drawn from the
/// transition row of the previous day's tag, falling back to the base
/// table when no row exists. Every row is renormalized immediately before
/// its draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovWeatherSampler {
    pub initial: String,
    pub base: BTreeMap<String, f64>,
    pub transition: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MarkovWeatherSampler {
    #[must_use]
    pub const fn new(
        initial: String,
        base: BTreeMap<String, f64>,
        transition: BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Self {
        Self {
            initial,
            base,
            transition,
        }
    }
}

impl Default for MarkovWeatherSampler {
    /// The canonical desert chain: sunny-leaning base with sticky storms.
    fn default() -> Self {
        let row = |sunny: f64, hot: f64, sand: f64| {
            BTreeMap::from([
                (WEATHER_SUNNY.to_string(), sunny),
                (WEATHER_HOT.to_string(), hot),
                (WEATHER_SAND.to_string(), sand),
            ])
        };
        Self {
            initial: WEATHER_SUNNY.to_string(),
            base: row(0.5, 0.3, 0.2),
            transition: BTreeMap::from([
                (WEATHER_SUNNY.to_string(), row(0.6, 0.25, 0.15)),
                (WEATHER_HOT.to_string(), row(0.4, 0.4, 0.2)),
                (WEATHER_SAND.to_string(), row(0.3, 0.3, 0.4)),
            ]),
        }
    }
}

impl WeatherSampler for MarkovWeatherSampler {
    fn generate(&self, days: u32, seed: u64) -> Result<Vec<String>, WeatherError> {
        let mut sequence = Vec::with_capacity(days as usize);
        if days == 0 {
            return Ok(sequence);
        }
        let mut rng = seeded_rng(seed);
        let mut current = self.initial.clone();
        sequence.push(current.clone());
        for _ in 1..days {
            let (row, context) = match self.transition.get(&current) {
                Some(row) => (row, format!("transition row '{current}'")),
                None => (&self.base, "base table".to_string()),
            };
            let entries = normalized(row, &context)?;
            let roll = rng.gen_range(0.0..1.0);
            current = pick(&entries, roll).to_string();
            sequence.push(current.clone());
        }
        Ok(sequence)
    }
}

/// Named difficulty profiles for the categorical sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageProfile {
    #[serde(rename = "stage3")]
    Three,
    #[serde(rename = "stage4")]
    Four,
    #[serde(rename = "stage6")]
    Six,
}

impl StageProfile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Three => "stage3",
            Self::Four => "stage4",
            Self::Six => "stage6",
        }
    }

    /// Horizon the profile was published with.
    #[must_use]
    pub const fn days(self) -> u32 {
        match self {
            Self::Three => 10,
            Self::Four | Self::Six => 30,
        }
    }

    /// The profile's categorical weights.
    #[must_use]
    pub fn weights(self) -> BTreeMap<String, f64> {
        match self {
            Self::Three => BTreeMap::from([
                (WEATHER_SUNNY.to_string(), 0.5),
                (WEATHER_HOT.to_string(), 0.5),
            ]),
            Self::Four | Self::Six => BTreeMap::from([
                (WEATHER_SAND.to_string(), 0.1),
                (WEATHER_SUNNY.to_string(), 0.45),
                (WEATHER_HOT.to_string(), 0.45),
            ]),
        }
    }

    #[must_use]
    pub fn sampler(self) -> IidWeatherSampler {
        IidWeatherSampler::new(self.weights())
    }
}

impl fmt::Display for StageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageProfile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stage3" => Ok(Self::Three),
            "stage4" => Ok(Self::Four),
            "stage6" => Ok(Self::Six),
            _ => Err(()),
        }
    }
}
