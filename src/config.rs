//! Tunable parameters and scenario documents.
//!
//! Everything here is plain serde data with defaults, so a host can keep
//! it in a JSON file and override only what it needs.

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::error::{Error, Result};
use crate::models::{Appliance, HourSet, Preference, Preferences, PriceSeries};

/// Reward-shaping constants for the simulation environment.
///
/// # Ordering
/// The constants are heuristics, but their relative order matters:
///
/// ```text
/// restricted >= unfinished > overuse > late > max single-hour cost
/// ```
///
/// A single-hour cost is at most the largest appliance power, since
/// prices are normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    /// Per remaining hour, charged once at the last hour of the horizon.
    pub unfinished_penalty: f64,
    /// Per "on" action for an appliance that already finished.
    pub overuse_penalty: f64,
    /// Per remaining hour, charged every step past `late_fraction`.
    pub late_penalty: f64,
    /// Fraction of the horizon after which the lateness penalty applies.
    pub late_fraction: f64,
    /// Per "on" action in an hour the appliance may not use.
    pub restricted_penalty: f64,
    /// Per strength point, when running in a soft-avoided hour.
    pub avoid_weight: f64,
    /// Per strength point, bonus when running in a preferred hour.
    pub prefer_weight: f64,
    /// Added to the price span during min-max normalization.
    pub price_epsilon: f64,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            unfinished_penalty: 10.0,
            overuse_penalty: 5.0,
            late_penalty: 2.0,
            late_fraction: 0.75,
            restricted_penalty: 10.0,
            avoid_weight: 0.2,
            prefer_weight: 0.1,
            price_epsilon: 1e-6,
        }
    }
}

impl RewardShaping {
    /// Defaults scaled so the ordering holds for the given appliances.
    ///
    /// Penalties are multiplied by `max(1, largest power)`.
    pub fn calibrated(appliances: &[Appliance]) -> Self {
        let scale = appliances
            .iter()
            .map(|a| a.power)
            .filter(|p| p.is_finite())
            .fold(1.0_f64, f64::max);
        let base = Self::default();
        Self {
            unfinished_penalty: base.unfinished_penalty * scale,
            overuse_penalty: base.overuse_penalty * scale,
            late_penalty: base.late_penalty * scale,
            restricted_penalty: base.restricted_penalty * scale,
            ..base
        }
    }

    /// Checks the penalty ordering against the largest single-hour cost.
    pub fn validate(&self, max_hour_cost: f64) -> Result<()> {
        let values = [
            self.unfinished_penalty,
            self.overuse_penalty,
            self.late_penalty,
            self.restricted_penalty,
            self.avoid_weight,
            self.prefer_weight,
            self.price_epsilon,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config(
                "reward shaping values must be finite and non-negative".into(),
            ));
        }
        if self.price_epsilon <= 0.0 {
            return Err(Error::Config("price_epsilon must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.late_fraction) {
            return Err(Error::Config(format!(
                "late_fraction {} outside [0, 1]",
                self.late_fraction
            )));
        }
        if self.restricted_penalty < self.unfinished_penalty {
            return Err(Error::Config(format!(
                "restricted_penalty ({}) must be >= unfinished_penalty ({})",
                self.restricted_penalty, self.unfinished_penalty
            )));
        }
        if !(self.unfinished_penalty > self.overuse_penalty
            && self.overuse_penalty > self.late_penalty
            && self.late_penalty > max_hour_cost)
        {
            return Err(Error::Config(format!(
                "penalties must satisfy unfinished ({}) > overuse ({}) > late ({}) > max hour cost ({})",
                self.unfinished_penalty, self.overuse_penalty, self.late_penalty, max_hour_cost
            )));
        }
        Ok(())
    }
}

/// Weights of the comfort score.
///
/// Per scheduled hour: `-avoid_factor * strength` in an avoid hour,
/// `+prefer_factor * strength` in a preferred hour, else `neutral_reward`.
/// `completion_factor * strength` is added once when every hour is
/// preferred and none avoided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComfortWeights {
    pub avoid_factor: f64,
    pub prefer_factor: f64,
    pub completion_factor: f64,
    pub neutral_reward: f64,
}

impl Default for ComfortWeights {
    fn default() -> Self {
        Self {
            avoid_factor: 3.0,
            prefer_factor: 4.0,
            completion_factor: 2.0,
            neutral_reward: 0.5,
        }
    }
}

impl ComfortWeights {
    /// Weights must be finite and non-negative, and a neutral hour must
    /// not be worth more than a preferred one.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.avoid_factor,
            self.prefer_factor,
            self.completion_factor,
            self.neutral_reward,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config(
                "comfort weights must be finite and non-negative".into(),
            ));
        }
        if self.neutral_reward > self.prefer_factor {
            return Err(Error::Config(format!(
                "neutral_reward ({}) exceeds prefer_factor ({})",
                self.neutral_reward, self.prefer_factor
            )));
        }
        Ok(())
    }
}

/// Planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Environment shaping. `None` = [`RewardShaping::calibrated`].
    pub shaping: Option<RewardShaping>,
    /// Comfort score weights.
    pub comfort: ComfortWeights,
}

impl PlannerConfig {
    /// Sets the reward shaping.
    pub fn with_shaping(mut self, shaping: RewardShaping) -> Self {
        self.shaping = Some(shaping);
        self
    }

    /// Sets the comfort weights.
    pub fn with_comfort(mut self, comfort: ComfortWeights) -> Self {
        self.comfort = comfort;
        self
    }
}

/// A complete scheduling problem.
///
/// # JSON
/// ```json
/// {
///   "prices": [0.10, 0.50, 0.05, 0.20],
///   "appliances": [{"name": "Washer", "power": 1.0, "duration": 2}],
///   "restricted_hours": [1],
///   "preferences": {"Washer": {"preferred_hours": [0], "strength": 4}}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Hourly prices (defines the horizon).
    pub prices: PriceSeries,
    /// Appliances to schedule.
    pub appliances: Vec<Appliance>,
    /// Globally forbidden hours.
    #[serde(default)]
    pub restricted_hours: HourSet,
    /// Comfort preferences by appliance name.
    #[serde(default)]
    pub preferences: Preferences,
}

impl Scenario {
    /// Creates a scenario without restrictions or preferences.
    pub fn new(prices: PriceSeries, appliances: Vec<Appliance>) -> Self {
        Self {
            prices,
            appliances,
            restricted_hours: HourSet::new(),
            preferences: Preferences::new(),
        }
    }

    /// Sets the restricted hours.
    pub fn with_restricted_hours(mut self, hours: impl IntoIterator<Item = usize>) -> Self {
        self.restricted_hours = hours.into_iter().collect();
        self
    }

    /// Adds a preference for an appliance.
    pub fn with_preference(mut self, appliance: impl Into<String>, preference: Preference) -> Self {
        self.preferences.insert(appliance.into(), preference);
        self
    }

    /// Parses a scenario from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a scenario from any reader (file, socket, buffer).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    /// Serializes the scenario to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Scheduling horizon (number of price slots).
    pub fn horizon(&self) -> usize {
        self.prices.horizon()
    }
}
