//! Built-in policies.
//!
//! | Policy | Rule |
//! |--------|------|
//! | `AlwaysOn` | every appliance on every hour (the naive baseline) |
//! | `RandomPolicy` | each usable appliance on with probability `p` |
//! | `ThresholdPolicy` | on when the normalized price is at most the threshold, or when waiting longer cannot finish |

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::Policy;
use crate::config::RewardShaping;
use crate::models::PriceSeries;

/// Switches everything on, ignoring the mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOn;

impl Policy for AlwaysOn {
    fn name(&self) -> &str {
        "always-on"
    }

    fn act(&mut self, _observation: &[f64], mask: &[bool]) -> Vec<bool> {
        vec![true; mask.len()]
    }
}

/// Seeded random policy, restricted to usable appliances.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: SmallRng,
    probability: f64,
}

impl RandomPolicy {
    /// Creates a policy switching each usable appliance on with `p = 0.5`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            probability: 0.5,
        }
    }

    /// Sets the on-probability, clamped to `[0, 1]`.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// The on-probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, _observation: &[f64], mask: &[bool]) -> Vec<bool> {
        mask.iter()
            .map(|&usable| usable && self.rng.random_bool(self.probability))
            .collect()
    }
}

/// Price-threshold policy.
///
/// Runs a usable appliance when the current normalized price is at or below
/// `threshold`, or when its remaining duration reaches the hours left in
/// the episode.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    norm_prices: Vec<f64>,
    threshold: f64,
}

impl ThresholdPolicy {
    /// Creates a policy over `prices`, normalized the way the environment
    /// does by default.
    pub fn new(prices: &PriceSeries, threshold: f64) -> Self {
        let epsilon = RewardShaping::default().price_epsilon;
        Self::from_normalized(prices.normalized(epsilon), threshold)
    }

    /// Creates a policy over already-normalized prices.
    pub fn from_normalized(norm_prices: Vec<f64>, threshold: f64) -> Self {
        Self {
            norm_prices,
            threshold,
        }
    }

    /// The price threshold in normalized units.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Policy for ThresholdPolicy {
    fn name(&self) -> &str {
        "threshold"
    }

    fn act(&mut self, observation: &[f64], mask: &[bool]) -> Vec<bool> {
        let hour = observation.first().copied().unwrap_or(0.0) as usize;
        let hours_left = self.norm_prices.len().saturating_sub(hour);
        let cheap = self
            .norm_prices
            .get(hour)
            .is_some_and(|&p| p <= self.threshold);

        mask.iter()
            .enumerate()
            .map(|(i, &usable)| {
                let remaining = observation.get(i + 1).copied().unwrap_or(0.0) as usize;
                usable && (cheap || remaining >= hours_left)
            })
            .collect()
    }
}
