//! Comfort score: how well a schedule matches user preferences.
//!
//! Independent of cost. Each scheduled hour of an appliance with a
//! preference earns (default weights):
//!
//! | Hour is | Points |
//! |---------|--------|
//! | avoided | `-3 · strength` |
//! | preferred (and not avoided) | `+4 · strength` |
//! | neither | `+0.5` |
//!
//! plus `2 · strength` once when every hour is preferred and none avoided.
//! Per-appliance points are floored at 0. The score is
//! `Σ achieved / Σ achievable · 10`, where an appliance's achievable points
//! are `hours · 4 · strength + 2 · strength`, clamped to `[0, 10]` and
//! rounded to two decimals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ComfortWeights;
use crate::models::{Preference, Preferences, Schedule};

/// Upper bound of the score.
pub const MAX_SCORE: f64 = 10.0;

/// Comfort breakdown for one appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceComfort {
    /// Points earned (floored at 0).
    pub achieved: f64,
    /// Maximum points possible for this many hours.
    pub achievable: f64,
    /// Scheduled hours that fall in avoid hours.
    pub avoided_hours: usize,
    /// Scheduled hours that fall in preferred hours.
    pub preferred_hours: usize,
}

/// Schedule comfort score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortScore {
    /// Normalized score in `[0, 10]`.
    pub score: f64,
    /// Sum of achieved points.
    pub achieved: f64,
    /// Sum of achievable points.
    pub achievable: f64,
    /// Appliances scored (present in both the schedule and the preferences).
    pub by_appliance: BTreeMap<String, ApplianceComfort>,
}

impl ComfortScore {
    /// Scores an appliance → hours map with the default weights.
    pub fn calculate(hours: &BTreeMap<String, Vec<usize>>, preferences: &Preferences) -> Self {
        Self::calculate_with(hours, preferences, &ComfortWeights::default())
    }

    /// Scores a [`Schedule`] with the default weights.
    pub fn of_schedule(schedule: &Schedule, preferences: &Preferences) -> Self {
        Self::calculate(&schedule.to_hour_map(), preferences)
    }

    /// Scores an appliance → hours map with explicit weights.
    pub fn calculate_with(
        hours: &BTreeMap<String, Vec<usize>>,
        preferences: &Preferences,
        weights: &ComfortWeights,
    ) -> Self {
        let by_appliance: BTreeMap<String, ApplianceComfort> = hours
            .iter()
            .filter_map(|(name, hours)| {
                let pref = preferences.get(name)?;
                Some((name.clone(), appliance_comfort(hours, pref, weights)))
            })
            .collect();

        let achieved: f64 = by_appliance.values().map(|c| c.achieved).sum();
        let achievable: f64 = by_appliance.values().map(|c| c.achievable).sum();

        let score = if achievable > 0.0 {
            let raw = (achieved / achievable * MAX_SCORE).clamp(0.0, MAX_SCORE);
            (raw * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            score,
            achieved,
            achievable,
            by_appliance,
        }
    }

    /// The normalized score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Whether the score reaches `min_score`.
    pub fn meets_threshold(&self, min_score: f64) -> bool {
        self.score >= min_score
    }
}

fn appliance_comfort(hours: &[usize], pref: &Preference, weights: &ComfortWeights) -> ApplianceComfort {
    let strength = f64::from(pref.strength);
    let mut points = 0.0;
    let mut avoided = 0;
    let mut preferred = 0;

    for &hour in hours {
        if pref.is_avoided(hour) {
            avoided += 1;
            points -= weights.avoid_factor * strength;
        } else if pref.is_preferred(hour) {
            preferred += 1;
            points += weights.prefer_factor * strength;
        } else {
            points += weights.neutral_reward;
        }
    }

    // Vacuously true for an appliance with no hours
    if avoided == 0 && preferred == hours.len() {
        points += weights.completion_factor * strength;
    }

    ApplianceComfort {
        achieved: points.max(0.0),
        achievable: hours.len() as f64 * weights.prefer_factor * strength
            + weights.completion_factor * strength,
        avoided_hours: avoided,
        preferred_hours: preferred,
    }
}
