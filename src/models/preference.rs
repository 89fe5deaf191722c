//! Comfort preferences.
//!
//! Preferences are soft by default: they shape the comfort score and the
//! simulation reward but never forbid an hour. Setting `hard_avoid` turns
//! the avoid list into a hard constraint for both the optimizer and the
//! environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::HourSet;

/// Preferences keyed by appliance name.
pub type Preferences = BTreeMap<String, Preference>;

/// Strength used when none is given.
pub const DEFAULT_STRENGTH: u8 = 3;

/// Valid strength range (inclusive).
pub const STRENGTH_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// A per-appliance comfort preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    /// Hours the user would rather not have the appliance running.
    #[serde(default)]
    pub avoid_hours: HourSet,
    /// Hours the user would like the appliance to run.
    #[serde(default)]
    pub preferred_hours: HourSet,
    /// How much the preference matters (1-5).
    #[serde(default = "default_strength", alias = "preference_strength")]
    pub strength: u8,
    /// Treat `avoid_hours` as forbidden.
    #[serde(default)]
    pub hard_avoid: bool,
}

fn default_strength() -> u8 {
    DEFAULT_STRENGTH
}

impl Default for Preference {
    fn default() -> Self {
        Self::new(DEFAULT_STRENGTH)
    }
}

impl Preference {
    /// Creates an empty preference with the given strength.
    pub fn new(strength: u8) -> Self {
        Self {
            avoid_hours: HourSet::new(),
            preferred_hours: HourSet::new(),
            strength,
            hard_avoid: false,
        }
    }

    /// Sets the hours to avoid.
    pub fn with_avoid_hours(mut self, hours: impl IntoIterator<Item = usize>) -> Self {
        self.avoid_hours = hours.into_iter().collect();
        self
    }

    /// Sets the preferred hours.
    pub fn with_preferred_hours(mut self, hours: impl IntoIterator<Item = usize>) -> Self {
        self.preferred_hours = hours.into_iter().collect();
        self
    }

    /// Makes the avoid list a hard constraint.
    pub fn hard(mut self) -> Self {
        self.hard_avoid = true;
        self
    }

    #[inline]
    pub fn is_avoided(&self, hour: usize) -> bool {
        self.avoid_hours.contains(hour)
    }

    #[inline]
    pub fn is_preferred(&self, hour: usize) -> bool {
        self.preferred_hours.contains(hour)
    }

    /// Whether this preference forbids `hour` outright.
    pub fn forbids(&self, hour: usize) -> bool {
        self.hard_avoid && self.is_avoided(hour)
    }

    /// Whether `strength` lies in 1-5.
    pub fn has_valid_strength(&self) -> bool {
        STRENGTH_RANGE.contains(&self.strength)
    }
}
