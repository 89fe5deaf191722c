//! Hour sets, hour ranges and per-appliance availability.
//!
//! # Time Model
//! Hours are slot indices `0..H` into the price series. A slot covers one
//! hour of wall-clock time; what hour 0 means is up to the caller.
//!
//! # Precedence
//! Blocked hours override allowed hours. An hour is available iff:
//! - it lies inside the horizon, AND
//! - it is in `allowed` (or no `allowed` set is defined), AND
//! - it is NOT in `blocked`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{Appliance, Preference};

/// An ordered set of hour indices.
///
/// Used for global restricted hours, per-appliance allowed hours and
/// preference hour lists. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourSet(BTreeSet<usize>);

impl HourSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the set contains `hour`.
    #[inline]
    pub fn contains(&self, hour: usize) -> bool {
        self.0.contains(&hour)
    }

    /// Adds an hour.
    pub fn insert(&mut self, hour: usize) -> bool {
        self.0.insert(hour)
    }

    /// Number of hours in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hours in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Hours that fall outside `0..horizon`.
    pub fn out_of_range(&self, horizon: usize) -> Vec<usize> {
        self.0.range(horizon..).copied().collect()
    }

    /// Union of two sets.
    pub fn union(&self, other: &HourSet) -> HourSet {
        HourSet(self.0.union(&other.0).copied().collect())
    }
}

impl FromIterator<usize> for HourSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        HourSet(iter.into_iter().collect())
    }
}

impl From<Vec<usize>> for HourSet {
    fn from(hours: Vec<usize>) -> Self {
        hours.into_iter().collect()
    }
}

impl<const N: usize> From<[usize; N]> for HourSet {
    fn from(hours: [usize; N]) -> Self {
        hours.into_iter().collect()
    }
}

/// A half-open hour interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    /// First hour (inclusive).
    pub start: usize,
    /// End hour (exclusive).
    pub end: usize,
}

impl HourRange {
    /// Creates a new range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of hours covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no hours.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `hour` falls within this range.
    #[inline]
    pub fn contains(&self, hour: usize) -> bool {
        hour >= self.start && hour < self.end
    }

    /// Whether two ranges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Hours covered, ascending.
    pub fn hours(&self) -> impl Iterator<Item = usize> {
        self.start..self.end
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:00\u{2013}{}:00", self.start, self.end)
    }
}

/// Merges hours into maximal runs of consecutive hours.
///
/// Input order and duplicates do not matter; the result is ascending.
pub fn merge_ranges(hours: &[usize]) -> Vec<HourRange> {
    let sorted: BTreeSet<usize> = hours.iter().copied().collect();
    let mut ranges: Vec<HourRange> = Vec::new();

    for hour in sorted {
        match ranges.last_mut() {
            Some(last) if last.end == hour => last.end = hour + 1,
            _ => ranges.push(HourRange::new(hour, hour + 1)),
        }
    }

    ranges
}

/// Hours an appliance may run in, within a fixed horizon.
///
/// Combines the appliance's own allowed hours with blocked hours coming
/// from global restrictions and hard-avoid preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    horizon: usize,
    allowed: Option<HourSet>,
    blocked: HourSet,
}

impl Availability {
    /// Every hour of the horizon is available.
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            allowed: None,
            blocked: HourSet::new(),
        }
    }

    /// Restricts availability to the given hours.
    pub fn with_allowed(mut self, allowed: &HourSet) -> Self {
        self.allowed = Some(allowed.clone());
        self
    }

    /// Blocks the given hours (adds to any already blocked).
    pub fn with_blocked(mut self, blocked: &HourSet) -> Self {
        self.blocked = self.blocked.union(blocked);
        self
    }

    /// Availability for one appliance under global restrictions and its
    /// (optional) preference.
    pub fn for_appliance(
        appliance: &Appliance,
        horizon: usize,
        restricted: &HourSet,
        preference: Option<&Preference>,
    ) -> Self {
        let mut availability = Self::new(horizon).with_blocked(restricted);
        if let Some(allowed) = &appliance.allowed_hours {
            availability = availability.with_allowed(allowed);
        }
        if let Some(pref) = preference.filter(|p| p.hard_avoid) {
            availability = availability.with_blocked(&pref.avoid_hours);
        }
        availability
    }

    /// Scheduling horizon this availability was built for.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Whether the appliance may run during `hour`.
    pub fn is_available(&self, hour: usize) -> bool {
        if hour >= self.horizon || self.blocked.contains(hour) {
            return false;
        }
        self.allowed.as_ref().map_or(true, |a| a.contains(hour))
    }

    /// All available hours, ascending.
    pub fn available_hours(&self) -> Vec<usize> {
        (0..self.horizon).filter(|&h| self.is_available(h)).collect()
    }

    /// Number of available hours.
    pub fn available_count(&self) -> usize {
        (0..self.horizon).filter(|&h| self.is_available(h)).count()
    }
}
