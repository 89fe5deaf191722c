//! Greedy per-appliance scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the problem and compute each appliance's usable hours
//!    (allowed, minus restricted, minus hard-avoided).
//! 2. For each appliance independently pick `duration` hours:
//!    - `EarliestStart`: the first usable hours in time order.
//!    - `CheapestHours`: the cheapest usable hours, ties to the earlier hour.
//! 3. Cost the result with raw prices.
//!
//! Appliances share no capacity, so `CheapestHours` reaches the same cost as
//! the exact optimizer. `EarliestStart` is the "run it now" baseline that
//! savings are measured against.
//!
//! # Complexity
//! O(n * H log H) where n=appliances, H=horizon.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::models::{Appliance, Availability, HourSet, Preferences, PriceSeries, Schedule};
use crate::validation::{check_feasibility, check_structure};

/// Hour selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GreedyMode {
    /// Run as soon as possible.
    #[default]
    EarliestStart,
    /// Run in the cheapest usable hours.
    CheapestHours,
}

/// Greedy appliance scheduler.
///
/// # Example
///
/// ```
/// use u_energy::models::{Appliance, PriceSeries};
/// use u_energy::scheduler::{GreedyMode, GreedyScheduler};
///
/// let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
/// let appliances = vec![Appliance::new("Washer", 1.0, 2)];
///
/// let now = GreedyScheduler::new(GreedyMode::EarliestStart)
///     .schedule(&prices, &appliances)
///     .unwrap();
/// assert_eq!(now.hours_for("Washer"), &[0, 1]);
///
/// let cheap = GreedyScheduler::new(GreedyMode::CheapestHours)
///     .schedule(&prices, &appliances)
///     .unwrap();
/// assert_eq!(cheap.hours_for("Washer"), &[0, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreedyScheduler {
    mode: GreedyMode,
    restricted: HourSet,
    preferences: Preferences,
}

impl GreedyScheduler {
    /// Creates a scheduler with the given mode.
    pub fn new(mode: GreedyMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets globally forbidden hours.
    pub fn with_restricted_hours(mut self, hours: impl Into<HourSet>) -> Self {
        self.restricted = hours.into();
        self
    }

    /// Sets preferences. Only `hard_avoid` ones affect hour selection.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// The configured mode.
    pub fn mode(&self) -> GreedyMode {
        self.mode
    }

    /// Schedules every appliance.
    ///
    /// # Errors
    /// Same as the exact optimizer: [`crate::Error::Validation`] for
    /// structural problems, [`crate::Error::Infeasible`] when an appliance
    /// cannot get its full duration. Never returns a partial schedule.
    pub fn schedule(&self, prices: &PriceSeries, appliances: &[Appliance]) -> Result<Schedule> {
        let availability = check_feasibility(
            appliances,
            prices.horizon(),
            &self.restricted,
            &self.preferences,
        )?;
        Ok(self.select(prices, appliances, &availability))
    }

    /// Schedules every appliance, giving an appliance fewer hours than its
    /// duration when not enough usable hours exist.
    ///
    /// # Errors
    /// [`crate::Error::Validation`] for structural problems only.
    pub fn schedule_partial(
        &self,
        prices: &PriceSeries,
        appliances: &[Appliance],
    ) -> Result<Schedule> {
        let horizon = prices.horizon();
        check_structure(appliances, horizon, &self.restricted, &self.preferences)?;
        let availability: Vec<Availability> = appliances
            .iter()
            .map(|a| {
                Availability::for_appliance(
                    a,
                    horizon,
                    &self.restricted,
                    self.preferences.get(&a.name),
                )
            })
            .collect();
        Ok(self.select(prices, appliances, &availability))
    }

    fn select(
        &self,
        prices: &PriceSeries,
        appliances: &[Appliance],
        availability: &[Availability],
    ) -> Schedule {
        let mut selected = BTreeMap::new();
        for (appliance, avail) in appliances.iter().zip(availability) {
            let usable = avail.available_hours();
            let hours = match self.mode {
                GreedyMode::EarliestStart => {
                    usable.into_iter().take(appliance.duration).collect()
                }
                GreedyMode::CheapestHours => prices.cheapest_hours(appliance.duration, &usable),
            };
            selected.insert(appliance.name.clone(), hours);
        }

        let schedule = Schedule::costed(&selected, appliances, prices);
        debug!(
            mode = ?self.mode,
            appliances = appliances.len(),
            cost = schedule.total_cost,
            "greedy schedule built"
        );
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Preference;

    fn prices_24() -> PriceSeries {
        let prices = (0..24)
            .map(|h| match h {
                0..=5 => 0.08,
                6..=9 => 0.25,
                10..=15 => 0.15,
                16..=20 => 0.35,
                _ => 0.12,
            })
            .collect();
        PriceSeries::new(prices).unwrap()
    }

    #[test]
    fn test_earliest_start() {
        let appliances = vec![
            Appliance::new("Washer", 0.5, 2),
            Appliance::new("Dryer", 1.0, 1).with_allowed_hours([18, 19, 20]),
        ];
        let schedule = GreedyScheduler::new(GreedyMode::EarliestStart)
            .with_restricted_hours([0])
            .schedule(&prices_24(), &appliances)
            .unwrap();

        assert_eq!(schedule.hours_for("Washer"), &[1, 2]);
        assert_eq!(schedule.hours_for("Dryer"), &[18]);
        assert!((schedule.total_cost - (0.5 * 0.16 + 0.35)).abs() < 1e-9);
    }

    #[test]
    fn test_cheapest_hours() {
        let appliances = vec![Appliance::new("Heater", 2.0, 3).with_allowed_hours(6..16)];
        let schedule = GreedyScheduler::new(GreedyMode::CheapestHours)
            .schedule(&prices_24(), &appliances)
            .unwrap();

        // All six 10..=15 hours cost 0.15; ties go to the earliest
        assert_eq!(schedule.hours_for("Heater"), &[10, 11, 12]);
        assert!((schedule.total_cost - 2.0 * 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_cheapest_never_worse_than_earliest() {
        let appliances = crate::models::catalog::demo_appliances();
        let prices = prices_24();
        let early = GreedyScheduler::new(GreedyMode::EarliestStart)
            .schedule(&prices, &appliances)
            .unwrap();
        let cheap = GreedyScheduler::new(GreedyMode::CheapestHours)
            .schedule(&prices, &appliances)
            .unwrap();
        assert!(cheap.total_cost <= early.total_cost + 1e-9);
        assert!(cheap.is_complete(&appliances));
    }

    #[test]
    fn test_hard_avoid_skipped() {
        let mut prefs = Preferences::new();
        prefs.insert("Washer".into(), Preference::new(4).with_avoid_hours([0, 1]).hard());
        let schedule = GreedyScheduler::new(GreedyMode::EarliestStart)
            .with_preferences(prefs.clone())
            .schedule(&prices_24(), &[Appliance::new("Washer", 0.5, 2)])
            .unwrap();
        assert_eq!(schedule.hours_for("Washer"), &[2, 3]);

        let violations = schedule.verify(
            &[Appliance::new("Washer", 0.5, 2)],
            24,
            &HourSet::new(),
            &prefs,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_infeasible() {
        let prices = PriceSeries::new(vec![0.1, 0.2, 0.3]).unwrap();
        let result = GreedyScheduler::new(GreedyMode::CheapestHours)
            .with_restricted_hours([1])
            .schedule(&prices, &[Appliance::new("Oven", 2.3, 3)]);
        assert!(matches!(result, Err(Error::Infeasible { .. })));
    }

    #[test]
    fn test_partial_keeps_usable_hours() {
        let prices = PriceSeries::new(vec![0.1, 0.2, 0.3]).unwrap();
        let appliances = vec![Appliance::new("Oven", 2.0, 3), Appliance::new("Lamp", 0.5, 1)];
        let schedule = GreedyScheduler::new(GreedyMode::EarliestStart)
            .with_restricted_hours([1])
            .schedule_partial(&prices, &appliances)
            .unwrap();
        assert_eq!(schedule.hours_for("Oven"), &[0, 2]);
        assert_eq!(schedule.hours_for("Lamp"), &[0]);
        assert!(!schedule.is_complete(&appliances));
        assert!((schedule.total_cost - (2.0 * 0.4 + 0.05)).abs() < 1e-9);

        let bad = GreedyScheduler::default().schedule_partial(&prices, &[Appliance::new("", 1.0, 1)]);
        assert!(matches!(bad, Err(Error::Validation(_))));
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(GreedyScheduler::default().mode(), GreedyMode::EarliestStart);
    }
}
