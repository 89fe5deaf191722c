//! Appliance scheduling environment.
//!
//! # State
//! `(current_hour, remaining[a])`, observed as `[hour, remaining...]` in
//! the appliance order fixed at construction.
//!
//! # Transition
//! For every appliance switched on in hour `h`:
//! 1. `h` not usable (restricted, outside allowed, hard-avoided): nothing
//!    runs, `restricted_penalty` is charged.
//! 2. No remaining duration: nothing runs, `overuse_penalty` is charged.
//! 3. Otherwise the appliance runs: `cost += power * norm_price[h]`.
//!
//! Then `Σ remaining * unfinished_penalty` is charged at the last hour and
//! `Σ remaining * late_penalty` after `late_fraction * H`. The reward is
//! `-(cost + penalties) + comfort`.
//!
//! # Prices
//! Normalized to `(p - min) / (max - min + ε)` so the reward scale does not
//! depend on the tariff.

use tracing::debug;

use super::{Environment, Observation, StepInfo, Transition};
use crate::config::RewardShaping;
use crate::error::{Error, Result};
use crate::models::{Appliance, Availability, HourSet, Preferences, PriceSeries};
use crate::validation::{check_structure, validate_hours, validate_preferences};

/// Simulation environment over one price horizon.
///
/// # Example
///
/// ```
/// use u_energy::env::{EnergyEnv, Environment};
/// use u_energy::models::{Appliance, PriceSeries};
///
/// let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
/// let mut env = EnergyEnv::new(prices, vec![Appliance::new("Washer", 1.0, 2)]).unwrap();
///
/// let obs = env.reset();
/// assert_eq!(obs, vec![0.0, 2.0]);
///
/// let t = env.step(&[true]).unwrap();
/// assert_eq!(t.observation, vec![1.0, 1.0]);
/// assert!(!t.done);
/// ```
#[derive(Debug, Clone)]
pub struct EnergyEnv {
    prices: PriceSeries,
    norm_prices: Vec<f64>,
    appliances: Vec<Appliance>,
    restricted: HourSet,
    preferences: Preferences,
    availability: Vec<Availability>,
    shaping: RewardShaping,
    current_hour: usize,
    remaining: Vec<usize>,
    total_cost: f64,
}

impl EnergyEnv {
    /// Creates an environment with calibrated shaping and no restrictions.
    ///
    /// Appliances that cannot finish within their usable hours are accepted;
    /// the unfinished penalty accounts for them.
    ///
    /// # Errors
    /// [`Error::Validation`] for structurally invalid appliances.
    pub fn new(prices: PriceSeries, appliances: Vec<Appliance>) -> Result<Self> {
        let horizon = prices.horizon();
        check_structure(&appliances, horizon, &HourSet::new(), &Preferences::new())?;

        let shaping = RewardShaping::calibrated(&appliances);
        let norm_prices = prices.normalized(shaping.price_epsilon);
        let mut env = Self {
            prices,
            norm_prices,
            appliances,
            restricted: HourSet::new(),
            preferences: Preferences::new(),
            availability: Vec::new(),
            shaping,
            current_hour: 0,
            remaining: Vec::new(),
            total_cost: 0.0,
        };
        env.shaping.validate(env.max_hour_cost())?;
        env.refresh_availability();
        env.reset();
        Ok(env)
    }

    /// Sets globally forbidden hours.
    pub fn with_restricted_hours(mut self, hours: impl Into<HourSet>) -> Result<Self> {
        let hours = hours.into();
        validate_hours(&hours, self.horizon()).map_err(Error::Validation)?;
        self.restricted = hours;
        self.refresh_availability();
        Ok(self)
    }

    /// Attaches preferences: hard-avoid hours become unusable, soft ones
    /// feed the comfort shaping term.
    pub fn with_preferences(mut self, preferences: Preferences) -> Result<Self> {
        validate_preferences(&preferences, &self.appliances, self.horizon())
            .map_err(Error::Validation)?;
        self.preferences = preferences;
        self.refresh_availability();
        Ok(self)
    }

    /// Replaces the reward shaping.
    ///
    /// # Errors
    /// [`Error::Config`] if the penalty ordering does not hold for these
    /// appliances.
    pub fn with_shaping(mut self, shaping: RewardShaping) -> Result<Self> {
        let epsilon_changed = shaping.price_epsilon != self.shaping.price_epsilon;
        self.shaping = shaping;
        if epsilon_changed {
            self.norm_prices = self.prices.normalized(self.shaping.price_epsilon);
        }
        self.shaping.validate(self.max_hour_cost())?;
        Ok(self)
    }

    /// Number of simulated hours.
    pub fn horizon(&self) -> usize {
        self.prices.horizon()
    }

    /// Hour the next step will simulate.
    pub fn current_hour(&self) -> usize {
        self.current_hour
    }

    /// Remaining duration per appliance.
    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    /// Cumulative normalized cost of the current episode.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Appliances in observation/action order.
    pub fn appliances(&self) -> &[Appliance] {
        &self.appliances
    }

    /// Raw prices.
    pub fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    /// Normalized prices used for the reward.
    pub fn normalized_prices(&self) -> &[f64] {
        &self.norm_prices
    }

    /// Active reward shaping.
    pub fn shaping(&self) -> &RewardShaping {
        &self.shaping
    }

    /// Globally forbidden hours.
    pub fn restricted_hours(&self) -> &HourSet {
        &self.restricted
    }

    /// Attached preferences.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Whether appliance `index` may run in `hour`.
    pub fn is_usable(&self, index: usize, hour: usize) -> bool {
        self.availability
            .get(index)
            .is_some_and(|a| a.is_available(hour))
    }

    /// Largest cost a single appliance can incur in one hour.
    fn max_hour_cost(&self) -> f64 {
        let max_price = self.norm_prices.iter().copied().fold(0.0, f64::max);
        let max_power = self.appliances.iter().map(|a| a.power).fold(0.0, f64::max);
        max_price * max_power
    }

    fn refresh_availability(&mut self) {
        let horizon = self.horizon();
        self.availability = self
            .appliances
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
    }

    fn comfort_term(&self, appliance: &Appliance, hour: usize) -> f64 {
        match self.preferences.get(&appliance.name) {
            Some(pref) if pref.is_avoided(hour) => {
                -self.shaping.avoid_weight * f64::from(pref.strength)
            }
            Some(pref) if pref.is_preferred(hour) => {
                self.shaping.prefer_weight * f64::from(pref.strength)
            }
            _ => 0.0,
        }
    }
}

impl Environment for EnergyEnv {
    fn reset(&mut self) -> Observation {
        self.current_hour = 0;
        self.remaining = self.appliances.iter().map(|a| a.duration).collect();
        self.total_cost = 0.0;
        debug!(
            horizon = self.horizon(),
            appliances = self.appliances.len(),
            "environment reset"
        );
        self.observation()
    }

    fn step(&mut self, action: &[bool]) -> Result<Transition> {
        if self.is_done() {
            return Err(Error::EpisodeFinished);
        }
        if action.len() != self.appliances.len() {
            return Err(Error::ActionLength {
                expected: self.appliances.len(),
                actual: action.len(),
            });
        }

        let hour = self.current_hour;
        let horizon = self.horizon();
        let mut info = StepInfo {
            hour,
            ran: vec![false; self.appliances.len()],
            ..StepInfo::default()
        };

        for (i, &on) in action.iter().enumerate() {
            if !on {
                continue;
            }
            if !self.is_usable(i, hour) {
                info.penalty += self.shaping.restricted_penalty;
                continue;
            }
            if self.remaining[i] == 0 {
                info.penalty += self.shaping.overuse_penalty;
                continue;
            }

            let appliance = &self.appliances[i];
            info.cost += appliance.power * self.norm_prices[hour];
            info.raw_cost += appliance.power * self.prices.price(hour);
            info.comfort += self.comfort_term(appliance, hour);
            self.remaining[i] -= 1;
            info.ran[i] = true;
        }

        let left: usize = self.remaining.iter().sum();
        if hour + 1 == horizon {
            info.penalty += left as f64 * self.shaping.unfinished_penalty;
        }
        if hour as f64 > self.shaping.late_fraction * horizon as f64 {
            info.penalty += left as f64 * self.shaping.late_penalty;
        }

        self.total_cost += info.cost;
        info.total_cost = self.total_cost;
        self.current_hour += 1;

        let done = self.is_done();
        if done {
            debug!(
                hours = self.current_hour,
                unfinished = left,
                total_cost = self.total_cost,
                "episode finished"
            );
        }

        Ok(Transition {
            observation: self.observation(),
            reward: -(info.cost + info.penalty) + info.comfort,
            done,
            info,
        })
    }

    fn observation(&self) -> Observation {
        std::iter::once(self.current_hour as f64)
            .chain(self.remaining.iter().map(|&r| r as f64))
            .collect()
    }

    fn observation_size(&self) -> usize {
        self.appliances.len() + 1
    }

    fn action_size(&self) -> usize {
        self.appliances.len()
    }

    fn action_mask(&self) -> Vec<bool> {
        let done = self.is_done();
        (0..self.appliances.len())
            .map(|i| !done && self.remaining[i] > 0 && self.is_usable(i, self.current_hour))
            .collect()
    }

    fn is_done(&self) -> bool {
        self.current_hour >= self.horizon() || self.remaining.iter().all(|&r| r == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preference;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn washer_env() -> EnergyEnv {
        let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
        EnergyEnv::new(prices, vec![Appliance::new("Washer", 1.0, 2)]).unwrap()
    }

    fn run(env: &mut EnergyEnv, action: &[bool]) -> Vec<Transition> {
        env.reset();
        let mut out = Vec::new();
        while !env.is_done() {
            out.push(env.step(action).unwrap());
        }
        out
    }

    #[test]
    fn test_initial_state() {
        let env = washer_env();
        assert_eq!(env.observation(), vec![0.0, 2.0]);
        assert_eq!(env.observation_size(), 2);
        assert_eq!(env.action_size(), 1);
        assert_eq!(env.action_mask(), vec![true]);
        assert!(!env.is_done());
    }

    #[test]
    fn test_normalized_prices() {
        let env = washer_env();
        let norm = env.normalized_prices();
        assert!(norm[2].abs() < 1e-12);
        assert!(norm[1] < 1.0 && norm[1] > 0.999);
        assert!(norm.iter().all(|&p| (0.0..1.0).contains(&p)));
    }

    #[test]
    fn test_deterministic_all_on() {
        let mut env = washer_env();
        let a = run(&mut env, &[true]);
        let b = run(&mut env, &[true]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert!(a.last().unwrap().done);
        assert_eq!(env.remaining(), &[0]);
    }

    #[test]
    fn test_cost_matches_prices() {
        let mut env = washer_env();
        let steps = run(&mut env, &[true]);
        let norm = env.normalized_prices().to_vec();
        assert!((steps[0].info.cost - norm[0]).abs() < 1e-12);
        assert!((steps[1].info.raw_cost - 0.50).abs() < 1e-12);
        assert!((env.total_cost() - (norm[0] + norm[1])).abs() < 1e-12);
        assert!((steps[0].reward + norm[0]).abs() < 1e-12);
    }

    #[test]
    fn test_terminates_within_horizon() {
        let mut env = washer_env();
        let steps = run(&mut env, &[false]);
        assert_eq!(steps.len(), 4);
        assert_eq!(env.current_hour(), 4);
        // H=4: the late threshold is hour 3, so only the unfinished penalty applies
        let shaping = env.shaping().clone();
        assert!(steps[..3].iter().all(|t| t.info.penalty == 0.0));
        let last = &steps[3].info;
        assert!((last.penalty - 2.0 * shaping.unfinished_penalty).abs() < 1e-9);
    }

    #[test]
    fn test_late_penalty() {
        let prices = PriceSeries::new(vec![0.1; 8]).unwrap();
        let mut env = EnergyEnv::new(prices, vec![Appliance::new("Washer", 1.0, 1)]).unwrap();
        let steps = run(&mut env, &[false]);
        let late = env.shaping().late_penalty;
        // Hour 7 > 0.75 * 8 is late, hour 6 is not
        assert_eq!(steps[6].info.penalty, 0.0);
        let expected = env.shaping().unfinished_penalty + late;
        assert!((steps[7].info.penalty - expected).abs() < 1e-9);
    }

    #[test]
    fn test_step_after_done() {
        let mut env = washer_env();
        run(&mut env, &[true]);
        let before = env.observation();
        assert!(matches!(env.step(&[true]), Err(Error::EpisodeFinished)));
        assert_eq!(env.observation(), before);
        assert_eq!(env.action_mask(), vec![false]);
    }

    #[test]
    fn test_action_length() {
        let mut env = washer_env();
        let err = env.step(&[true, false]).unwrap_err();
        assert!(matches!(
            err,
            Error::ActionLength {
                expected: 1,
                actual: 2
            }
        ));
        assert_eq!(env.current_hour(), 0);
    }

    #[test]
    fn test_overuse_penalty() {
        let prices = PriceSeries::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        let appliances = vec![Appliance::new("Lamp", 0.5, 1), Appliance::new("Oven", 2.0, 3)];
        let mut env = EnergyEnv::new(prices, appliances).unwrap();
        env.step(&[true, true]).unwrap();
        let t = env.step(&[true, true]).unwrap();
        assert_eq!(t.info.ran, vec![false, true]);
        assert!((t.info.penalty - env.shaping().overuse_penalty).abs() < 1e-9);
    }

    #[test]
    fn test_restricted_hour_never_cheaper() {
        let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
        let mut env = EnergyEnv::new(prices, vec![Appliance::new("Washer", 1.0, 2)])
            .unwrap()
            .with_restricted_hours([0])
            .unwrap();

        assert_eq!(env.action_mask(), vec![false]);
        let on = env.step(&[true]).unwrap();
        assert!(!on.info.ran[0]);
        assert_eq!(on.observation, vec![1.0, 2.0]);

        env.reset();
        let off = env.step(&[false]).unwrap();
        assert!(on.reward < off.reward);
        assert!(on.info.penalty >= env.shaping().unfinished_penalty);
    }

    #[test]
    fn test_allowed_hours_respected() {
        let prices = PriceSeries::new(vec![0.1; 4]).unwrap();
        let appliances = vec![Appliance::new("Dryer", 1.0, 1).with_allowed_hours([2, 3])];
        let mut env = EnergyEnv::new(prices, appliances).unwrap();
        assert!(!env.is_usable(0, 0));
        let t = env.step(&[true]).unwrap();
        assert!(!t.info.ran[0]);
    }

    #[test]
    fn test_comfort_shaping() {
        let prices = PriceSeries::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let mut prefs = Preferences::new();
        prefs.insert(
            "Washer".into(),
            Preference::new(5)
                .with_avoid_hours([0])
                .with_preferred_hours([1]),
        );
        let mut env = EnergyEnv::new(prices, vec![Appliance::new("Washer", 1.0, 2)])
            .unwrap()
            .with_preferences(prefs)
            .unwrap();

        let avoided = env.step(&[true]).unwrap();
        assert!((avoided.info.comfort + 0.2 * 5.0).abs() < 1e-9);
        let preferred = env.step(&[true]).unwrap();
        assert!((preferred.info.comfort - 0.1 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_hard_avoid_masks() {
        let prices = PriceSeries::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let mut prefs = Preferences::new();
        prefs.insert("Washer".into(), Preference::new(3).with_avoid_hours([0]).hard());
        let env = EnergyEnv::new(prices, vec![Appliance::new("Washer", 1.0, 1)])
            .unwrap()
            .with_preferences(prefs)
            .unwrap();
        assert_eq!(env.action_mask(), vec![false]);
    }

    #[test]
    fn test_unfinishable_accepted() {
        let prices = PriceSeries::new(vec![0.1, 0.2]).unwrap();
        let env = EnergyEnv::new(prices, vec![Appliance::new("Heater", 2.0, 5)]);
        assert!(env.is_ok());
    }

    #[test]
    fn test_invalid_inputs() {
        let prices = PriceSeries::new(vec![0.1, 0.2]).unwrap();
        let err = EnergyEnv::new(prices.clone(), vec![Appliance::new("", 1.0, 1)]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let env = EnergyEnv::new(prices, vec![Appliance::new("Lamp", 0.1, 1)]).unwrap();
        assert!(env.clone().with_restricted_hours([7]).is_err());

        let broken = RewardShaping {
            overuse_penalty: 50.0,
            ..RewardShaping::default()
        };
        assert!(matches!(env.with_shaping(broken), Err(Error::Config(_))));
    }

    #[test]
    fn test_no_appliances_done_at_reset() {
        let prices = PriceSeries::new(vec![0.1, 0.2]).unwrap();
        let mut env = EnergyEnv::new(prices, Vec::new()).unwrap();
        assert!(env.is_done());
        assert!(matches!(env.step(&[]), Err(Error::EpisodeFinished)));
    }

    #[test]
    fn test_random_always_on_finishes() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let horizon = rng.random_range(2..=12);
            let prices = PriceSeries::new(
                (0..horizon).map(|_| rng.random_range(0.01..1.0)).collect(),
            )
            .unwrap();
            let mut budget = horizon;
            let mut appliances = Vec::new();
            for i in 0..rng.random_range(1..=3) {
                if budget == 0 {
                    break;
                }
                let duration = rng.random_range(1..=budget);
                budget -= duration;
                appliances.push(Appliance::new(
                    format!("A{i}"),
                    rng.random_range(0.1..3.0),
                    duration,
                ));
            }
            let longest = appliances.iter().map(|a| a.duration).max().unwrap();
            let expected_cost: f64 = appliances
                .iter()
                .map(|a| prices.cost_of(&(0..a.duration).collect::<Vec<_>>(), a.power))
                .sum();

            let mut env = EnergyEnv::new(prices, appliances.clone()).unwrap();
            let action = vec![true; appliances.len()];
            let steps = run(&mut env, &action);

            assert_eq!(steps.len(), longest);
            assert!(steps.len() <= horizon);
            assert!(steps.last().unwrap().done);
            assert!(env.remaining().iter().all(|&r| r == 0));
            let raw: f64 = steps.iter().map(|t| t.info.raw_cost).sum();
            assert!((raw - expected_cost).abs() < 1e-9);
        }
    }
}
