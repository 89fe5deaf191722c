//! Grid search over price thresholds.
//!
//! A minimal [`PolicyTrainer`]: every candidate threshold is evaluated by
//! one rollout through the [`Environment`] trait, and the threshold with the
//! highest return wins (ties go to the earlier candidate).

use tracing::{debug, info};

use super::{PolicyRunner, PolicyTrainer, ThresholdPolicy};
use crate::config::RewardShaping;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::models::PriceSeries;

/// Default number of grid steps between 0 and 1.
pub const DEFAULT_GRID_STEPS: usize = 10;

/// Threshold grid-search trainer.
#[derive(Debug, Clone)]
pub struct ThresholdSearch {
    norm_prices: Vec<f64>,
    thresholds: Vec<f64>,
    runner: PolicyRunner,
    history: Vec<(f64, f64)>,
}

impl ThresholdSearch {
    /// Creates a search over `0.0, 0.1, ..., 1.0`.
    pub fn new(prices: &PriceSeries) -> Self {
        let epsilon = RewardShaping::default().price_epsilon;
        let thresholds = (0..=DEFAULT_GRID_STEPS)
            .map(|i| i as f64 / DEFAULT_GRID_STEPS as f64)
            .collect();
        Self {
            norm_prices: prices.normalized(epsilon),
            thresholds,
            runner: PolicyRunner::new(),
            history: Vec::new(),
        }
    }

    /// Replaces the candidate thresholds.
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets the runner used for evaluation rollouts.
    pub fn with_runner(mut self, runner: PolicyRunner) -> Self {
        self.runner = runner;
        self
    }

    /// `(threshold, return)` of every candidate from the last training run.
    pub fn history(&self) -> &[(f64, f64)] {
        &self.history
    }
}

impl PolicyTrainer for ThresholdSearch {
    type Policy = ThresholdPolicy;

    fn train(&mut self, env: &mut dyn Environment) -> Result<ThresholdPolicy> {
        if self.thresholds.is_empty() {
            return Err(Error::Config("threshold grid is empty".into()));
        }
        self.history.clear();

        let mut best: Option<(f64, f64)> = None;
        for &threshold in &self.thresholds {
            let mut policy = ThresholdPolicy::from_normalized(self.norm_prices.clone(), threshold);
            let rollout = self.runner.rollout(env, &mut policy)?;
            debug!(threshold, reward = rollout.total_reward, "threshold evaluated");
            self.history.push((threshold, rollout.total_reward));

            match best {
                Some((_, reward)) if rollout.total_reward <= reward => {}
                _ => best = Some((threshold, rollout.total_reward)),
            }
        }

        let (threshold, reward) = best.ok_or_else(|| Error::Config("no threshold evaluated".into()))?;
        info!(
            threshold,
            reward,
            candidates = self.thresholds.len(),
            "threshold search finished"
        );
        Ok(ThresholdPolicy::from_normalized(
            self.norm_prices.clone(),
            threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnergyEnv;
    use crate::models::Appliance;

    fn washer() -> (PriceSeries, EnergyEnv) {
        let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
        let env = EnergyEnv::new(prices.clone(), vec![Appliance::new("Washer", 1.0, 2)]).unwrap();
        (prices, env)
    }

    #[test]
    fn test_finds_cheapest_plan() {
        let (prices, mut env) = washer();
        let mut search = ThresholdSearch::new(&prices);
        let mut policy = search.train(&mut env).unwrap();

        // 0.2 is the first grid point that admits hour 0 (normalized ~0.111)
        assert!((policy.threshold() - 0.2).abs() < 1e-9);
        assert_eq!(search.history().len(), 11);

        let outcome = PolicyRunner::new().run(&mut env, &mut policy).unwrap();
        assert_eq!(outcome.schedule.hours_for("Washer"), &[0, 2]);
        assert!((outcome.schedule.total_cost - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_best_has_max_return() {
        let (prices, mut env) = washer();
        let mut search = ThresholdSearch::new(&prices).with_thresholds(vec![1.0, 0.0, 0.5]);
        let policy = search.train(&mut env).unwrap();
        let best = search
            .history()
            .iter()
            .map(|&(_, r)| r)
            .fold(f64::NEG_INFINITY, f64::max);
        let chosen = search
            .history()
            .iter()
            .find(|&&(t, _)| t == policy.threshold())
            .map(|&(_, r)| r)
            .unwrap();
        assert_eq!(chosen, best);
    }

    #[test]
    fn test_empty_grid() {
        let (prices, mut env) = washer();
        let mut search = ThresholdSearch::new(&prices).with_thresholds(Vec::new());
        assert!(matches!(search.train(&mut env), Err(Error::Config(_))));
    }
}
