//! End-to-end planning: solve, verify, format, score and compare.
//!
//! # Pipeline
//!
//! 1. Solve the scenario (exact MILP, or a policy through the environment).
//! 2. Verify the schedule against every hard constraint.
//! 3. Format it for display.
//! 4. Score comfort when preferences are given.
//! 5. Compare its cost with the earliest-start baseline. The baseline never
//!    fails on capacity, so policies can be evaluated on scenarios the
//!    optimizer rejects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{PlannerConfig, Scenario};
use crate::env::EnergyEnv;
use crate::error::Result;
use crate::format::format_schedule;
use crate::milp::ScheduleMilpBuilder;
use crate::models::{Schedule, Violation};
use crate::policy::{Policy, PolicyRunner, PolicyTrainer};
use crate::scheduler::{ComfortScore, GreedyMode, GreedyScheduler};

/// Label of reports produced by the exact optimizer.
pub const MILP_METHOD: &str = "milp";

/// Everything known about one planned schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    /// What produced the schedule (`"milp"` or the policy name).
    pub method: String,
    /// The schedule, costed with raw prices.
    pub schedule: Schedule,
    /// Appliance → formatted hour ranges.
    pub formatted: BTreeMap<String, String>,
    /// Cost of running everything as early as possible. An appliance with
    /// too few usable hours contributes the hours it can get.
    pub baseline_cost: f64,
    /// `baseline_cost - schedule.total_cost`.
    pub savings: f64,
    /// Savings relative to the baseline, in percent (0 if the baseline is free).
    pub savings_percent: f64,
    /// Comfort score, if the scenario has preferences.
    pub comfort: Option<ComfortScore>,
    /// Hard-constraint violations (always empty for the optimizer).
    pub violations: Vec<Violation>,
    /// Appliance-hours the schedule leaves unfinished.
    pub unfinished: usize,
}

impl PlanReport {
    /// Total cost of the schedule.
    pub fn total_cost(&self) -> f64 {
        self.schedule.total_cost
    }

    /// Whether the schedule satisfies every hard constraint.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Appliance scheduling planner.
///
/// # Example
///
/// ```
/// use u_energy::config::Scenario;
/// use u_energy::models::{Appliance, PriceSeries};
/// use u_energy::planner::Planner;
///
/// let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
/// let scenario = Scenario::new(prices, vec![Appliance::new("Washer", 1.0, 2)]);
///
/// let report = Planner::default().plan(&scenario).unwrap();
/// assert_eq!(report.formatted["Washer"], "0:00\u{2013}1:00, 2:00\u{2013}3:00");
/// assert!((report.total_cost() - 0.15).abs() < 1e-9);
/// assert!((report.savings_percent - 75.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner with the given configuration.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Solves a scenario to optimality and reports on the result.
    ///
    /// # Errors
    /// [`crate::Error::Validation`], [`crate::Error::Infeasible`],
    /// [`crate::Error::Solver`], or [`crate::Error::Config`] for invalid
    /// comfort weights.
    pub fn plan(&self, scenario: &Scenario) -> Result<PlanReport> {
        self.config.comfort.validate()?;

        let schedule = ScheduleMilpBuilder::new(&scenario.prices, &scenario.appliances)
            .with_restricted_hours(scenario.restricted_hours.clone())
            .with_preferences(scenario.preferences.clone())
            .solve()?;

        self.report(scenario, MILP_METHOD, schedule, 0)
    }

    /// Runs a policy through the simulation environment and reports on the
    /// schedule it produces.
    pub fn evaluate_policy<P: Policy + ?Sized>(
        &self,
        scenario: &Scenario,
        policy: &mut P,
    ) -> Result<PlanReport> {
        self.config.comfort.validate()?;

        let mut env = self.environment(scenario)?;
        let outcome = PolicyRunner::new().run(&mut env, policy)?;
        self.report(scenario, policy.name(), outcome.schedule, outcome.unfinished)
    }

    /// Trains a policy on the scenario's environment, then evaluates it.
    pub fn train_and_evaluate<T: PolicyTrainer>(
        &self,
        scenario: &Scenario,
        trainer: &mut T,
    ) -> Result<PlanReport> {
        let mut env = self.environment(scenario)?;
        let mut policy = trainer.train(&mut env)?;
        self.evaluate_policy(scenario, &mut policy)
    }

    /// Builds the simulation environment for a scenario.
    pub fn environment(&self, scenario: &Scenario) -> Result<EnergyEnv> {
        let env = EnergyEnv::new(scenario.prices.clone(), scenario.appliances.clone())?
            .with_restricted_hours(scenario.restricted_hours.clone())?
            .with_preferences(scenario.preferences.clone())?;
        match &self.config.shaping {
            Some(shaping) => env.with_shaping(shaping.clone()),
            None => Ok(env),
        }
    }

    fn report(
        &self,
        scenario: &Scenario,
        method: &str,
        schedule: Schedule,
        unfinished: usize,
    ) -> Result<PlanReport> {
        let baseline = GreedyScheduler::new(GreedyMode::EarliestStart)
            .with_restricted_hours(scenario.restricted_hours.clone())
            .with_preferences(scenario.preferences.clone())
            .schedule_partial(&scenario.prices, &scenario.appliances)?;

        let baseline_cost = baseline.total_cost;
        let savings = baseline_cost - schedule.total_cost;
        let savings_percent = if baseline_cost > 0.0 {
            savings / baseline_cost * 100.0
        } else {
            0.0
        };

        let hours = schedule.to_hour_map();
        let comfort = (!scenario.preferences.is_empty()).then(|| {
            ComfortScore::calculate_with(&hours, &scenario.preferences, &self.config.comfort)
        });
        let violations = schedule.verify(
            &scenario.appliances,
            scenario.horizon(),
            &scenario.restricted_hours,
            &scenario.preferences,
        );

        info!(
            method,
            cost = schedule.total_cost,
            baseline_cost,
            savings_percent,
            comfort = comfort.as_ref().map(|c| c.score),
            violations = violations.len(),
            "plan ready"
        );

        Ok(PlanReport {
            method: method.to_string(),
            formatted: format_schedule(&hours),
            schedule,
            baseline_cost,
            savings,
            savings_percent,
            comfort,
            violations,
            unfinished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComfortWeights;
    use crate::error::Error;
    use crate::format::NOT_SCHEDULED;
    use crate::models::{Appliance, Preference, PriceSeries, ViolationType};
    use crate::policy::{AlwaysOn, ThresholdSearch};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn washer_scenario() -> Scenario {
        let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
        Scenario::new(prices, vec![Appliance::new("Washer", 1.0, 2)])
    }

    #[test]
    fn test_plan_washer() {
        let report = Planner::default().plan(&washer_scenario()).unwrap();
        assert_eq!(report.method, MILP_METHOD);
        assert_eq!(report.schedule.hours_for("Washer"), &[0, 2]);
        assert_eq!(report.formatted["Washer"], "0:00\u{2013}1:00, 2:00\u{2013}3:00");
        assert!((report.baseline_cost - 0.60).abs() < 1e-9);
        assert!((report.savings - 0.45).abs() < 1e-9);
        assert!(report.is_feasible());
        assert!(report.comfort.is_none());
        assert_eq!(report.unfinished, 0);
    }

    #[test]
    fn test_plan_demo_day() {
        init_tracing();
        let prices: Vec<f64> = (0..24)
            .map(|h| if (17..21).contains(&h) { 0.40 } else { 0.12 + 0.01 * (h % 5) as f64 })
            .collect();
        let scenario = Scenario::new(
            PriceSeries::new(prices).unwrap(),
            crate::models::catalog::demo_appliances(),
        )
        .with_restricted_hours([0, 1, 2])
        .with_preference(
            "Dishwasher",
            Preference::new(4).with_preferred_hours([20, 21, 22]),
        );

        let report = Planner::default().plan(&scenario).unwrap();
        assert!(report.is_feasible());
        assert!(report.savings >= -1e-9);
        assert!(report.comfort.is_some());
        assert_eq!(report.formatted.len(), 3);
        assert!(report.formatted.values().all(|v| v != NOT_SCHEDULED));
    }

    #[test]
    fn test_plan_infeasible() {
        let scenario = washer_scenario().with_restricted_hours([0, 1, 2]);
        let err = Planner::default().plan(&scenario).unwrap_err();
        assert!(matches!(err, Error::Infeasible { .. }));
    }

    #[test]
    fn test_invalid_comfort_weights() {
        let config = PlannerConfig::default().with_comfort(ComfortWeights {
            avoid_factor: -1.0,
            ..ComfortWeights::default()
        });
        let err = Planner::new(config).plan(&washer_scenario()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_evaluate_always_on() {
        let report = Planner::default()
            .evaluate_policy(&washer_scenario(), &mut AlwaysOn)
            .unwrap();
        assert_eq!(report.method, "always-on");
        assert!(report.savings.abs() < 1e-9);
        assert!(report.is_feasible());
    }

    #[test]
    fn test_evaluate_unfinishable_scenario() {
        let prices = PriceSeries::new(vec![0.1, 0.2]).unwrap();
        let scenario = Scenario::new(prices, vec![Appliance::new("Heater", 2.0, 5)]);
        let planner = Planner::default();
        assert!(planner.environment(&scenario).is_ok());
        assert!(matches!(planner.plan(&scenario), Err(Error::Infeasible { .. })));

        let report = planner.evaluate_policy(&scenario, &mut AlwaysOn).unwrap();
        assert_eq!(report.schedule.hours_for("Heater"), &[0, 1]);
        assert_eq!(report.unfinished, 3);
        assert!((report.baseline_cost - 0.6).abs() < 1e-9);
        assert!(report.savings.abs() < 1e-9);
        assert!(!report.is_feasible());
        assert!(report
            .violations
            .iter()
            .any(|v| v.violation_type == ViolationType::WrongDuration));
    }

    #[test]
    fn test_train_and_evaluate_matches_optimum() {
        init_tracing();
        let scenario = washer_scenario();
        let planner = Planner::default();
        let mut trainer = ThresholdSearch::new(&scenario.prices);

        let learned = planner.train_and_evaluate(&scenario, &mut trainer).unwrap();
        let optimal = planner.plan(&scenario).unwrap();
        assert!((learned.total_cost() - optimal.total_cost()).abs() < 1e-9);
        assert_eq!(learned.unfinished, 0);
    }

    #[test]
    fn test_comfort_reported_with_preferences() {
        let scenario = washer_scenario()
            .with_preference("Washer", Preference::new(5).with_preferred_hours([0, 2]));
        let report = Planner::default().plan(&scenario).unwrap();
        let comfort = report.comfort.unwrap();
        assert!((comfort.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_from_json() {
        let json = r#"{
            "prices": [0.10, 0.50, 0.05, 0.20],
            "appliances": [{"name": "Washer", "power": 1.0, "duration": 2}],
            "restricted_hours": [0]
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        let report = Planner::default().plan(&scenario).unwrap();
        assert_eq!(report.schedule.hours_for("Washer"), &[2, 3]);
        assert!((report.total_cost() - 0.25).abs() < 1e-9);
    }
}
