//! Exact MILP scheduling formulation.
//!
//! Builds a 0/1 assignment model over (appliance, hour) pairs and solves it
//! with `good_lp`'s default backend.
//!
//! # Formulation
//!
//! ```text
//! minimise    Σ_a Σ_h  price[h] · power(a) · run[a][h]
//! subject to  Σ_h run[a][h] = duration(a)            for every a
//!             run[a][h] = 0                          for every unusable (a, h)
//!             run[a][h] ∈ {0, 1}
//! ```
//!
//! An hour is unusable for an appliance if it is globally restricted,
//! outside the appliance's allowed hours, or hard-avoided by its preference.
//!
//! Ties between equally cheap assignments are left to the solver.
//!
//! # Reference
//! Wolsey (2020), "Integer Programming", Ch. 1

use good_lp::{
    constraint, default_solver, variable, Constraint, Expression, ProblemVariables,
    ResolutionError, Solution, SolverModel, Variable,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Appliance, Availability, HourSet, Preferences, PriceSeries, Schedule};
use crate::validation::check_feasibility;

/// Solves an appliance scheduling problem to optimality.
///
/// # Errors
/// - [`Error::Validation`] for malformed input.
/// - [`Error::Infeasible`] if some appliance cannot get its duration.
///
/// # Example
/// ```
/// use u_energy::milp;
/// use u_energy::models::{Appliance, HourSet, PriceSeries};
///
/// let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
/// let appliances = vec![Appliance::new("Washer", 1.0, 2)];
/// let schedule = milp::solve(&prices, &appliances, &HourSet::new()).unwrap();
///
/// assert_eq!(schedule.hours_for("Washer"), &[0, 2]);
/// assert!((schedule.total_cost - 0.15).abs() < 1e-9);
/// ```
pub fn solve(
    prices: &PriceSeries,
    appliances: &[Appliance],
    restricted_hours: &HourSet,
) -> Result<Schedule> {
    ScheduleMilpBuilder::new(prices, appliances)
        .with_restricted_hours(restricted_hours.clone())
        .solve()
}

/// A built (not yet solved) MILP model.
///
/// Holds the decision variables, objective and constraints; consumed by
/// [`ScheduleMilpBuilder::solve`].
pub struct MilpModel {
    variables: ProblemVariables,
    run: Vec<Vec<Variable>>,
    objective: Expression,
    constraints: Vec<Constraint>,
    horizon: usize,
}

impl MilpModel {
    /// Number of binary decision variables (appliances × hours).
    pub fn variable_count(&self) -> usize {
        self.run.iter().map(Vec::len).sum()
    }

    /// Number of linear constraints (duration + pinned hours).
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of hourly slots modelled.
    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

impl std::fmt::Debug for MilpModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilpModel")
            .field("variables", &self.variable_count())
            .field("constraints", &self.constraint_count())
            .field("horizon", &self.horizon)
            .finish()
    }
}

/// Builds a MILP model from scheduling domain objects.
///
/// # Example
/// ```
/// use u_energy::milp::ScheduleMilpBuilder;
/// use u_energy::models::{Appliance, PriceSeries};
///
/// let prices = PriceSeries::new(vec![0.3, 0.1, 0.2]).unwrap();
/// let appliances = vec![Appliance::new("Dryer", 3.0, 1)];
/// let builder = ScheduleMilpBuilder::new(&prices, &appliances).with_restricted_hours([1]);
///
/// let model = builder.build().unwrap();
/// assert_eq!(model.variable_count(), 3);
///
/// let schedule = builder.solve().unwrap();
/// assert_eq!(schedule.hours_for("Dryer"), &[2]);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleMilpBuilder<'a> {
    prices: &'a PriceSeries,
    appliances: &'a [Appliance],
    restricted: HourSet,
    preferences: Preferences,
}

impl<'a> ScheduleMilpBuilder<'a> {
    /// Creates a new MILP builder.
    pub fn new(prices: &'a PriceSeries, appliances: &'a [Appliance]) -> Self {
        Self {
            prices,
            appliances,
            restricted: HourSet::new(),
            preferences: Preferences::new(),
        }
    }

    /// Sets globally restricted hours.
    pub fn with_restricted_hours(mut self, hours: impl Into<HourSet>) -> Self {
        self.restricted = hours.into();
        self
    }

    /// Sets preferences. Only `hard_avoid` preferences affect the model.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Builds the MILP model.
    ///
    /// Creates:
    /// - A binary variable per (appliance, hour)
    /// - An exact-duration equality per appliance
    /// - A `run = 0` pin per unusable (appliance, hour)
    /// - The total-cost objective
    pub fn build(&self) -> Result<MilpModel> {
        let availability = self.check()?;
        Ok(self.formulate(&availability))
    }

    /// Solves the model and returns an optimal schedule.
    pub fn solve(&self) -> Result<Schedule> {
        let availability = self.check()?;
        let model = self.formulate(&availability);

        debug!(
            appliances = self.appliances.len(),
            horizon = model.horizon,
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "solving appliance MILP"
        );

        if model.run.is_empty() {
            return Ok(Schedule::new());
        }

        let MilpModel {
            variables,
            run,
            objective,
            constraints,
            ..
        } = model;

        let mut problem = variables.minimise(objective).using(default_solver);
        for c in constraints {
            problem = problem.with(c);
        }

        let solution = problem.solve().map_err(|e| match e {
            ResolutionError::Infeasible => {
                warn!("solver reported the appliance model infeasible");
                Error::Infeasible {
                    reason: "solver found no assignment satisfying all constraints".into(),
                }
            }
            other => Error::Solver(other.to_string()),
        })?;

        let hours: BTreeMap<String, Vec<usize>> = self
            .appliances
            .iter()
            .zip(&run)
            .map(|(appliance, vars)| {
                let on = vars
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| solution.value(v) > 0.5)
                    .map(|(h, _)| h)
                    .collect();
                (appliance.name.clone(), on)
            })
            .collect();

        let schedule = Schedule::costed(&hours, self.appliances, self.prices);
        debug!(total_cost = schedule.total_cost, "appliance MILP solved");
        Ok(schedule)
    }

    fn check(&self) -> Result<Vec<Availability>> {
        check_feasibility(
            self.appliances,
            self.prices.horizon(),
            &self.restricted,
            &self.preferences,
        )
        .inspect_err(|e| {
            if matches!(e, Error::Infeasible { .. }) {
                warn!(error = %e, "appliance schedule infeasible before solving");
            }
        })
    }

    fn formulate(&self, availability: &[Availability]) -> MilpModel {
        let horizon = self.prices.horizon();
        let mut variables = ProblemVariables::new();
        let mut run = Vec::with_capacity(self.appliances.len());
        let mut objective = Expression::from(0.0);
        let mut constraints = Vec::new();

        for (appliance, avail) in self.appliances.iter().zip(availability) {
            let vars: Vec<Variable> = (0..horizon)
                .map(|_| variables.add(variable().binary()))
                .collect();

            for (hour, &var) in vars.iter().enumerate() {
                objective += self.prices.price(hour) * appliance.power * var;
                if !avail.is_available(hour) {
                    constraints.push(constraint!(var == 0.0));
                }
            }

            let runtime: Expression = vars.iter().copied().sum();
            let required = appliance.duration as f64;
            constraints.push(constraint!(runtime == required));

            run.push(vars);
        }

        MilpModel {
            variables,
            run,
            objective,
            constraints,
            horizon,
        }
    }
}
