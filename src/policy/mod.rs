//! Policies, trainers and the episode runner.
//!
//! A [`Policy`] maps an observation (and the environment's action mask) to
//! one on/off decision per appliance. A [`PolicyTrainer`] produces a policy
//! by interacting with any [`Environment`]; the
//! crate ships [`ThresholdSearch`] as a reference trainer, and external
//! learners plug in through the same trait.
//!
//! [`PolicyRunner`] executes a policy for one episode and turns the trace
//! into a [`Schedule`](crate::models::Schedule) comparable to the optimizer's.
//!
//! # Usage
//!
//! ```
//! use u_energy::env::EnergyEnv;
//! use u_energy::models::{Appliance, PriceSeries};
//! use u_energy::policy::{PolicyRunner, ThresholdPolicy};
//!
//! let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
//! let mut env = EnergyEnv::new(prices.clone(), vec![Appliance::new("Washer", 1.0, 2)]).unwrap();
//!
//! let mut policy = ThresholdPolicy::new(&prices, 0.2);
//! let outcome = PolicyRunner::new().run(&mut env, &mut policy).unwrap();
//! assert_eq!(outcome.schedule.hours_for("Washer"), &[0, 2]);
//! assert_eq!(outcome.unfinished, 0);
//! ```

mod builtin;
mod runner;
mod search;

pub use builtin::{AlwaysOn, RandomPolicy, ThresholdPolicy};
pub use runner::{PolicyRunner, Rollout, RunOutcome};
pub use search::ThresholdSearch;

use crate::env::Environment;
use crate::error::Result;

/// Decision rule for the simulation environment.
pub trait Policy {
    /// Policy name (e.g., "always-on", "threshold").
    fn name(&self) -> &str;

    /// Chooses one on/off value per appliance.
    ///
    /// `mask[i]` is `false` when switching appliance `i` on cannot do useful
    /// work; policies may ignore it and take the penalty.
    fn act(&mut self, observation: &[f64], mask: &[bool]) -> Vec<bool>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn act(&mut self, observation: &[f64], mask: &[bool]) -> Vec<bool> {
        (**self).act(observation, mask)
    }
}

/// Produces a policy by interacting with an environment.
pub trait PolicyTrainer {
    /// The trained policy type.
    type Policy: Policy;

    /// Trains against `env`. The environment is left in an arbitrary state.
    fn train(&mut self, env: &mut dyn Environment) -> Result<Self::Policy>;
}

/// A policy backed by a closure.
pub struct FnPolicy<F> {
    name: String,
    f: F,
}

impl<F> std::fmt::Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPolicy").field("name", &self.name).finish()
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: FnMut(&[f64], &[bool]) -> Vec<bool>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&mut self, observation: &[f64], mask: &[bool]) -> Vec<bool> {
        (self.f)(observation, mask)
    }
}

/// Wraps a closure `(observation, mask) -> action` as a [`Policy`].
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnPolicy<F>
where
    F: FnMut(&[f64], &[bool]) -> Vec<bool>,
{
    FnPolicy {
        name: name.into(),
        f,
    }
}
