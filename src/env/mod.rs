//! Episodic simulation environment for appliance scheduling.
//!
//! One episode covers the whole price horizon, one step per hour. At every
//! step the agent switches each appliance on or off; the environment charges
//! the (normalized) energy cost and shaping penalties, and reports a reward
//! of `-(cost + penalties)` plus an optional comfort term.
//!
//! # Interface
//!
//! [`Environment`] is the seam between the simulator and anything that
//! learns or evaluates policies. [`EnergyEnv`] is the appliance
//! implementation.
//!
//! # Reference
//! Brockman et al. (2016), "OpenAI Gym"; Sutton & Barto (2018),
//! "Reinforcement Learning: An Introduction", Ch. 3 (finite MDPs).

mod energy;

pub use energy::EnergyEnv;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Observation vector: `[current_hour, remaining_0, remaining_1, ...]`.
pub type Observation = Vec<f64>;

/// Result of one [`Environment::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation after the step.
    pub observation: Observation,
    /// Scalar reward for the step.
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
    /// Diagnostics.
    pub info: StepInfo,
}

/// Per-step diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Hour the step simulated.
    pub hour: usize,
    /// Energy cost of this step at normalized prices.
    pub cost: f64,
    /// Energy cost of this step at raw prices.
    pub raw_cost: f64,
    /// Shaping penalties charged this step.
    pub penalty: f64,
    /// Comfort shaping term (positive = preferred, negative = avoided).
    pub comfort: f64,
    /// Cumulative normalized cost of the episode.
    pub total_cost: f64,
    /// Which appliances actually ran, by appliance index.
    pub ran: Vec<bool>,
}

/// A discrete-time, episodic control problem with boolean action vectors.
///
/// Each call to [`step`](Environment::step) advances the simulation by one
/// action and returns the new observation, the reward and whether the
/// episode ended.
pub trait Environment {
    /// Resets to the initial state and returns the initial observation.
    fn reset(&mut self) -> Observation;

    /// Applies one action (one bool per appliance).
    ///
    /// # Errors
    /// - [`crate::Error::EpisodeFinished`] if the episode already ended.
    /// - [`crate::Error::ActionLength`] for a wrong-length action.
    fn step(&mut self, action: &[bool]) -> Result<Transition>;

    /// Current observation.
    fn observation(&self) -> Observation;

    /// Length of the observation vector.
    fn observation_size(&self) -> usize;

    /// Length of the action vector.
    fn action_size(&self) -> usize;

    /// Which action entries can do useful work in the current state.
    fn action_mask(&self) -> Vec<bool>;

    /// Whether the episode has terminated.
    fn is_done(&self) -> bool;
}
