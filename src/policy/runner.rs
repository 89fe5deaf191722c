//! Episode execution.
//!
//! # Algorithm
//!
//! 1. Reset the environment.
//! 2. Until done (or `max_steps`): ask the policy for an action given the
//!    observation and mask, then step.
//! 3. For [`EnergyEnv`], record hour `h` for appliance `a` only when the
//!    environment reports that `a` actually ran in `h`, and cost the
//!    result with raw prices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Policy;
use crate::env::{EnergyEnv, Environment, StepInfo};
use crate::error::Result;
use crate::models::Schedule;

/// Trace of one episode through any [`Environment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
    /// Actions taken, one per step.
    pub actions: Vec<Vec<bool>>,
    /// Step diagnostics, one per step.
    pub infos: Vec<StepInfo>,
    /// Sum of rewards.
    pub total_reward: f64,
    /// Whether the episode was cut off by `max_steps` before terminating.
    pub truncated: bool,
}

impl Rollout {
    /// Number of steps taken.
    pub fn steps(&self) -> usize {
        self.actions.len()
    }
}

/// Result of running a policy through an [`EnergyEnv`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Hours each appliance actually ran, costed with raw prices.
    pub schedule: Schedule,
    /// Actions taken, one per step.
    pub actions: Vec<Vec<bool>>,
    /// Sum of rewards.
    pub total_reward: f64,
    /// Cumulative normalized cost reported by the environment.
    pub normalized_cost: f64,
    /// Appliance-hours left unfinished.
    pub unfinished: usize,
    /// Whether `max_steps` cut the episode short.
    pub truncated: bool,
}

/// Runs policies for one episode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyRunner {
    max_steps: Option<usize>,
}

impl PolicyRunner {
    /// Creates a runner that steps until the environment reports done.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of steps per episode.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Executes one episode through any environment.
    ///
    /// # Errors
    /// Propagates step errors, e.g. [`crate::Error::ActionLength`] when the
    /// policy returns a wrong-length action.
    pub fn rollout<P: Policy + ?Sized>(
        &self,
        env: &mut dyn Environment,
        policy: &mut P,
    ) -> Result<Rollout> {
        let mut observation = env.reset();
        let mut rollout = Rollout::default();

        while !env.is_done() {
            if self.max_steps.is_some_and(|max| rollout.steps() >= max) {
                rollout.truncated = true;
                break;
            }
            let mask = env.action_mask();
            let action = policy.act(&observation, &mask);
            let transition = env.step(&action)?;

            rollout.total_reward += transition.reward;
            rollout.actions.push(action);
            rollout.infos.push(transition.info);
            observation = transition.observation;
        }

        debug!(
            policy = policy.name(),
            steps = rollout.steps(),
            total_reward = rollout.total_reward,
            truncated = rollout.truncated,
            "rollout finished"
        );
        Ok(rollout)
    }

    /// Executes one episode and converts it into a [`Schedule`].
    pub fn run<P: Policy + ?Sized>(&self, env: &mut EnergyEnv, policy: &mut P) -> Result<RunOutcome> {
        let rollout = self.rollout(env, policy)?;

        let mut hours: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for info in &rollout.infos {
            for (appliance, _) in env
                .appliances()
                .iter()
                .zip(&info.ran)
                .filter(|(_, &ran)| ran)
            {
                hours
                    .entry(appliance.name.clone())
                    .or_default()
                    .push(info.hour);
            }
        }

        let schedule = Schedule::costed(&hours, env.appliances(), env.prices());
        let unfinished: usize = env.remaining().iter().sum();
        if unfinished > 0 {
            warn!(
                policy = policy.name(),
                unfinished, "policy left appliances unfinished"
            );
        }

        Ok(RunOutcome {
            schedule,
            normalized_cost: rollout.infos.last().map_or(0.0, |i| i.total_cost),
            actions: rollout.actions,
            total_reward: rollout.total_reward,
            unfinished,
            truncated: rollout.truncated,
        })
    }
}
