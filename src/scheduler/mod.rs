//! Greedy baselines and comfort evaluation.
//!
//! # Algorithm
//!
//! `GreedyScheduler` picks hours per appliance, either as early as possible
//! (the "no optimization" baseline) or in the cheapest usable hours. It is
//! fast and needs no solver.
//!
//! # Comfort
//!
//! `ComfortScore` measures how well a schedule matches the users'
//! avoid/preferred hours, on a 0-10 scale.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Mohsenian-Rad et al. (2010), "Autonomous Demand-Side Management Based
//!   on Game-Theoretic Energy Consumption Scheduling"

mod comfort;
mod greedy;

pub use comfort::{ApplianceComfort, ComfortScore, MAX_SCORE};
pub use greedy::{GreedyMode, GreedyScheduler};
