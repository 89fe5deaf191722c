//! Household appliance scheduling under time-varying electricity prices.
//!
//! Given hourly prices and a set of appliances (power, required run time,
//! optional allowed hours), finds when each appliance should run. Two
//! decision approaches share one domain model:
//!
//! - an exact 0/1 MILP that returns a cost-optimal schedule, and
//! - an episodic simulation environment in which policies (hand-written or
//!   trained) switch appliances on hour by hour.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `PriceSeries`, `Appliance`, `HourSet`,
//!   `Preference`, `Schedule`, `Assignment`
//! - **`validation`**: Input integrity checks (names, power, durations, hour ranges)
//! - **`milp`**: Exact optimizer (`good_lp` formulation)
//! - **`scheduler`**: Greedy baselines and the comfort score
//! - **`env`**: `Environment` trait and the reward-shaped `EnergyEnv`
//! - **`policy`**: `Policy`/`PolicyTrainer` traits, built-in policies, episode runner
//! - **`format`**: Hour-range rendering (`"0:00–1:00, 2:00–3:00"`)
//! - **`planner`**: Solve → verify → format → score → compare pipeline
//! - **`config`**: Reward shaping, comfort weights, JSON scenarios
//!
//! # Example
//!
//! ```
//! use u_energy::config::Scenario;
//! use u_energy::models::{Appliance, PriceSeries};
//! use u_energy::planner::Planner;
//!
//! let prices = PriceSeries::new(vec![0.10, 0.50, 0.05, 0.20]).unwrap();
//! let scenario = Scenario::new(prices, vec![Appliance::new("Washer", 1.0, 2)]);
//!
//! let report = Planner::default().plan(&scenario).unwrap();
//! assert_eq!(report.schedule.hours_for("Washer"), &[0, 2]);
//! ```
//!
//! # Logging
//!
//! All diagnostics go through `tracing`. The crate never installs a
//! subscriber.
//!
//! # References
//!
//! - Mohsenian-Rad et al. (2010), "Autonomous Demand-Side Management Based
//!   on Game-Theoretic Energy Consumption Scheduling"
//! - Wolsey (2020), "Integer Programming"
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction"

pub mod config;
pub mod env;
pub mod error;
pub mod format;
pub mod milp;
pub mod models;
pub mod planner;
pub mod policy;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
