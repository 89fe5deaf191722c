//! Scheduling domain models.
//!
//! Provides the data types for appliance scheduling problems and their
//! solutions. All inputs are plain, validated records; nothing here holds
//! mutable state across calls.
//!
//! | Type | Meaning |
//! |------|---------|
//! | `PriceSeries` | per-hour price, its length is the horizon `H` |
//! | `Appliance` | load with power, exact duration, optional allowed hours |
//! | `HourSet` | restricted / allowed / preference hours |
//! | `Preference` | soft (or hard-avoid) comfort preference |
//! | `Schedule` | appliance → hours, with costs |

mod appliance;
pub mod catalog;
mod hours;
mod preference;
mod price;
mod schedule;

pub use appliance::Appliance;
pub use hours::{merge_ranges, Availability, HourRange, HourSet};
pub use preference::{Preference, Preferences, DEFAULT_STRENGTH, STRENGTH_RANGE};
pub use price::PriceSeries;
pub use schedule::{Assignment, Schedule, Violation, ViolationType};
