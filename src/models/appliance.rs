//! Appliance model.
//!
//! An appliance is a load that must run for an exact number of hourly
//! slots within the horizon, optionally limited to a set of allowed hours.

use serde::{Deserialize, Serialize};

use super::{catalog, HourSet};

/// A schedulable home appliance.
///
/// # Units
/// `power` is the average draw while running (kW), so one hour of running
/// consumes `power` kWh and costs `power * price[h]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    /// Unique appliance name (unique within one scheduling run).
    pub name: String,
    /// Average power draw while running (kW).
    pub power: f64,
    /// Number of hourly slots the appliance must run.
    pub duration: usize,
    /// Hours the appliance may run in. `None` = any hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_hours: Option<HourSet>,
}

impl Appliance {
    /// Creates an appliance without hour restrictions.
    pub fn new(name: impl Into<String>, power: f64, duration: usize) -> Self {
        Self {
            name: name.into(),
            power,
            duration,
            allowed_hours: None,
        }
    }

    /// Creates an appliance using the catalog's typical power rating.
    ///
    /// Returns `None` if the name is not in the catalog.
    pub fn from_catalog(name: &str, duration: usize) -> Option<Self> {
        catalog::default_power(name).map(|power| Self::new(name, power, duration))
    }

    /// Limits the appliance to the given hours.
    pub fn with_allowed_hours(mut self, hours: impl IntoIterator<Item = usize>) -> Self {
        self.allowed_hours = Some(hours.into_iter().collect());
        self
    }

    /// Whether the appliance's own allowed hours include `hour`.
    ///
    /// Does not account for global restrictions; see
    /// [`Availability`](super::Availability).
    pub fn is_allowed(&self, hour: usize) -> bool {
        self.allowed_hours.as_ref().map_or(true, |a| a.contains(hour))
    }

    /// Energy consumed over a full run (kWh).
    pub fn energy_kwh(&self) -> f64 {
        self.power * self.duration as f64
    }
}
