//! Schedule (solution) model.
//!
//! A schedule maps each appliance to the hours it runs in. Both the exact
//! optimizer and the policy runner produce this type, so their results
//! can be costed, verified, formatted and scored the same way.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{merge_ranges, Appliance, HourRange, HourSet, Preferences, PriceSeries};

/// A complete appliance schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// One entry per appliance, in catalog order.
    pub assignments: Vec<Assignment>,
    /// Sum of assignment costs (raw prices).
    pub total_cost: f64,
}

/// The hours assigned to one appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Appliance name.
    pub appliance: String,
    /// Hours the appliance runs in, ascending and unique.
    pub hours: Vec<usize>,
    /// Energy cost of these hours (raw prices).
    pub cost: f64,
}

/// A hard-constraint violation found by [`Schedule::verify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Appliance concerned.
    pub appliance: String,
    /// Offending hour, if the violation is about a single hour.
    pub hour: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Assigned hour count differs from the required duration.
    WrongDuration,
    /// Appliance runs in a globally restricted hour.
    RestrictedHour,
    /// Appliance runs outside its allowed hours.
    OutsideAllowedHours,
    /// Appliance runs in a hard-avoided hour.
    AvoidedHour,
    /// Hour index lies outside the horizon.
    HourOutOfRange,
    /// Assignment names an appliance not in the catalog.
    UnknownAppliance,
}

impl Assignment {
    /// Creates an assignment; hours are sorted and deduplicated.
    pub fn new(appliance: impl Into<String>, hours: impl IntoIterator<Item = usize>) -> Self {
        let mut hours: Vec<usize> = hours.into_iter().collect();
        hours.sort_unstable();
        hours.dedup();
        Self {
            appliance: appliance.into(),
            hours,
            cost: 0.0,
        }
    }

    /// Sets the cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Number of scheduled hours.
    #[inline]
    pub fn hour_count(&self) -> usize {
        self.hours.len()
    }

    /// Whether no hours are scheduled.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Scheduled hours merged into consecutive ranges.
    pub fn ranges(&self) -> Vec<HourRange> {
        merge_ranges(&self.hours)
    }
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        appliance: &str,
        hour: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            appliance: appliance.to_string(),
            hour,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from per-appliance hour lists, costing every
    /// assignment with the raw prices.
    ///
    /// Appliances without a matching entry get an empty assignment, so the
    /// result always lists the whole catalog in catalog order.
    pub fn costed(
        hours: &BTreeMap<String, Vec<usize>>,
        appliances: &[Appliance],
        prices: &PriceSeries,
    ) -> Self {
        let mut schedule = Self::new();
        for appliance in appliances {
            let assigned = hours.get(&appliance.name).cloned().unwrap_or_default();
            let assignment = Assignment::new(&appliance.name, assigned);
            let cost = prices.cost_of(&assignment.hours, appliance.power);
            schedule.add_assignment(assignment.with_cost(cost));
        }
        schedule
    }

    /// Adds an assignment and accumulates its cost.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.total_cost += assignment.cost;
        self.assignments.push(assignment);
    }

    /// Finds the assignment for an appliance.
    pub fn assignment_for(&self, appliance: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.appliance == appliance)
    }

    /// Hours assigned to an appliance (empty if unknown).
    pub fn hours_for(&self, appliance: &str) -> &[usize] {
        self.assignment_for(appliance)
            .map(|a| a.hours.as_slice())
            .unwrap_or(&[])
    }

    /// Appliance → hours map.
    pub fn to_hour_map(&self) -> BTreeMap<String, Vec<usize>> {
        self.assignments
            .iter()
            .map(|a| (a.appliance.clone(), a.hours.clone()))
            .collect()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Total scheduled appliance-hours.
    pub fn total_hours(&self) -> usize {
        self.assignments.iter().map(Assignment::hour_count).sum()
    }

    /// Whether every appliance has exactly its required duration.
    pub fn is_complete(&self, appliances: &[Appliance]) -> bool {
        appliances
            .iter()
            .all(|a| self.hours_for(&a.name).len() == a.duration)
    }

    /// Checks every hard constraint and returns all violations.
    ///
    /// # Checks
    /// 1. Every assignment names a known appliance.
    /// 2. Hours lie inside the horizon.
    /// 3. No hour is globally restricted.
    /// 4. Hours are within the appliance's allowed hours.
    /// 5. No hour is hard-avoided by the appliance's preference.
    /// 6. Hour count equals the required duration.
    pub fn verify(
        &self,
        appliances: &[Appliance],
        horizon: usize,
        restricted: &HourSet,
        preferences: &Preferences,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        let known: HashSet<&str> = appliances.iter().map(|a| a.name.as_str()).collect();

        for assignment in &self.assignments {
            if !known.contains(assignment.appliance.as_str()) {
                violations.push(Violation::new(
                    ViolationType::UnknownAppliance,
                    &assignment.appliance,
                    None,
                    format!("Unknown appliance '{}'", assignment.appliance),
                ));
            }
        }

        for appliance in appliances {
            let name = appliance.name.as_str();
            let hours = self.hours_for(name);
            let preference = preferences.get(name);

            for &hour in hours {
                if hour >= horizon {
                    violations.push(Violation::new(
                        ViolationType::HourOutOfRange,
                        name,
                        Some(hour),
                        format!("'{name}' scheduled at hour {hour} beyond horizon {horizon}"),
                    ));
                    continue;
                }
                if restricted.contains(hour) {
                    violations.push(Violation::new(
                        ViolationType::RestrictedHour,
                        name,
                        Some(hour),
                        format!("'{name}' runs in restricted hour {hour}"),
                    ));
                }
                if !appliance.is_allowed(hour) {
                    violations.push(Violation::new(
                        ViolationType::OutsideAllowedHours,
                        name,
                        Some(hour),
                        format!("'{name}' runs outside its allowed hours at {hour}"),
                    ));
                }
                if preference.is_some_and(|p| p.forbids(hour)) {
                    violations.push(Violation::new(
                        ViolationType::AvoidedHour,
                        name,
                        Some(hour),
                        format!("'{name}' runs in hard-avoided hour {hour}"),
                    ));
                }
            }

            if hours.len() != appliance.duration {
                violations.push(Violation::new(
                    ViolationType::WrongDuration,
                    name,
                    None,
                    format!(
                        "'{name}' runs {} h, requires {} h",
                        hours.len(),
                        appliance.duration
                    ),
                ));
            }
        }

        violations
    }
}
