//! Input validation for appliance scheduling problems.
//!
//! Checks structural integrity of appliances, restricted hours and
//! preferences before scheduling. Detects:
//! - Duplicate or empty appliance names
//! - Non-positive power, zero duration
//! - Durations that cannot fit the horizon or the allowed hours
//! - Hour indices outside the horizon
//! - Preferences for unknown appliances, strength outside 1-5
//!
//! All checks run and every problem is reported, not just the first.
//! Capacity problems (duration vs. usable hours) are kept apart from
//! structural ones so that the optimizer can report them as infeasibility.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::{Appliance, Availability, HourSet, Preferences, STRENGTH_RANGE};

/// Validation result.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two appliances share the same name.
    DuplicateName,
    /// An appliance has an empty name.
    EmptyName,
    /// Power is zero, negative or not finite.
    NonPositivePower,
    /// Duration is zero.
    ZeroDuration,
    /// Duration exceeds the number of hours in the horizon.
    DurationExceedsHorizon,
    /// Fewer allowed hours than the required duration.
    InsufficientAllowedHours,
    /// An hour index lies outside the horizon.
    HourOutOfRange,
    /// A preference strength lies outside 1-5.
    InvalidStrength,
    /// A preference references an appliance that doesn't exist.
    UnknownAppliance,
}

impl ValidationErrorKind {
    /// Whether this error is about durations not fitting the usable hours.
    ///
    /// These surface as [`Error::Infeasible`] from the solvers.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::DurationExceedsHorizon | Self::InsufficientAllowedHours
        )
    }
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the appliance catalog against a horizon.
///
/// Checks:
/// 1. No empty and no duplicate names
/// 2. Power finite and > 0
/// 3. Duration > 0 and <= horizon
/// 4. Allowed hours inside the horizon
/// 5. At least `duration` allowed hours
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(appliances: &[Appliance], horizon: usize) -> ValidationResult {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for a in appliances {
        if a.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                "Appliance with empty name",
            ));
        } else if !names.insert(a.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate appliance name: {}", a.name),
            ));
        }

        if !a.power.is_finite() || a.power <= 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositivePower,
                format!("Appliance '{}' has invalid power {}", a.name, a.power),
            ));
        }

        if a.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("Appliance '{}' has zero duration", a.name),
            ));
        } else if a.duration > horizon {
            errors.push(ValidationError::new(
                ValidationErrorKind::DurationExceedsHorizon,
                format!(
                    "Appliance '{}' needs {} h but the horizon has {} h",
                    a.name, a.duration, horizon
                ),
            ));
        }

        if let Some(allowed) = &a.allowed_hours {
            for hour in allowed.out_of_range(horizon) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::HourOutOfRange,
                    format!("Appliance '{}' allows hour {hour} outside the horizon", a.name),
                ));
            }
            if allowed.len() < a.duration {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InsufficientAllowedHours,
                    format!(
                        "Appliance '{}' needs {} h but allows only {}",
                        a.name,
                        a.duration,
                        allowed.len()
                    ),
                ));
            }
        }
    }

    into_result(errors)
}

/// Validates that every hour of a global restriction lies in the horizon.
pub fn validate_hours(hours: &HourSet, horizon: usize) -> ValidationResult {
    let errors = hours
        .out_of_range(horizon)
        .into_iter()
        .map(|hour| {
            ValidationError::new(
                ValidationErrorKind::HourOutOfRange,
                format!("Restricted hour {hour} outside the horizon of {horizon} h"),
            )
        })
        .collect();
    into_result(errors)
}

/// Validates preferences against the appliance catalog.
///
/// Checks:
/// 1. Each preference names a known appliance
/// 2. Strength in 1-5
/// 3. Avoid/preferred hours inside the horizon
pub fn validate_preferences(
    preferences: &Preferences,
    appliances: &[Appliance],
    horizon: usize,
) -> ValidationResult {
    let mut errors = Vec::new();
    let names: HashSet<&str> = appliances.iter().map(|a| a.name.as_str()).collect();

    for (name, pref) in preferences {
        if !names.contains(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownAppliance,
                format!("Preference for unknown appliance '{name}'"),
            ));
        }
        if !pref.has_valid_strength() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidStrength,
                format!(
                    "Preference for '{name}' has strength {} (expected {}-{})",
                    pref.strength,
                    STRENGTH_RANGE.start(),
                    STRENGTH_RANGE.end()
                ),
            ));
        }
        for hour in pref
            .avoid_hours
            .out_of_range(horizon)
            .into_iter()
            .chain(pref.preferred_hours.out_of_range(horizon))
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::HourOutOfRange,
                format!("Preference for '{name}' names hour {hour} outside the horizon"),
            ));
        }
    }

    into_result(errors)
}

/// Runs every structural check and rejects anything but capacity issues.
///
/// Used where an unfinishable appliance is acceptable (the simulation
/// environment penalizes it instead of refusing it).
pub fn check_structure(
    appliances: &[Appliance],
    horizon: usize,
    restricted: &HourSet,
    preferences: &Preferences,
) -> Result<()> {
    let mut errors = Vec::new();
    for result in [
        validate_input(appliances, horizon),
        validate_hours(restricted, horizon),
        validate_preferences(preferences, appliances, horizon),
    ] {
        if let Err(mut found) = result {
            errors.append(&mut found);
        }
    }
    errors.retain(|e| !e.kind.is_capacity());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// Full pre-solve check: structure first, then per-appliance feasibility.
///
/// # Returns
/// The availability of every appliance, in catalog order.
///
/// # Errors
/// - [`Error::Validation`] for structural problems.
/// - [`Error::Infeasible`] for the first appliance whose duration exceeds
///   its usable hours (allowed, minus restricted, minus hard-avoided).
pub fn check_feasibility(
    appliances: &[Appliance],
    horizon: usize,
    restricted: &HourSet,
    preferences: &Preferences,
) -> Result<Vec<Availability>> {
    check_structure(appliances, horizon, restricted, preferences)?;

    appliances
        .iter()
        .map(|a| {
            let availability =
                Availability::for_appliance(a, horizon, restricted, preferences.get(&a.name));
            let usable = availability.available_count();
            if usable < a.duration {
                Err(Error::insufficient_hours(&a.name, a.duration, usable))
            } else {
                Ok(availability)
            }
        })
        .collect()
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preference;

    fn sample_appliances() -> Vec<Appliance> {
        vec![
            Appliance::new("Washer", 0.5, 2),
            Appliance::new("Dryer", 1.0, 1).with_allowed_hours([6, 7, 8]),
            Appliance::new("Dishwasher", 1.2, 2),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_appliances(), 24).is_ok());
    }

    #[test]
    fn test_duplicate_name() {
        let appliances = vec![
            Appliance::new("Washer", 0.5, 2),
            Appliance::new("Washer", 0.7, 1),
        ];
        let errors = validate_input(&appliances, 24).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateName));
    }

    #[test]
    fn test_empty_name_and_bad_power() {
        let appliances = vec![
            Appliance::new("", 0.5, 1),
            Appliance::new("Heater", 0.0, 1),
            Appliance::new("Lamp", f64::NAN, 1),
        ];
        let errors = validate_input(&appliances, 24).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::EmptyName));
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::NonPositivePower)
                .count(),
            2
        );
    }

    #[test]
    fn test_zero_duration() {
        let errors = validate_input(&[Appliance::new("Iron", 1.8, 0)], 24).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::ZeroDuration);
    }

    #[test]
    fn test_duration_exceeds_horizon() {
        let errors = validate_input(&[Appliance::new("Heater", 2.0, 5)], 4).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::DurationExceedsHorizon);
        assert!(errors[0].kind.is_capacity());
    }

    #[test]
    fn test_allowed_hours_checks() {
        let appliances = vec![Appliance::new("Oven", 2.3, 3).with_allowed_hours([1, 30])];
        let errors = validate_input(&appliances, 24).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::HourOutOfRange));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InsufficientAllowedHours));
    }

    #[test]
    fn test_restricted_hours_range() {
        assert!(validate_hours(&HourSet::from([0, 23]), 24).is_ok());
        let errors = validate_hours(&HourSet::from([24]), 24).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::HourOutOfRange);
    }

    #[test]
    fn test_preferences() {
        let mut prefs = Preferences::new();
        prefs.insert("Washer".into(), Preference::new(3).with_avoid_hours([22]));
        assert!(validate_preferences(&prefs, &sample_appliances(), 24).is_ok());

        prefs.insert("Sauna".into(), Preference::new(9).with_preferred_hours([40]));
        let errors = validate_preferences(&prefs, &sample_appliances(), 24).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownAppliance));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidStrength));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::HourOutOfRange));
    }

    #[test]
    fn test_check_structure_ignores_capacity() {
        let appliances = vec![Appliance::new("Heater", 2.0, 10)];
        assert!(check_structure(&appliances, 4, &HourSet::new(), &Preferences::new()).is_ok());

        let appliances = vec![Appliance::new("Heater", -2.0, 1)];
        let err =
            check_structure(&appliances, 4, &HourSet::new(), &Preferences::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_check_feasibility_restricted() {
        // Dryer allows 6,7,8; all restricted → infeasible
        let restricted = HourSet::from([6, 7, 8]);
        let err = check_feasibility(&sample_appliances(), 24, &restricted, &Preferences::new())
            .unwrap_err();
        assert!(matches!(err, Error::Infeasible { .. }));
        assert!(err.to_string().contains("Dryer"));
    }

    #[test]
    fn test_check_feasibility_hard_avoid() {
        let appliances = vec![Appliance::new("Washer", 0.5, 2).with_allowed_hours([0, 1, 2])];
        let mut prefs = Preferences::new();
        prefs.insert("Washer".into(), Preference::new(2).with_avoid_hours([0, 1]).hard());
        let err = check_feasibility(&appliances, 4, &HourSet::new(), &prefs).unwrap_err();
        assert!(matches!(err, Error::Infeasible { .. }));

        // Same avoid list as a soft preference is fine
        prefs.insert("Washer".into(), Preference::new(2).with_avoid_hours([0, 1]));
        let avail = check_feasibility(&appliances, 4, &HourSet::new(), &prefs).unwrap();
        assert_eq!(avail[0].available_hours(), vec![0, 1, 2]);
    }

    #[test]
    fn test_multiple_errors() {
        let appliances = vec![Appliance::new("", 0.0, 0)];
        let errors = validate_input(&appliances, 24).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
