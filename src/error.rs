//! Error types for the crate.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors produced by the optimizer, the simulation environment and the
/// supporting loaders.
#[derive(Debug, Error)]
pub enum Error {
    /// A price series with zero hours was supplied.
    #[error("price series is empty")]
    EmptyPriceSeries,

    /// A price is negative, NaN or infinite.
    #[error("invalid price {value} at hour {hour}")]
    InvalidPrice { hour: usize, value: f64 },

    /// Structural problems in the input (all detected issues).
    #[error("invalid input: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// Hard constraints cannot be satisfied jointly.
    #[error("infeasible: {reason}")]
    Infeasible { reason: String },

    /// The MILP backend failed for a reason other than infeasibility.
    #[error("solver error: {0}")]
    Solver(String),

    /// `step` was called on a terminated episode.
    #[error("episode already finished; call reset() first")]
    EpisodeFinished,

    /// An action vector does not have one entry per appliance.
    #[error("action has {actual} entries, expected {expected}")]
    ActionLength { expected: usize, actual: usize },

    /// Reward shaping or comfort weights are inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// A formatted hour range could not be parsed back.
    #[error("invalid hour range: {0}")]
    InvalidRange(String),

    /// Malformed scenario JSON.
    #[error("scenario parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scenario source could not be read.
    #[error("scenario read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Infeasibility caused by an appliance needing more hours than its
    /// hard constraints leave usable.
    pub fn insufficient_hours(appliance: &str, required: usize, available: usize) -> Self {
        Error::Infeasible {
            reason: format!(
                "'{appliance}' needs {required} h but only {available} h are usable"
            ),
        }
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_infeasible_message() {
        let err = Error::insufficient_hours("Washer", 3, 1);
        let msg = err.to_string();
        assert!(msg.contains("Washer"));
        assert!(msg.contains("3 h"));
    }

    #[test]
    fn test_validation_message_joins_errors() {
        let err = Error::Validation(vec![
            ValidationError::new(ValidationErrorKind::ZeroDuration, "a"),
            ValidationError::new(ValidationErrorKind::EmptyName, "b"),
        ]);
        assert_eq!(err.to_string(), "invalid input: a; b");
    }
}
