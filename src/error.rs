//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading rota input or configuration files.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("config parse failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the rota pipeline.
#[derive(Error, Debug)]
pub enum RotaError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no people to schedule")]
    EmptyRoster,

    #[error("availability has {found} slots per person, configuration expects {expected}")]
    SlotMismatch { expected: usize, found: usize },

    /// Staffing, availability and capacity cannot all hold. Relax one of them.
    #[error("rota is infeasible: staffing, availability and capacity constraints conflict")]
    Infeasible,

    #[error("no feasible rota found within {time_limit_ms} ms")]
    NoSolutionWithinBudget { time_limit_ms: i64 },

    #[error("solver rejected the model")]
    ModelInvalid,

    /// The backend reported a solution whose values break the model.
    #[error("solver reported {status} but its assignment violates the model")]
    InvalidSolution { status: String },

    #[error(transparent)]
    Input(#[from] InputError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(RotaError::EmptyRoster.to_string(), "no people to schedule");
        assert_eq!(
            InputError::MissingColumn("Mon_am".into()).to_string(),
            "missing column `Mon_am`"
        );
    }

    #[test]
    fn test_input_error_is_transparent() {
        let err: RotaError = InputError::MissingColumn("First".into()).into();
        assert_eq!(err.to_string(), "missing column `First`");
    }

    #[test]
    fn test_infeasible_distinct_from_timeout() {
        let infeasible = RotaError::Infeasible.to_string();
        let timeout = RotaError::NoSolutionWithinBudget { time_limit_ms: 500 }.to_string();
        assert!(infeasible.contains("infeasible"));
        assert!(timeout.contains("500 ms"));
    }

    #[test]
    fn test_invalid_solution_names_status() {
        let err = RotaError::InvalidSolution {
            status: "Feasible".into(),
        };
        assert!(err.to_string().starts_with("solver reported Feasible"));
    }
}
