use thiserror::Error;

use crate::log::StepPhase;

/// Invalid saga configuration, reported before any step runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The step list is empty.
    #[error("saga must have at least one step")]
    NoSteps,

    /// Two steps share a name, which would make log attribution ambiguous.
    #[error("duplicate step name '{0}'")]
    DuplicateStep(String),
}

/// A persisted execution log that cannot be replayed against a step list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RehydrateError {
    /// The log names a step this saga does not have.
    #[error("step '{0}' in the execution log is not part of this saga")]
    UnknownStep(String),

    /// A completed entry does not match the next step in declared order.
    #[error("expected step '{expected}' to complete next, found '{found}'")]
    OutOfOrder {
        /// Step the orchestrator would run next.
        expected: String,
        /// Step named by the log entry.
        found: String,
    },

    /// A compensation entry does not match the next step to compensate.
    #[error("expected compensation of '{expected}', found '{found}'")]
    CompensationOutOfOrder {
        /// Step the orchestrator would compensate next.
        expected: String,
        /// Step named by the log entry.
        found: String,
    },

    /// An entry cannot follow the entries before it.
    #[error("unexpected {phase:?} entry for step '{step}'")]
    UnexpectedEntry {
        /// Step named by the log entry.
        step: String,
        /// Phase of the log entry.
        phase: StepPhase,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_step_error_names_the_step() {
        let err = ConfigError::DuplicateStep("debit".to_string());

        assert_eq!(err.to_string(), "duplicate step name 'debit'");
    }

    #[test]
    fn out_of_order_error_names_both_steps() {
        let err = RehydrateError::OutOfOrder {
            expected: "debit".to_string(),
            found: "activate".to_string(),
        };

        let msg = err.to_string();

        assert!(msg.contains("debit"));
        assert!(msg.contains("activate"));
    }
}
