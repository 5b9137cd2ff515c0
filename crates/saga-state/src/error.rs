use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read saga state file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write saga state file '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse saga state file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize saga state for '{path}'")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid saga id '{0}'")]
    InvalidSagaId(String),

    #[error("no saved state for saga '{0}'")]
    NotFound(String),

    #[error("saga '{saga_id}' belongs to workflow '{found}', not '{expected}'")]
    WorkflowMismatch {
        saga_id: String,
        expected: String,
        found: String,
    },

    #[error("saved state for saga '{saga_id}' does not match the saga's steps")]
    Rehydrate {
        saga_id: String,
        #[source]
        source: saga_core::RehydrateError,
    },
}

pub type Result<T> = std::result::Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_includes_path() {
        let err = StateError::Read {
            path: PathBuf::from("/state/order-1.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.to_string().contains("/state/order-1.json"));
    }

    #[test]
    fn rehydrate_error_exposes_source() {
        let err = StateError::Rehydrate {
            saga_id: "order-1".to_string(),
            source: saga_core::RehydrateError::UnknownStep("ship".to_string()),
        };

        let source = std::error::Error::source(&err).expect("has a source");
        assert!(source.to_string().contains("ship"));
    }
}
