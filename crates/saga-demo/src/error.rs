use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid saga configuration")]
    Config(#[from] saga_core::ConfigError),

    #[error("saga state error")]
    State(#[from] saga_state::StateError),

    #[error("failed to encode result as JSON")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
