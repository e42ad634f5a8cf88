use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaperlensError {
    #[error("Document too large: {chars} characters exceeds the limit of {limit}")]
    InputTooLarge { chars: usize, limit: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PaperlensError>;
