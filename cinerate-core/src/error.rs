use thiserror::Error;

/// Error taxonomy for the core library.
///
/// Upstream failures carry the third-party status code and message verbatim;
/// they are surfaced to the caller, never retried. Consistency errors (a
/// duplicate-key loss on the import race) are handled inside the import
/// pipeline and should not reach a handler.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("upstream metadata service error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("consistency error: {0}")]
    Consistency(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<cinerate_model::ModelError> for CoreError {
    fn from(err: cinerate_model::ModelError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
