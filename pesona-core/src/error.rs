use thiserror::Error;

/// Error taxonomy shared by every component behind the HTTP surface.
///
/// Business-rule failures carry a human-readable message; `Persistence`
/// wraps whatever the store reported and is never shown to clients.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("account disabled")]
    AccountDisabled,

    #[error("{0}")]
    NotEligible(String),

    #[error("{0}")]
    Conflict(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        CoreError::Persistence(err.to_string())
    }
}
