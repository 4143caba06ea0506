use thiserror::Error;

/// Errors surfaced by the solver's core and its graph-loading collaborator.
///
/// `InvalidInput` covers malformed external data (graph files, CLI parameters);
/// `Invariant` covers conditions that should never occur for a correctly
/// implemented solver and indicate a bug rather than bad input.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Error::Invariant(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
