// ⚠️ Error Taxonomy
// Typed domain failures surfaced to the caller as user-facing messages;
// none of these are fatal - callers retry or fall back

use thiserror::Error;

/// Credential store / session manager failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("This username is already taken")]
    DuplicateUsername,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

/// Remote question generation failures.
/// Both are recoverable: the static question list is always available.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No valid JSON object found in the model's response: {0}")]
    InvalidResponseFormat(String),

    #[error("No valid questions generated")]
    NoValidQuestions,
}
