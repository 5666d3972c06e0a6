//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-2xx answer from Graph. `body` is the compact JSON error payload or raw text.
    #[error("Graph API error {status}: {body}")]
    Graph { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No member with UPN/email {upn} in {container}")]
    MemberNotFound { upn: String, container: String },

    #[error("File operation failed: {0}")]
    Io(String),

    #[error("Prompt failed: {0}")]
    Ui(String),
}

impl DomainError {
    /// HTTP status for Graph errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DomainError::Graph { status, .. } => Some(*status),
            _ => None,
        }
    }
}
