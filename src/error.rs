//! Error types shared across the crate
//!
//! The confirmation gate never fails with an error: an unusable token is a
//! [`GateDecision::Invalid`](crate::confirmation::GateDecision::Invalid) value.
//! The types here cover everything around it: building confirmation
//! requests, calling the GitHub API, and the tool adapters themselves.

use thiserror::Error;

use crate::confirmation::DestructiveOperation;

/// Errors raised while building a confirmation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    /// The parameter map does not match the fields the operation declares
    #[error("unexpected parameters for {operation}: expected [{expected}], got [{actual}]")]
    UnexpectedParameters {
        operation: DestructiveOperation,
        expected: String,
        actual: String,
    },

    /// A field was supplied with the wrong kind (scalar vs. set)
    #[error("parameter '{field}' of {operation} must be a {expected} value")]
    WrongParameterKind {
        operation: DestructiveOperation,
        field: String,
        expected: &'static str,
    },
}

/// Failures reported by the remote mutation executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Bad request. The request parameters are invalid.")]
    BadRequest,

    #[error("Unauthorized. Authentication failed.")]
    Unauthorized,

    #[error("Forbidden. You do not have permission to perform this operation.")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse GitHub response: {0}")]
    InvalidResponse(String),
}

impl MutationError {
    /// Maps a non-success HTTP status to the matching variant
    pub fn from_status(status: u16, resource: &str, body: String) -> Self {
        match status {
            400 => MutationError::BadRequest,
            401 => MutationError::Unauthorized,
            403 => MutationError::Forbidden,
            404 => MutationError::NotFound(resource.to_string()),
            _ => MutationError::Api {
                status,
                message: if body.is_empty() {
                    "No message".to_string()
                } else {
                    body
                },
            },
        }
    }
}

/// Errors surfaced by destructive tool adapters
///
/// These are terminal for the current call; the tool layer renders them as
/// JSON error objects and never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0}")]
    AuthenticationRequired(String),

    #[error("Missing required parameters: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Invalid server configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("confirmation token validity must be greater than zero seconds")]
    ZeroValidity,

    #[error("confirmation token validity must not exceed {max} seconds, got {actual}")]
    ValidityTooLong { max: i64, actual: i64 },

    #[error("confirmation secret must not be empty")]
    EmptySecret,

    #[error(
        "confirming requires the same signing secret that issued the token; set --confirmation-secret or GITGUARD_CONFIRMATION_SECRET"
    )]
    SecretRequiredToConfirm,

    #[error(
        "--single-use-tokens needs a long-running server; a one-shot command cannot remember tokens consumed by earlier runs"
    )]
    SingleUseNeedsServer,

    #[error("invalid GitHub API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}
