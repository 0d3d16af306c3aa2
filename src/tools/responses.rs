//! Response types for the destructive tools
//!
//! Every tool answers with a JSON object in one of these shapes:
//!
//! - [`ConfirmationRequiredResponse`]: a token was minted, nothing was deleted
//! - [`ErrorResponse`]: authentication, validation, token or GitHub failure
//! - [`MessageResponse`]: the deletion succeeded
//! - [`FileDeletionResponse`]: per-file results of `delete_files`

use serde::{Deserialize, Serialize};

use crate::confirmation::{ConfirmationParams, InvalidConfirmation};
use crate::error::ToolError;
use crate::services::{DestructiveOutcome, FileDeletionResult};

pub const CONFIRM_DELETION_ACTION: &str = "confirm_deletion";

/// Returned when the caller must confirm before anything is deleted
///
/// ```json
/// {
///   "message": "Confirmation required to delete branch 'feat' in repository 'o/r'. ...",
///   "confirmation_token": "eyJ2IjoxLC...",
///   "action": "confirm_deletion"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequiredResponse {
    pub message: String,
    pub confirmation_token: String,
    pub action: String,
}

/// Token and request parameters echoed back on a mismatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchDetails {
    pub token_operation: String,
    pub request_operation: String,
    pub token_params: ConfirmationParams,
    pub request_params: ConfirmationParams,
}

/// Returned for every failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Only set for authentication failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub error: String,
    /// Machine-readable reason for rejected confirmation tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MismatchDetails>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: None,
            error: error.into(),
            reason: None,
            details: None,
        }
    }
}

impl From<&ToolError> for ErrorResponse {
    fn from(err: &ToolError) -> Self {
        match err {
            ToolError::AuthenticationRequired(message) => Self {
                status: Some("error".to_string()),
                ..Self::new(message.clone())
            },
            other => Self::new(other.to_string()),
        }
    }
}

impl From<&InvalidConfirmation> for ErrorResponse {
    fn from(invalid: &InvalidConfirmation) -> Self {
        let details = match invalid {
            InvalidConfirmation::ParameterMismatch {
                token_operation,
                request_operation,
                token_params,
                request_params,
            } => Some(MismatchDetails {
                token_operation: token_operation.to_string(),
                request_operation: request_operation.to_string(),
                token_params: token_params.clone(),
                request_params: request_params.clone(),
            }),
            _ => None,
        };

        Self {
            status: None,
            error: invalid.to_string(),
            reason: Some(invalid.reason().to_string()),
            details,
        }
    }
}

/// Returned when a single-target deletion succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Returned by `delete_files` once the batch has run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDeletionResponse {
    pub responses: Vec<FileDeletionResult>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize response: {}\"}}", e))
}

/// Renders any adapter result as the tool's JSON response
///
/// `completed` shapes the success payload of the specific operation.
pub fn render_outcome<T, F, R>(result: Result<DestructiveOutcome<T>, ToolError>, completed: F) -> String
where
    F: FnOnce(T) -> R,
    R: Serialize,
{
    match result {
        Ok(DestructiveOutcome::ConfirmationRequired { token, summary }) => {
            to_json(&ConfirmationRequiredResponse {
                message: summary,
                confirmation_token: token,
                action: CONFIRM_DELETION_ACTION.to_string(),
            })
        }
        Ok(DestructiveOutcome::Rejected(invalid)) => to_json(&ErrorResponse::from(&invalid)),
        Ok(DestructiveOutcome::Completed(value)) => to_json(&completed(value)),
        Err(err) => to_json(&ErrorResponse::from(&err)),
    }
}

/// Renders an outcome whose success payload is a plain message
pub fn render_message(result: Result<DestructiveOutcome<String>, ToolError>) -> String {
    render_outcome(result, |message| MessageResponse { message })
}

/// Renders the outcome of `delete_files`
pub fn render_file_deletions(
    result: Result<DestructiveOutcome<Vec<FileDeletionResult>>, ToolError>,
) -> String {
    render_outcome(result, |responses| FileDeletionResponse { responses })
}
