//! Tests for the JSON responses returned by the MCP tools

use rmcp::ServerHandler;
use serde_json::{Value, json};

use gitguard_mcp::config::ServerConfig;
use gitguard_mcp::confirmation::{ConfirmationRequest, InvalidConfirmation};
use gitguard_mcp::error::{MutationError, ToolError};
use gitguard_mcp::services::{DestructiveOutcome, FileDeletionResult};
use gitguard_mcp::session::AUTHENTICATION_REQUIRED_MESSAGE;
use gitguard_mcp::tools::GitGuardTools;
use gitguard_mcp::tools::responses::{render_file_deletions, render_message};

fn parse(output: &str) -> Value {
    serde_json::from_str(output).expect("tool output is JSON")
}

#[test]
fn test_confirmation_required_shape() {
    let output = render_message(Ok(DestructiveOutcome::ConfirmationRequired {
        token: "abc.def".to_string(),
        summary: "Confirmation required to delete repository 'o/r'.".to_string(),
    }));

    assert_eq!(
        parse(&output),
        json!({
            "message": "Confirmation required to delete repository 'o/r'.",
            "confirmation_token": "abc.def",
            "action": "confirm_deletion",
        })
    );
}

#[test]
fn test_success_message_shape() {
    let output = render_message(Ok(DestructiveOutcome::Completed(
        "Branch 'feat' deleted successfully.".to_string(),
    )));

    assert_eq!(
        parse(&output),
        json!({ "message": "Branch 'feat' deleted successfully." })
    );
}

#[test]
fn test_authentication_error_carries_status() {
    let output = render_message(Err(ToolError::AuthenticationRequired(
        AUTHENTICATION_REQUIRED_MESSAGE.to_string(),
    )));

    assert_eq!(
        parse(&output),
        json!({ "status": "error", "error": AUTHENTICATION_REQUIRED_MESSAGE })
    );
}

#[test]
fn test_missing_parameter_error() {
    let output = render_message(Err(ToolError::MissingParameter("repo")));
    assert_eq!(
        parse(&output),
        json!({ "error": "Missing required parameters: repo" })
    );
}

#[test]
fn test_remote_error_message() {
    let output = render_message(Err(ToolError::Mutation(MutationError::Forbidden)));
    assert_eq!(
        parse(&output),
        json!({ "error": "Forbidden. You do not have permission to perform this operation." })
    );
}

#[test]
fn test_expired_token_error() {
    let output = render_message(Ok(DestructiveOutcome::Rejected(
        InvalidConfirmation::Expired {
            issued_at: 1_700_000_000,
            age_secs: 301,
        },
    )));

    assert_eq!(
        parse(&output),
        json!({
            "error": "Confirmation token has expired. Please request a new token.",
            "reason": "expired",
        })
    );
}

#[test]
fn test_mismatch_error_includes_both_parameter_sets() {
    let token_request = ConfirmationRequest::delete_files("o/r", "main", ["b.txt", "a.txt"]);
    let request = ConfirmationRequest::delete_files("o/r", "main", ["a.txt"]);

    let output = render_message(Ok(DestructiveOutcome::Rejected(
        InvalidConfirmation::ParameterMismatch {
            token_operation: token_request.operation(),
            request_operation: request.operation(),
            token_params: token_request.params().clone(),
            request_params: request.params().clone(),
        },
    )));

    let value = parse(&output);
    assert_eq!(value["reason"], "parameter mismatch");
    assert_eq!(value["details"]["token_operation"], "delete_files");
    assert_eq!(value["details"]["request_operation"], "delete_files");
    assert_eq!(
        value["details"]["token_params"],
        json!({ "branch": "main", "file_paths": ["a.txt", "b.txt"], "repo": "o/r" })
    );
    assert_eq!(
        value["details"]["request_params"]["file_paths"],
        json!(["a.txt"])
    );
}

#[test]
fn test_file_deletion_results_shape() {
    let output = render_file_deletions(Ok(DestructiveOutcome::Completed(vec![
        FileDeletionResult {
            file_path: "a.txt".to_string(),
            message: Some("File deleted successfully.".to_string()),
            error: None,
        },
        FileDeletionResult {
            file_path: "b.txt".to_string(),
            message: None,
            error: Some("Not found: file 'b.txt'".to_string()),
        },
    ])));

    assert_eq!(
        parse(&output),
        json!({
            "responses": [
                { "file_path": "a.txt", "message": "File deleted successfully." },
                { "file_path": "b.txt", "error": "Not found: file 'b.txt'" },
            ]
        })
    );
}

#[test]
fn test_server_info_describes_protocol_and_auth() {
    let tools = GitGuardTools::new(&ServerConfig::default()).expect("default config is valid");
    let info = tools.get_info();
    let instructions = info.instructions.unwrap_or_default();

    assert!(instructions.contains("Not authenticated"));
    assert!(instructions.contains("delete_branch"));
    assert!(instructions.contains("300 seconds"));
    assert!(info.capabilities.tools.is_some());
}

#[test]
fn test_server_info_reports_authenticated_session() {
    let config = ServerConfig {
        github_token: Some("ghp_test".to_string()),
        ..ServerConfig::default()
    };
    let tools = GitGuardTools::new(&config).unwrap();

    let instructions = tools.get_info().instructions.unwrap_or_default();
    assert!(instructions.contains("Authenticated with GitHub token"));
}
