//! Destructive tool adapters
//!
//! Each adapter binds one operation's real inputs to the confirmation gate and
//! performs the mutation only when the gate authorizes it:
//!
//! 1. Check that the caller is authenticated (before the gate is consulted)
//! 2. Build the canonical confirmation request from the inputs
//! 3. Evaluate the gate
//! 4. On `AwaitingConfirmation` or `Invalid`, return without side effects
//! 5. On `Authorized`, call the [`RemoteMutationExecutor`] exactly once
//!
//! All dependencies are passed in explicitly, so the adapters can be exercised
//! with a fake executor and a simulated clock.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::Serialize;

use crate::confirmation::{
    Clock, ConfirmationGate, ConfirmationRequest, ConsumedTokenCache, GateDecision,
    InvalidConfirmation, SystemClock,
};
use crate::error::ToolError;
use crate::github::RemoteMutationExecutor;
use crate::session::SessionContext;

/// Branch `delete_files` targets when the caller names none
pub const DEFAULT_FILES_BRANCH: &str = "main";

/// Result of a destructive tool call that did not fail outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructiveOutcome<T> {
    /// No mutation happened; the caller must confirm with `token`
    ConfirmationRequired { token: String, summary: String },
    /// The supplied token was rejected; no mutation happened
    Rejected(InvalidConfirmation),
    /// The mutation was dispatched
    Completed(T),
}

/// Outcome of deleting one file within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDeletionResult {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileDeletionResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The confirmation-gated destructive operations
pub struct DestructiveActions<E, C: Clock = SystemClock> {
    gate: ConfirmationGate<C>,
    executor: E,
    consumed_tokens: Option<Arc<ConsumedTokenCache>>,
}

impl<E, C: Clock> DestructiveActions<E, C>
where
    E: RemoteMutationExecutor,
{
    pub fn new(gate: ConfirmationGate<C>, executor: E) -> Self {
        Self {
            gate,
            executor,
            consumed_tokens: None,
        }
    }

    /// Enables single-use tokens backed by the given cache
    pub fn with_consumed_tokens(mut self, cache: Arc<ConsumedTokenCache>) -> Self {
        self.consumed_tokens = Some(cache);
        self
    }

    pub fn gate(&self) -> &ConfirmationGate<C> {
        &self.gate
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the gate and decides whether the mutation may proceed
    ///
    /// `Break` carries the outcome to return without touching the remote.
    fn authorize<T>(
        &self,
        request: &ConfirmationRequest,
        confirmation_token: Option<&str>,
    ) -> ControlFlow<DestructiveOutcome<T>> {
        let now = self.gate.clock().now();
        match self.gate.evaluate_at(request, confirmation_token, now) {
            GateDecision::AwaitingConfirmation { token, summary } => {
                tracing::info!("Confirmation required for {}", request.operation());
                ControlFlow::Break(DestructiveOutcome::ConfirmationRequired { token, summary })
            }
            GateDecision::Invalid(reason) => {
                tracing::warn!(
                    "Rejected {} confirmation: {}",
                    request.operation(),
                    reason.reason()
                );
                ControlFlow::Break(DestructiveOutcome::Rejected(reason))
            }
            GateDecision::Authorized(confirmed) => {
                if let Some(cache) = &self.consumed_tokens {
                    if !cache.consume(&confirmed, self.gate.validity_secs(), now) {
                        tracing::warn!("Replayed {} confirmation token", request.operation());
                        return ControlFlow::Break(DestructiveOutcome::Rejected(
                            InvalidConfirmation::AlreadyUsed,
                        ));
                    }
                }
                tracing::info!("Confirmed {}, dispatching mutation", request.operation());
                ControlFlow::Continue(())
            }
        }
    }

    /// Deletes a branch
    pub async fn delete_branch(
        &self,
        session: &SessionContext,
        repo: Option<&str>,
        branch: &str,
        confirmation_token: Option<&str>,
    ) -> Result<DestructiveOutcome<String>, ToolError> {
        let auth = session.require_session()?;
        let repo = session.resolve_repository(repo)?;
        let branch = required(branch, "branch")?;
        tracing::info!("Request received to delete branch '{}' in repo: {}", branch, repo);

        let request = ConfirmationRequest::delete_branch(repo.to_string(), branch);
        if let ControlFlow::Break(outcome) = self.authorize(&request, confirmation_token) {
            return Ok(outcome);
        }

        self.executor
            .delete_branch(&auth.credentials, &repo, branch)
            .await?;
        Ok(DestructiveOutcome::Completed(format!(
            "Branch '{}' deleted successfully.",
            branch
        )))
    }

    /// Deletes a set of files on a branch
    ///
    /// Each distinct path is deleted in request order; a failure on one file
    /// is recorded and does not stop the others. `branch` defaults to
    /// [`DEFAULT_FILES_BRANCH`].
    pub async fn delete_files(
        &self,
        session: &SessionContext,
        repo: Option<&str>,
        branch: Option<&str>,
        file_paths: &[String],
        confirmation_token: Option<&str>,
    ) -> Result<DestructiveOutcome<Vec<FileDeletionResult>>, ToolError> {
        let auth = session.require_session()?;
        let repo = session.resolve_repository(repo)?;
        let branch = branch
            .map(str::trim)
            .filter(|branch| !branch.is_empty())
            .unwrap_or(DEFAULT_FILES_BRANCH);
        let paths = distinct_paths(file_paths);
        if paths.is_empty() {
            return Err(ToolError::MissingParameter("file_paths"));
        }
        tracing::info!(
            "Request received to delete files {:?} in repo: {} on branch: {}",
            paths,
            repo,
            branch
        );

        let request =
            ConfirmationRequest::delete_files(repo.to_string(), branch, paths.iter().copied());
        if let ControlFlow::Break(outcome) = self.authorize(&request, confirmation_token) {
            return Ok(outcome);
        }

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let message = format!("Delete {}", path);
            let result = match self
                .executor
                .delete_file(&auth.credentials, &repo, branch, path, &message)
                .await
            {
                Ok(()) => FileDeletionResult {
                    file_path: path.to_string(),
                    message: Some("File deleted successfully.".to_string()),
                    error: None,
                },
                Err(e) => {
                    tracing::error!("Failed to delete file '{}': {}", path, e);
                    FileDeletionResult {
                        file_path: path.to_string(),
                        message: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }
        tracing::info!(
            "Files deletion process completed in repository '{}' on branch '{}'.",
            repo,
            branch
        );
        Ok(DestructiveOutcome::Completed(results))
    }

    /// Deletes a whole repository
    pub async fn delete_repository(
        &self,
        session: &SessionContext,
        repo: Option<&str>,
        confirmation_token: Option<&str>,
    ) -> Result<DestructiveOutcome<String>, ToolError> {
        let auth = session.require_session()?;
        let repo = session.resolve_repository(repo)?;
        tracing::info!("Request received to delete repository: {}", repo);

        let request = ConfirmationRequest::delete_repository(repo.to_string());
        if let ControlFlow::Break(outcome) = self.authorize(&request, confirmation_token) {
            return Ok(outcome);
        }

        self.executor
            .delete_repository(&auth.credentials, &repo)
            .await?;
        Ok(DestructiveOutcome::Completed(format!(
            "Repository '{}' deleted successfully.",
            repo
        )))
    }

    /// Deletes an issue or pull request comment
    pub async fn delete_issue_comment(
        &self,
        session: &SessionContext,
        repo: Option<&str>,
        comment_id: u64,
        confirmation_token: Option<&str>,
    ) -> Result<DestructiveOutcome<String>, ToolError> {
        let auth = session.require_session()?;
        let repo = session.resolve_repository(repo)?;
        tracing::info!("Request received to delete comment ID {} in repo: {}", comment_id, repo);

        let request = ConfirmationRequest::delete_issue_comment(repo.to_string(), comment_id);
        if let ControlFlow::Break(outcome) = self.authorize(&request, confirmation_token) {
            return Ok(outcome);
        }

        self.executor
            .delete_issue_comment(&auth.credentials, &repo, comment_id)
            .await?;
        Ok(DestructiveOutcome::Completed(
            "Comment deleted successfully.".to_string(),
        ))
    }
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ToolError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ToolError::MissingParameter(name))
    } else {
        Ok(value)
    }
}

/// Trims paths and drops blanks and duplicates, keeping first occurrence order
fn distinct_paths(file_paths: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    file_paths
        .iter()
        .map(|path| path.trim())
        .filter(|path| !path.is_empty() && seen.insert(*path))
        .collect()
}
