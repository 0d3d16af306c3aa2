//! MCP tools for confirmation-gated GitHub deletions
//!
//! Every tool here is destructive and follows the same two-step protocol:
//! call it once without `confirmation_token` to receive a token and a prompt,
//! show the prompt to the user, then call it again with the same parameters
//! and the token to perform the deletion.

pub mod responses;

use std::sync::Arc;

use rmcp::{ServerHandler, model::*, schemars, tool};

use crate::config::ServerConfig;
use crate::error::ConfigError;
use crate::github::GithubMutationClient;
use crate::services::DestructiveActions;
use crate::session::SessionContext;

/// Destructive GitHub tools exposed through the MCP protocol
///
/// A thin wrapper around [`DestructiveActions`]: it supplies the session of
/// the current process to each call and renders outcomes as JSON.
#[derive(Clone)]
pub struct GitGuardTools {
    actions: Arc<DestructiveActions<GithubMutationClient>>,
    session: SessionContext,
}

impl GitGuardTools {
    /// Creates the tools from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            actions: Arc::new(config.destructive_actions()?),
            session: config.session(),
        })
    }
}

#[tool(tool_box)]
impl ServerHandler for GitGuardTools {
    /// Provides information about this MCP server
    fn get_info(&self) -> ServerInfo {
        let auth_status = if self.session.is_authenticated() {
            "Authenticated with GitHub token"
        } else {
            "Not authenticated: destructive tools will refuse to run"
        };

        let instructions = format!(
            "# GitHub Guarded Deletion MCP Server

## Authentication Status
{}

## Available Tools
- `delete_branch`: Delete a branch
- `delete_files`: Delete one or more files on a branch
- `delete_repository`: Delete a repository
- `delete_issue_comment`: Delete an issue or pull request comment

## Confirmation Protocol
Every tool is destructive and requires explicit confirmation:
1. Call the tool WITHOUT `confirmation_token`. Nothing is deleted; the response
   contains a `confirmation_token` and a message describing what will be deleted.
2. Show the message to the user and wait for their explicit approval.
3. Call the tool again with the SAME parameters plus the `confirmation_token`.

Tokens expire {} seconds after they are issued and only match the exact same target.
Never invent a token and never confirm without asking the user first.
",
            auth_status,
            self.actions.gate().validity_secs()
        );

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(instructions),
        }
    }
}

#[tool(tool_box)]
impl GitGuardTools {
    #[tool(
        description = "Delete a branch in a GitHub repository. Two-step: first call without confirmation_token returns a token and a prompt; after the user explicitly approves, call again with identical parameters and the token. Example: `{\"name\": \"delete_branch\", \"arguments\": {\"repo\": \"octocat/hello\", \"branch\": \"feature\"}}` then `{\"name\": \"delete_branch\", \"arguments\": {\"repo\": \"octocat/hello\", \"branch\": \"feature\", \"confirmation_token\": \"<token>\"}}`"
    )]
    async fn delete_branch(
        &self,
        #[tool(param)]
        #[schemars(description = "The name of the branch to delete.")]
        branch: String,

        #[tool(param)]
        #[schemars(
            description = "The GitHub repository in the format 'owner/repo' (optional when the server has a default repository)."
        )]
        repo: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Token returned by the first call. Omit it to request confirmation; never make one up."
        )]
        confirmation_token: Option<String>,
    ) -> String {
        let result = self
            .actions
            .delete_branch(
                &self.session,
                repo.as_deref(),
                &branch,
                confirmation_token.as_deref(),
            )
            .await;
        responses::render_message(result)
    }

    #[tool(
        description = "Delete one or more files on a branch of a GitHub repository. Two-step: first call without confirmation_token returns a token and a prompt; after the user explicitly approves, call again with the same repo, branch and file set plus the token. File order does not matter. Example: `{\"name\": \"delete_files\", \"arguments\": {\"repo\": \"octocat/hello\", \"branch\": \"main\", \"file_paths\": [\"a.txt\", \"docs/b.md\"]}}`"
    )]
    async fn delete_files(
        &self,
        #[tool(param)]
        #[schemars(description = "Paths of the files to delete, relative to the repository root.")]
        file_paths: Vec<String>,

        #[tool(param)]
        #[schemars(description = "The branch the files are deleted from (default: 'main').")]
        branch: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "The GitHub repository in the format 'owner/repo' (optional when the server has a default repository)."
        )]
        repo: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Token returned by the first call. Omit it to request confirmation; never make one up."
        )]
        confirmation_token: Option<String>,
    ) -> String {
        let result = self
            .actions
            .delete_files(
                &self.session,
                repo.as_deref(),
                branch.as_deref(),
                &file_paths,
                confirmation_token.as_deref(),
            )
            .await;
        responses::render_file_deletions(result)
    }

    #[tool(
        description = "Delete a GitHub repository. This cannot be undone. Two-step: first call without confirmation_token returns a token and a prompt; after the user explicitly approves, call again with the same repo and the token. Example: `{\"name\": \"delete_repository\", \"arguments\": {\"repo\": \"octocat/old-project\"}}`"
    )]
    async fn delete_repository(
        &self,
        #[tool(param)]
        #[schemars(
            description = "The GitHub repository in the format 'owner/repo' (optional when the server has a default repository)."
        )]
        repo: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Token returned by the first call. Omit it to request confirmation; never make one up."
        )]
        confirmation_token: Option<String>,
    ) -> String {
        let result = self
            .actions
            .delete_repository(&self.session, repo.as_deref(), confirmation_token.as_deref())
            .await;
        responses::render_message(result)
    }

    #[tool(
        description = "Delete a comment on an issue or pull request. Two-step: first call without confirmation_token returns a token and a prompt; after the user explicitly approves, call again with the same repo and comment_id plus the token. Example: `{\"name\": \"delete_issue_comment\", \"arguments\": {\"repo\": \"octocat/hello\", \"comment_id\": 123}}`"
    )]
    async fn delete_issue_comment(
        &self,
        #[tool(param)]
        #[schemars(description = "The ID of the comment to delete.")]
        comment_id: u64,

        #[tool(param)]
        #[schemars(
            description = "The GitHub repository in the format 'owner/repo' (optional when the server has a default repository)."
        )]
        repo: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Token returned by the first call. Omit it to request confirmation; never make one up."
        )]
        confirmation_token: Option<String>,
    ) -> String {
        let result = self
            .actions
            .delete_issue_comment(
                &self.session,
                repo.as_deref(),
                comment_id,
                confirmation_token.as_deref(),
            )
            .await;
        responses::render_message(result)
    }
}
