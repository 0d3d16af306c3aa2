//! Remote mutation executor for GitHub
//!
//! The destructive tool adapters only ever talk to GitHub through the
//! [`RemoteMutationExecutor`] trait, and only after the confirmation gate has
//! authorized the request. [`GithubMutationClient`] is the REST implementation.

mod client;

pub use client::{DEFAULT_GITHUB_API_URL, GithubMutationClient};

use std::future::Future;

use crate::error::MutationError;
use crate::session::{Credentials, RepositoryName};

/// Performs irreversible changes on the remote repository host
///
/// Implementations perform no confirmation checks of their own and do not
/// retry; failures are surfaced to the caller as-is.
pub trait RemoteMutationExecutor: Send + Sync {
    fn delete_branch(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        branch: &str,
    ) -> impl Future<Output = Result<(), MutationError>> + Send;

    /// Deletes a single file on a branch, committing with `message`
    fn delete_file(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        branch: &str,
        path: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), MutationError>> + Send;

    fn delete_repository(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
    ) -> impl Future<Output = Result<(), MutationError>> + Send;

    fn delete_issue_comment(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        comment_id: u64,
    ) -> impl Future<Output = Result<(), MutationError>> + Send;
}
