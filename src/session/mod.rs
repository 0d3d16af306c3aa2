//! Request-scoped session context
//!
//! Tools never read credentials from ambient global state. Each call receives
//! a [`SessionContext`] carrying the caller's credentials (if any) and an
//! optional default repository, and passes it down explicitly.

mod repository;

pub use repository::RepositoryName;

use std::fmt;

use crate::error::ToolError;

/// Message returned when a tool needs credentials and none are available
pub const AUTHENTICATION_REQUIRED_MESSAGE: &str = "User is not authenticated. Provide a GitHub token with --github-token or the GITGUARD_GITHUB_TOKEN environment variable.";

/// Credential used for downstream GitHub calls
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// A caller whose identity has been verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub credentials: Credentials,
}

/// Per-call context handed to every tool adapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    session: Option<AuthenticatedSession>,
    default_repository: Option<String>,
}

impl SessionContext {
    /// A context with no authenticated caller
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builds a context from an optional access token
    ///
    /// Blank tokens are treated as absent.
    pub fn from_token(access_token: Option<String>) -> Self {
        let session = access_token
            .filter(|token| !token.trim().is_empty())
            .map(|token| AuthenticatedSession {
                credentials: Credentials::new(token.trim()),
            });
        Self {
            session,
            default_repository: None,
        }
    }

    pub fn with_default_repository(mut self, repository: Option<String>) -> Self {
        self.default_repository = repository.filter(|repo| !repo.trim().is_empty());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the session or an authentication failure
    pub fn require_session(&self) -> Result<&AuthenticatedSession, ToolError> {
        self.session.as_ref().ok_or_else(|| {
            tracing::error!("Caller is not authenticated");
            ToolError::AuthenticationRequired(AUTHENTICATION_REQUIRED_MESSAGE.to_string())
        })
    }

    /// Resolves the target repository, falling back to the session default
    pub fn resolve_repository(&self, requested: Option<&str>) -> Result<RepositoryName, ToolError> {
        let raw = requested
            .filter(|repo| !repo.trim().is_empty())
            .or(self.default_repository.as_deref())
            .ok_or(ToolError::MissingParameter("repo"))?;

        RepositoryName::parse(raw).map_err(ToolError::InvalidRepository)
    }
}
