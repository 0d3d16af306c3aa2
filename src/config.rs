//! Server configuration
//!
//! Values are collected by the binaries from command line flags, each of which
//! falls back to an environment variable:
//!
//! | Flag | Environment variable | Default |
//! |---|---|---|
//! | `--github-token` | `GITGUARD_GITHUB_TOKEN` | unauthenticated |
//! | `--repo` | `GITGUARD_DEFAULT_REPO` | none |
//! | `--github-api-url` | `GITGUARD_GITHUB_API_URL` | `https://api.github.com` |
//! | `--confirmation-validity-secs` | `CONFIRMATION_TOKEN_VALIDITY_DURATION` | `300` (at most `86400`) |
//! | `--confirmation-secret` | `GITGUARD_CONFIRMATION_SECRET` | random per process |
//! | `--single-use-tokens` | `GITGUARD_SINGLE_USE_TOKENS` | `false` |

use std::sync::Arc;

use clap::Args;

use crate::confirmation::{
    ConfirmationGate, ConsumedTokenCache, DEFAULT_VALIDITY_SECS, MAX_VALIDITY_SECS, SystemClock,
    TokenSigner,
};
use crate::error::ConfigError;
use crate::github::{DEFAULT_GITHUB_API_URL, GithubMutationClient};
use crate::services::DestructiveActions;
use crate::session::SessionContext;

/// Confirmation gate policy
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Seconds a confirmation token stays valid after it is issued
    #[arg(
        long = "confirmation-validity-secs",
        env = "CONFIRMATION_TOKEN_VALIDITY_DURATION",
        default_value_t = DEFAULT_VALIDITY_SECS
    )]
    pub validity_secs: i64,

    /// Secret used to sign confirmation tokens
    /// Share it between instances that must accept each other's tokens.
    /// A random secret is generated when omitted.
    #[arg(long = "confirmation-secret", env = "GITGUARD_CONFIRMATION_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Reject a confirmation token after it has authorized one mutation
    #[arg(long = "single-use-tokens", env = "GITGUARD_SINGLE_USE_TOKENS")]
    pub single_use_tokens: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            validity_secs: DEFAULT_VALIDITY_SECS,
            secret: None,
            single_use_tokens: false,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validity_secs <= 0 {
            return Err(ConfigError::ZeroValidity);
        }
        if self.validity_secs > MAX_VALIDITY_SECS {
            return Err(ConfigError::ValidityTooLong {
                max: MAX_VALIDITY_SECS,
                actual: self.validity_secs,
            });
        }
        if matches!(&self.secret, Some(secret) if secret.is_empty()) {
            return Err(ConfigError::EmptySecret);
        }
        Ok(())
    }

    /// Checks the policy for a process that handles a single command and exits
    ///
    /// A random secret cannot verify tokens minted by an earlier run, and the
    /// replay cache lives only as long as the process.
    pub fn validate_one_shot(&self, confirming: bool) -> Result<(), ConfigError> {
        self.validate()?;
        if self.single_use_tokens {
            return Err(ConfigError::SingleUseNeedsServer);
        }
        if confirming && self.secret.is_none() {
            return Err(ConfigError::SecretRequiredToConfirm);
        }
        Ok(())
    }

    /// Builds the token signer, generating a secret if none is configured
    pub fn signer(&self) -> TokenSigner {
        match &self.secret {
            Some(secret) => TokenSigner::new(secret.as_bytes()),
            None => {
                tracing::warn!(
                    "No confirmation secret configured; using a random one. Confirmation tokens will not survive a restart."
                );
                TokenSigner::random()
            }
        }
    }
}

/// Configuration shared by the MCP server and the CLI
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// GitHub API token used for all mutations
    #[arg(short = 't', long, env = "GITGUARD_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Default repository ('owner/repo') when a tool call omits one
    #[arg(long = "repo", env = "GITGUARD_DEFAULT_REPO")]
    pub default_repository: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITGUARD_GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    pub github_api_url: String,

    #[command(flatten)]
    pub gate: GateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            default_repository: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            gate: GateConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gate.validate()
    }

    /// The session every call of this process runs under
    pub fn session(&self) -> SessionContext {
        SessionContext::from_token(self.github_token.clone())
            .with_default_repository(self.default_repository.clone())
    }

    /// Wires the gate, the GitHub client and the optional replay cache together
    pub fn destructive_actions(
        &self,
    ) -> Result<DestructiveActions<GithubMutationClient>, ConfigError> {
        self.validate()?;

        let gate = ConfirmationGate::new(self.gate.signer(), self.gate.validity_secs, SystemClock);
        let client = GithubMutationClient::new(reqwest::Client::new(), &self.github_api_url)?;
        let actions = DestructiveActions::new(gate, client);

        Ok(if self.gate.single_use_tokens {
            actions.with_consumed_tokens(Arc::new(ConsumedTokenCache::new()))
        } else {
            actions
        })
    }
}
