//! Confirmation gate for destructive operations
//!
//! Every irreversible GitHub mutation (deleting a branch, files, a repository
//! or an issue comment) goes through a two-phase protocol:
//!
//! 1. The caller sends the request without a token. The gate mints a signed
//!    token that binds the operation, its identifying parameters and the
//!    issuance time, and the tool answers with a confirmation prompt.
//! 2. The caller re-sends the same request with that token. The gate checks
//!    the signature, the validity window and that the parameters are the same
//!    target, and only then authorizes the mutation.
//!
//! The gate keeps no state. Everything needed to validate a token is in the
//! token itself, the current request and the clock, so any number of server
//! instances sharing the signing secret can validate each other's tokens.
//!
//! ```
//! use gitguard_mcp::confirmation::{
//!     ConfirmationGate, ConfirmationRequest, GateDecision, ManualClock, TokenSigner,
//! };
//!
//! let clock = ManualClock::new(1_700_000_000);
//! let gate = ConfirmationGate::new(TokenSigner::new("secret"), 300, clock.clone());
//! let request = ConfirmationRequest::delete_branch("octocat/hello", "feature");
//!
//! let GateDecision::AwaitingConfirmation { token, .. } = gate.evaluate(&request, None) else {
//!     panic!("first call must ask for confirmation");
//! };
//! assert!(gate.evaluate(&request, Some(&token)).is_authorized());
//! ```

mod clock;
mod operation;
mod params;
mod replay;
mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use operation::{
    BRANCH_FIELD, COMMENT_ID_FIELD, DestructiveOperation, FILE_PATHS_FIELD, FieldKind, FieldSpec,
    REPO_FIELD,
};
pub use params::{ConfirmationParams, ConfirmationRequest, ParamValue};
pub use replay::ConsumedTokenCache;
pub use token::{TOKEN_VERSION, TokenClaims, TokenSigner};

use thiserror::Error;

/// Default validity window of a confirmation token, in seconds
pub const DEFAULT_VALIDITY_SECS: i64 = 5 * 60;

/// Longest accepted validity window, in seconds
pub const MAX_VALIDITY_SECS: i64 = 24 * 60 * 60;

/// Tolerated clock skew for tokens issued "in the future", in seconds
pub const MAX_FUTURE_SKEW_SECS: i64 = 30;

/// Facts about a token that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedToken {
    pub nonce: String,
    pub issued_at: i64,
}

/// Why a supplied token cannot authorize the current request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidConfirmation {
    #[error("Invalid confirmation token.")]
    MalformedToken,

    #[error("Confirmation token has expired. Please request a new token.")]
    Expired { issued_at: i64, age_secs: i64 },

    #[error("Invalid confirmation token. Parameters do not match, please request a new token.")]
    ParameterMismatch {
        token_operation: DestructiveOperation,
        request_operation: DestructiveOperation,
        token_params: ConfirmationParams,
        request_params: ConfirmationParams,
    },

    /// Only produced when single-use tokens are enabled
    #[error("Confirmation token has already been used. Please request a new token.")]
    AlreadyUsed,
}

impl InvalidConfirmation {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidConfirmation::MalformedToken => "malformed token",
            InvalidConfirmation::Expired { .. } => "expired",
            InvalidConfirmation::ParameterMismatch { .. } => "parameter mismatch",
            InvalidConfirmation::AlreadyUsed => "token already used",
        }
    }
}

/// Caller-visible state of a confirmation flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConfirmationState {
    Requested,
    Confirmed,
    Expired,
    Rejected,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Requested)
    }
}

/// Outcome of evaluating a destructive request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// A fresh token was minted; nothing may be mutated yet
    AwaitingConfirmation { token: String, summary: String },
    /// The supplied token matches this request and is within its window
    Authorized(ConfirmedToken),
    /// The supplied token was rejected
    Invalid(InvalidConfirmation),
}

impl GateDecision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateDecision::Authorized(_))
    }

    pub fn state(&self) -> ConfirmationState {
        match self {
            GateDecision::AwaitingConfirmation { .. } => ConfirmationState::Requested,
            GateDecision::Authorized(_) => ConfirmationState::Confirmed,
            GateDecision::Invalid(InvalidConfirmation::Expired { .. }) => ConfirmationState::Expired,
            GateDecision::Invalid(_) => ConfirmationState::Rejected,
        }
    }
}

/// Stateless mint/validate gate shared by all destructive tools
#[derive(Debug, Clone)]
pub struct ConfirmationGate<C: Clock = SystemClock> {
    signer: TokenSigner,
    validity_secs: i64,
    clock: C,
}

impl ConfirmationGate<SystemClock> {
    /// Creates a gate backed by the system clock
    pub fn with_system_clock(signer: TokenSigner, validity_secs: i64) -> Self {
        Self::new(signer, validity_secs, SystemClock)
    }
}

impl<C: Clock> ConfirmationGate<C> {
    pub fn new(signer: TokenSigner, validity_secs: i64, clock: C) -> Self {
        Self {
            signer,
            validity_secs,
            clock,
        }
    }

    pub fn validity_secs(&self) -> i64 {
        self.validity_secs
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Decides between minting a token and validating the supplied one
    ///
    /// An empty or whitespace-only token counts as absent.
    pub fn evaluate(&self, request: &ConfirmationRequest, supplied: Option<&str>) -> GateDecision {
        self.evaluate_at(request, supplied, self.clock.now())
    }

    /// [`evaluate`](Self::evaluate) at an explicit point in time
    pub fn evaluate_at(
        &self,
        request: &ConfirmationRequest,
        supplied: Option<&str>,
        now: i64,
    ) -> GateDecision {
        match supplied.map(str::trim).filter(|token| !token.is_empty()) {
            None => self.mint(request, now),
            Some(token) => self.validate(request, token, now),
        }
    }

    fn mint(&self, request: &ConfirmationRequest, now: i64) -> GateDecision {
        let claims = TokenClaims {
            version: TOKEN_VERSION,
            operation: request.operation(),
            params: request.params().clone(),
            issued_at: now,
            nonce: uuid::Uuid::new_v4().to_string(),
        };
        tracing::debug!(
            "Minted confirmation token for {} with params {:?}",
            request.operation(),
            request.params()
        );

        GateDecision::AwaitingConfirmation {
            token: self.signer.encode(&claims),
            summary: request.summary(),
        }
    }

    fn validate(&self, request: &ConfirmationRequest, token: &str, now: i64) -> GateDecision {
        let Some(claims) = self.signer.decode(token) else {
            tracing::warn!("Rejected malformed confirmation token for {}", request.operation());
            return GateDecision::Invalid(InvalidConfirmation::MalformedToken);
        };

        // A signed token must still carry exactly the fields its operation declares
        let bound = match ConfirmationRequest::new(claims.operation, claims.params) {
            Ok(bound) => bound,
            Err(e) => {
                tracing::warn!("Rejected confirmation token with unexpected fields: {}", e);
                return GateDecision::Invalid(InvalidConfirmation::MalformedToken);
            }
        };

        if claims.issued_at.saturating_sub(now) > MAX_FUTURE_SKEW_SECS {
            tracing::warn!(
                "Rejected confirmation token issued {}s in the future",
                claims.issued_at.saturating_sub(now)
            );
            return GateDecision::Invalid(InvalidConfirmation::MalformedToken);
        }

        let age_secs = now.saturating_sub(claims.issued_at);
        if age_secs > self.validity_secs {
            tracing::info!(
                "Confirmation token for {} expired {}s ago",
                bound.operation(),
                age_secs - self.validity_secs
            );
            return GateDecision::Invalid(InvalidConfirmation::Expired {
                issued_at: claims.issued_at,
                age_secs,
            });
        }

        if &bound != request {
            tracing::info!(
                "Confirmation token parameters {:?} do not match request {:?}",
                bound.params(),
                request.params()
            );
            return GateDecision::Invalid(InvalidConfirmation::ParameterMismatch {
                token_operation: bound.operation(),
                request_operation: request.operation(),
                token_params: bound.params().clone(),
                request_params: request.params().clone(),
            });
        }

        GateDecision::Authorized(ConfirmedToken {
            nonce: claims.nonce,
            issued_at: claims.issued_at,
        })
    }
}
