//! Confirmation token codec
//!
//! A token is `base64url(claims) "." base64url(hmac_sha256(secret, claims))`
//! where `claims` is the JSON serialization of [`TokenClaims`]. Parameters are
//! carried as a structured JSON object, so values may contain any character.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::operation::DestructiveOperation;
use super::params::ConfirmationParams;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_VERSION: u8 = 1;

/// Decoded contents of a confirmation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "v")]
    pub version: u8,
    #[serde(rename = "op")]
    pub operation: DestructiveOperation,
    pub params: ConfirmationParams,
    /// Issuance time in seconds since the Unix epoch
    #[serde(rename = "iat")]
    pub issued_at: i64,
    pub nonce: String,
}

/// HMAC key used to sign and verify tokens
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Creates a signer with a random per-process secret
    pub fn random() -> Self {
        let mut secret = Vec::with_capacity(32);
        secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
        secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
        Self { secret }
    }

    fn mac(&self) -> HmacSha256 {
        <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
    }

    /// Serializes and signs the claims
    pub fn encode(&self, claims: &TokenClaims) -> String {
        // Serializing plain strings, integers and string maps cannot fail
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let mut mac = self.mac();
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Verifies the signature and decodes the claims
    ///
    /// Returns `None` for anything that is not a token this signer issued.
    pub fn decode(&self, token: &str) -> Option<TokenClaims> {
        let (payload_b64, signature_b64) = token.trim().split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        let mut mac = self.mac();
        mac.update(&payload);
        mac.verify_slice(&signature).ok()?;

        let claims: TokenClaims = serde_json::from_slice(&payload).ok()?;
        (claims.version == TOKEN_VERSION).then_some(claims)
    }
}
