use std::collections::HashMap;
use std::sync::Mutex;

use super::ConfirmedToken;

/// Records consumed token nonces so a token authorizes at most one mutation
///
/// This is the stateful counterpart of the gate: it is only consulted when
/// single-use tokens are enabled. Entries are kept until the token would have
/// expired anyway, then pruned.
#[derive(Debug, Default)]
pub struct ConsumedTokenCache {
    consumed: Mutex<HashMap<String, i64>>,
}

impl ConsumedTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token as used
    ///
    /// Returns `false` when the token was already consumed.
    pub fn consume(&self, token: &ConfirmedToken, validity_secs: i64, now: i64) -> bool {
        let mut consumed = self
            .consumed
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        consumed.retain(|_, expires_at| *expires_at >= now);

        if consumed.contains_key(&token.nonce) {
            return false;
        }
        consumed.insert(
            token.nonce.clone(),
            token.issued_at.saturating_add(validity_secs),
        );
        true
    }

    pub fn len(&self) -> usize {
        self.consumed
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
