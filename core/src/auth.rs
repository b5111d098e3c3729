//! Caller authentication seam.
//!
//! The escrow service only ever sees a resolved [`Account`]. Signature
//! checking lives behind [`Authenticator`] in the embedding system.

use std::collections::HashMap;

use crate::error::AuthError;
use crate::identity::Account;

/// What a caller presents to be identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Opaque proof of identity (a signature, a session token, ...).
    pub proof: Vec<u8>,
    /// Anti-replay counter; must strictly increase per proof.
    pub nonce: u64,
}

/// Resolves the acting identity for a call.
pub trait Authenticator {
    /// Returns the caller's account, consuming `credentials.nonce`.
    ///
    /// # Errors
    /// - [`AuthError::UnknownCredentials`] if the proof is not recognised
    /// - [`AuthError::StaleNonce`] if the nonce was already used
    fn authenticate(&mut self, credentials: &Credentials) -> Result<Account, AuthError>;
}

/// Authenticator over a fixed table of proofs, with per-proof nonces.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    accounts: HashMap<Vec<u8>, Account>,
    nonces: HashMap<Vec<u8>, u64>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, proof: impl Into<Vec<u8>>, account: Account) {
        self.accounts.insert(proof.into(), account);
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&mut self, credentials: &Credentials) -> Result<Account, AuthError> {
        let account = *self
            .accounts
            .get(&credentials.proof)
            .ok_or(AuthError::UnknownCredentials)?;
        if let Some(last) = self.nonces.get(&credentials.proof) {
            if credentials.nonce <= *last {
                return Err(AuthError::StaleNonce {
                    got: credentials.nonce,
                    last: *last,
                });
            }
        }
        self.nonces.insert(credentials.proof.clone(), credentials.nonce);
        Ok(account)
    }
}
