//! # AccessToken: proof that a reader owns the key they ask us to seal to
//!
//! A bettor who wants their own bids back presents a token made of:
//!
//! - the [`ReencryptionKey`] the ciphertexts should be sealed to, and
//! - an ed25519 signature, by the caller's identity key, over
//!   `"sealbid:reencrypt:v1:" || ledger_id || public_key`.
//!
//! The ledger checks the signature against the *caller's* identity before any
//! ciphertext is re-encrypted. A token lifted from another user fails because
//! the signature was made by a different key; a token from another ledger
//! deployment fails because `ledger_id` is part of the payload.
//!
//! Tokens are ephemeral: they are validated per read and never stored.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use serde::{Deserialize, Serialize};

use crate::{Identity, ReencryptionKey, Result, SealbidError, constants};

/// A (public key, signature) pair authorizing a re-encryption to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Recipient key for re-encryption.
    pub public_key: ReencryptionKey,
    /// Signature by the caller's identity key over the canonical payload.
    pub signature: Signature,
}

impl AccessToken {
    /// Canonical signing payload for ed25519 verification.
    #[must_use]
    pub fn signing_payload(ledger_id: &str, public_key: &ReencryptionKey) -> Vec<u8> {
        let mut payload = Vec::with_capacity(
            constants::ACCESS_TOKEN_DOMAIN.len() + ledger_id.len() + 8 + public_key.0.len(),
        );
        payload.extend_from_slice(constants::ACCESS_TOKEN_DOMAIN);
        payload.extend_from_slice(&(ledger_id.len() as u64).to_le_bytes());
        payload.extend_from_slice(ledger_id.as_bytes());
        payload.extend_from_slice(public_key.as_bytes());
        payload
    }

    /// Build a token signed by `signing_key` for the given ledger.
    #[must_use]
    pub fn sign(signing_key: &SigningKey, ledger_id: &str, public_key: ReencryptionKey) -> Self {
        let signature = signing_key.sign(&Self::signing_payload(ledger_id, &public_key));
        Self {
            public_key,
            signature,
        }
    }

    /// Check that this token was signed by `caller` for `ledger_id`.
    ///
    /// # Errors
    /// Returns `InvalidAccessToken` if the caller identity is not a valid
    /// ed25519 key, the re-encryption key is empty, or the signature does
    /// not verify.
    pub fn verify(&self, caller: &Identity, ledger_id: &str) -> Result<()> {
        if self.public_key.as_bytes().is_empty() {
            return Err(SealbidError::InvalidAccessToken {
                reason: "re-encryption key is empty".to_string(),
            });
        }
        let verifying_key = caller.verifying_key()?;
        verifying_key
            .verify(
                &Self::signing_payload(ledger_id, &self.public_key),
                &self.signature,
            )
            .map_err(|_| SealbidError::InvalidAccessToken {
                reason: format!("signature does not match {caller}"),
            })
    }
}
