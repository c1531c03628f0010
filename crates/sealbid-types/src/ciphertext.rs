//! Ciphertext value types.
//!
//! Bid amounts only ever exist here as opaque bytes produced by an external
//! homomorphic encryption scheme. Nothing in this workspace interprets them;
//! the [`EncryptionBackend`](crate::EncryptionBackend) is the only party that
//! can transform them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Result, SealbidError};

/// A client-submitted encrypted 64-bit bid amount.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncryptedInput(pub Vec<u8>);

impl EncryptedInput {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Structural check applied before the ledger stores an input.
    ///
    /// # Errors
    /// Returns `InvalidCiphertext` if the input is empty or larger than
    /// `max_bytes`.
    pub fn validate(&self, max_bytes: usize) -> Result<()> {
        if self.is_empty() {
            return Err(SealbidError::InvalidCiphertext {
                reason: "ciphertext is empty".to_string(),
            });
        }
        if self.len() > max_bytes {
            return Err(SealbidError::InvalidCiphertext {
                reason: format!("ciphertext is {} bytes, limit is {max_bytes}", self.len()),
            });
        }
        Ok(())
    }
}

// Ciphertexts can be large; log their size, never their bytes.
impl fmt::Debug for EncryptedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedInput({} bytes)", self.0.len())
    }
}

/// Public key a ciphertext is re-encrypted to. Carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReencryptionKey(pub Vec<u8>);

impl ReencryptionKey {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Short SHA-256 fingerprint for logs; the key itself may be large.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        hex::encode(&digest[..8])
    }
}

/// A ciphertext re-encrypted so that only `recipient`'s secret can open it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedValue {
    pub recipient: ReencryptionKey,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for SealedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedValue")
            .field("recipient", &self.recipient.fingerprint())
            .field("len", &self.bytes.len())
            .finish()
    }
}
