//! Seam to the homomorphic encryption backend.
//!
//! The ledger holds ciphertexts but cannot open them. Two capabilities are
//! delegated to the backend: checking that a submitted input is a well-formed
//! ciphertext, and re-encrypting a stored ciphertext to a reader's key.

use crate::{EncryptedInput, Identity, ReencryptionKey, Result, SealedValue};

/// External encryption service used by the ciphertext store.
pub trait EncryptionBackend: Send + Sync {
    /// Check that `input` is a ciphertext the backend can operate on.
    ///
    /// The default accepts anything the ledger's size checks accepted.
    fn verify_input(&self, input: &EncryptedInput, submitter: &Identity) -> Result<()> {
        let _ = (input, submitter);
        Ok(())
    }

    /// Re-encrypt `ciphertext` so only the holder of `recipient`'s secret can
    /// decrypt it. Must not reveal the plaintext to the caller.
    fn reencrypt(&self, ciphertext: &EncryptedInput, recipient: &ReencryptionKey)
    -> Result<SealedValue>;
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::{MockBackend, MockKeyPair};

/// Deterministic stand-in for an FHE backend. **Never use in production.**
///
/// Values are masked with SHA-256 derived keystreams so tests can exercise the
/// full encrypt / store / re-encrypt / decrypt path without a real scheme.
#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use sha2::{Digest, Sha256};

    use crate::{
        EncryptedInput, EncryptionBackend, Identity, ReencryptionKey, Result, SealbidError,
        SealedValue,
    };

    const INPUT_TAG: &[u8; 4] = b"mfhe";
    const INPUT_LEN: usize = 4 + 8 + 8;

    fn mask(domain: &[u8], material: &[u8]) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(material);
        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(word)
    }

    /// A reader's re-encryption key pair.
    #[derive(Debug, Clone)]
    pub struct MockKeyPair {
        secret: [u8; 32],
    }

    impl MockKeyPair {
        pub fn from_seed(seed: u8) -> Self {
            Self {
                secret: [seed; 32],
            }
        }

        pub fn random() -> Self {
            Self {
                secret: rand::random(),
            }
        }

        pub fn public_key(&self) -> ReencryptionKey {
            let mut hasher = Sha256::new();
            hasher.update(b"mock:pk:");
            hasher.update(self.secret);
            ReencryptionKey::new(hasher.finalize().to_vec())
        }
    }

    /// Mock backend: `encrypt`, `reencrypt`, `decrypt`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MockBackend;

    impl MockBackend {
        pub fn new() -> Self {
            Self
        }

        /// Client-side encryption of a 64-bit bid amount.
        ///
        /// Every call uses a fresh nonce, so equal amounts produce different
        /// ciphertexts.
        pub fn encrypt(&self, value: u64) -> EncryptedInput {
            let nonce: u64 = rand::random();
            let masked = value ^ mask(b"mock:input:", &nonce.to_le_bytes());
            let mut bytes = Vec::with_capacity(INPUT_LEN);
            bytes.extend_from_slice(INPUT_TAG);
            bytes.extend_from_slice(&nonce.to_le_bytes());
            bytes.extend_from_slice(&masked.to_le_bytes());
            EncryptedInput::new(bytes)
        }

        /// Client-side decryption of a sealed value with the reader's key pair.
        pub fn decrypt(&self, sealed: &SealedValue, keys: &MockKeyPair) -> Result<u64> {
            if sealed.recipient != keys.public_key() {
                return Err(SealbidError::Backend(
                    "sealed value was not encrypted to this key".to_string(),
                ));
            }
            let word: [u8; 8] = sealed
                .bytes
                .as_slice()
                .try_into()
                .map_err(|_| SealbidError::Backend("malformed sealed value".to_string()))?;
            Ok(u64::from_le_bytes(word) ^ mask(b"mock:seal:", sealed.recipient.as_bytes()))
        }

        fn open_input(input: &EncryptedInput) -> Result<u64> {
            let bytes = input.as_bytes();
            if bytes.len() != INPUT_LEN || &bytes[..4] != INPUT_TAG {
                return Err(SealbidError::InvalidCiphertext {
                    reason: "not a mock ciphertext".to_string(),
                });
            }
            let mut nonce = [0u8; 8];
            nonce.copy_from_slice(&bytes[4..12]);
            let mut masked = [0u8; 8];
            masked.copy_from_slice(&bytes[12..20]);
            Ok(u64::from_le_bytes(masked) ^ mask(b"mock:input:", &nonce))
        }
    }

    impl EncryptionBackend for MockBackend {
        fn verify_input(&self, input: &EncryptedInput, _submitter: &Identity) -> Result<()> {
            Self::open_input(input).map(|_| ())
        }

        fn reencrypt(
            &self,
            ciphertext: &EncryptedInput,
            recipient: &ReencryptionKey,
        ) -> Result<SealedValue> {
            let value = Self::open_input(ciphertext)?;
            let sealed = value ^ mask(b"mock:seal:", recipient.as_bytes());
            Ok(SealedValue {
                recipient: recipient.clone(),
                bytes: sealed.to_le_bytes().to_vec(),
            })
        }
    }
}
