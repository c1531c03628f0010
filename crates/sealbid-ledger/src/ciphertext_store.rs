//! Ciphertext store: holds encrypted bid amounts behind opaque handles.
//!
//! The store has no auction rules. It assigns handles, swaps bytes on
//! replacement, and keeps a per-ciphertext access list. A re-encryption is
//! only forwarded to the backend when the requester is on that list, so no
//! ciphertext leaves the store for an identity its owner did not admit.

use std::collections::{HashMap, HashSet};

use sealbid_types::{
    CiphertextHandle, EncryptedInput, EncryptionBackend, Identity, ReencryptionKey, Result,
    SealbidError, SealedValue,
};

/// A stored ciphertext and the identities allowed to have it re-encrypted.
#[derive(Debug, Clone)]
struct StoredCiphertext {
    owner: Identity,
    value: EncryptedInput,
    readers: HashSet<Identity>,
}

/// Handle-addressed ciphertext storage with per-handle access lists.
#[derive(Debug)]
pub struct CiphertextStore {
    entries: HashMap<CiphertextHandle, StoredCiphertext>,
    next_handle: CiphertextHandle,
    max_bytes: usize,
}

impl CiphertextStore {
    /// Create an empty store accepting ciphertexts up to `max_bytes`.
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            next_handle: CiphertextHandle(0),
            max_bytes,
        }
    }

    fn admit(
        &self,
        submitter: &Identity,
        input: &EncryptedInput,
        backend: &impl EncryptionBackend,
    ) -> Result<()> {
        input.validate(self.max_bytes)?;
        backend.verify_input(input, submitter)
    }

    /// Store a new ciphertext owned by `owner`.
    ///
    /// The owner is always a reader; `readers` grants additional identities
    /// the right to request re-encryption. Nothing is stored if validation
    /// fails.
    ///
    /// # Errors
    /// Returns `InvalidCiphertext` (or a backend error) if the input is
    /// rejected.
    pub fn store(
        &mut self,
        owner: Identity,
        input: EncryptedInput,
        readers: &[Identity],
        backend: &impl EncryptionBackend,
    ) -> Result<CiphertextHandle> {
        self.admit(&owner, &input, backend)?;

        let handle = self.next_handle;
        self.next_handle = handle.next();

        let mut allowed: HashSet<Identity> = readers.iter().copied().collect();
        allowed.insert(owner);
        self.entries.insert(
            handle,
            StoredCiphertext {
                owner,
                value: input,
                readers: allowed,
            },
        );
        Ok(handle)
    }

    /// Replace the bytes behind an existing handle. The access list is kept.
    ///
    /// # Errors
    /// - `CiphertextNotFound` if the handle is unknown
    /// - `InvalidCiphertext` if the new input is rejected (old value kept)
    pub fn replace(
        &mut self,
        handle: CiphertextHandle,
        input: EncryptedInput,
        backend: &impl EncryptionBackend,
    ) -> Result<()> {
        let owner = self
            .entries
            .get(&handle)
            .map(|entry| entry.owner)
            .ok_or(SealbidError::CiphertextNotFound(handle))?;
        self.admit(&owner, &input, backend)?;

        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.value = input;
        }
        Ok(())
    }

    /// Drop a ciphertext.
    ///
    /// # Errors
    /// Returns `CiphertextNotFound` if the handle is unknown.
    pub fn remove(&mut self, handle: CiphertextHandle) -> Result<()> {
        self.entries
            .remove(&handle)
            .map(|_| ())
            .ok_or(SealbidError::CiphertextNotFound(handle))
    }

    /// Re-encrypt the ciphertext behind `handle` to `key` on behalf of
    /// `requester`.
    ///
    /// # Errors
    /// - `CiphertextNotFound` if the handle is unknown
    /// - `Unauthorized` if `requester` is not on the access list
    /// - backend errors from the re-encryption itself
    pub fn reencrypt_for(
        &self,
        handle: CiphertextHandle,
        requester: &Identity,
        key: &ReencryptionKey,
        backend: &impl EncryptionBackend,
    ) -> Result<SealedValue> {
        let entry = self
            .entries
            .get(&handle)
            .ok_or(SealbidError::CiphertextNotFound(handle))?;
        if !entry.readers.contains(requester) {
            return Err(SealbidError::unauthorized(
                *requester,
                format!("re-encrypt {handle}"),
            ));
        }
        backend.reencrypt(&entry.value, key)
    }

    /// Look up the raw ciphertext behind a handle.
    #[must_use]
    pub fn get(&self, handle: CiphertextHandle) -> Option<&EncryptedInput> {
        self.entries.get(&handle).map(|entry| &entry.value)
    }

    /// Whether `identity` may request re-encryption of `handle`.
    #[must_use]
    pub fn is_allowed(&self, handle: CiphertextHandle, identity: &Identity) -> bool {
        self.entries
            .get(&handle)
            .is_some_and(|entry| entry.readers.contains(identity))
    }

    /// Number of ciphertexts held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
