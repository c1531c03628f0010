//! Configuration for a sealbid ledger instance.

use serde::{Deserialize, Serialize};

use crate::{Result, SealbidError, constants};

/// Tunables for one ledger deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Deployment identifier bound into every access-token signature.
    pub ledger_id: String,
    /// Maximum rounds a single auction may hold.
    pub max_rounds_per_auction: usize,
    /// Maximum accepted size of an encrypted bid, in bytes.
    pub max_ciphertext_bytes: usize,
    /// Accept round windows that intersect an existing round of the same
    /// auction. When enabled, the current round is the first match in
    /// sequence order.
    pub allow_overlapping_rounds: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_id: constants::DEFAULT_LEDGER_ID.to_string(),
            max_rounds_per_auction: constants::DEFAULT_MAX_ROUNDS_PER_AUCTION,
            max_ciphertext_bytes: constants::DEFAULT_MAX_CIPHERTEXT_BYTES,
            allow_overlapping_rounds: false,
        }
    }
}

impl LedgerConfig {
    /// Config with a specific ledger id and default limits.
    #[must_use]
    pub fn with_ledger_id(ledger_id: impl Into<String>) -> Self {
        Self {
            ledger_id: ledger_id.into(),
            ..Self::default()
        }
    }

    /// Reject configurations the ledger cannot run with.
    ///
    /// # Errors
    /// Returns `Configuration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.ledger_id.trim().is_empty() {
            return Err(SealbidError::Configuration(
                "ledger_id must not be empty".to_string(),
            ));
        }
        if self.max_rounds_per_auction == 0 {
            return Err(SealbidError::Configuration(
                "max_rounds_per_auction must be > 0".to_string(),
            ));
        }
        if self.max_rounds_per_auction > u32::MAX as usize {
            return Err(SealbidError::Configuration(
                "max_rounds_per_auction exceeds round index range".to_string(),
            ));
        }
        if self.max_ciphertext_bytes == 0 {
            return Err(SealbidError::Configuration(
                "max_ciphertext_bytes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a JSON config document and validate it.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    /// `Serialization` if the document is not valid JSON for this shape,
    /// `Configuration` if it parses but fails [`LedgerConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
