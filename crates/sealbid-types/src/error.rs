//! Error types for the sealbid auction ledger.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Registry errors (auctions, ownership, round layout)
//! - 2xx: Round state errors
//! - 3xx: Bid errors
//! - 4xx: Access control / ciphertext errors
//! - 9xx: General / internal errors
//!
//! Every variant is recoverable by the caller: none of them leave partial
//! state behind.

use thiserror::Error;

use crate::{AuctionId, CiphertextHandle, Identity, PlayerId, RoundIndex, RoundPhase};

/// Central error enum for all sealbid operations.
#[derive(Debug, Error)]
pub enum SealbidError {
    // =================================================================
    // Registry Errors (1xx)
    // =================================================================
    /// The requested auction does not exist.
    #[error("SB_ERR_100: Auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// The requested round does not exist in the auction.
    #[error("SB_ERR_101: Round {round} not found in {auction}")]
    RoundNotFound {
        auction: AuctionId,
        round: RoundIndex,
    },

    /// The caller is not allowed to perform this action.
    #[error("SB_ERR_102: Unauthorized: {caller} may not {action}")]
    Unauthorized { caller: Identity, action: String },

    /// Round bounds are malformed (`end <= start`).
    #[error("SB_ERR_103: Invalid round window: {reason}")]
    InvalidWindow { reason: String },

    /// The new round's window intersects an existing round.
    #[error("SB_ERR_104: Round window overlaps {existing} of {auction}")]
    RoundOverlap {
        auction: AuctionId,
        existing: RoundIndex,
    },

    /// The auction already holds the maximum number of rounds.
    #[error("SB_ERR_105: Round limit of {limit} reached for {auction}")]
    RoundLimitExceeded { auction: AuctionId, limit: usize },

    /// A new round was requested before the auction's last round concluded.
    #[error("SB_ERR_106: Cannot add a round to {auction} while {round} is {phase}")]
    PreviousRoundOpen {
        auction: AuctionId,
        round: RoundIndex,
        phase: RoundPhase,
    },

    // =================================================================
    // Round State Errors (2xx)
    // =================================================================
    /// No round of the auction contains the current time.
    #[error("SB_ERR_200: No active round in {0}")]
    NoActiveRound(AuctionId),

    /// A bid mutation was attempted outside the round's bidding window.
    #[error("SB_ERR_201: Round not active: {round} is {phase}")]
    RoundNotActive { round: RoundIndex, phase: RoundPhase },

    /// An aggregate read was attempted before the round closed.
    #[error("SB_ERR_202: Round not ended: {round} is {phase}")]
    RoundNotEnded { round: RoundIndex, phase: RoundPhase },

    // =================================================================
    // Bid Errors (3xx)
    // =================================================================
    /// The caller has no live bid for this player in the round.
    #[error("SB_ERR_300: No live bid from {bettor} on {player}")]
    BidNotFound { player: PlayerId, bettor: Identity },

    // =================================================================
    // Access Control / Ciphertext Errors (4xx)
    // =================================================================
    /// The access token's signature does not prove the claimed identity.
    #[error("SB_ERR_400: Invalid access token: {reason}")]
    InvalidAccessToken { reason: String },

    /// The submitted ciphertext is structurally unacceptable.
    #[error("SB_ERR_401: Invalid ciphertext: {reason}")]
    InvalidCiphertext { reason: String },

    /// The ciphertext handle is unknown to the store.
    #[error("SB_ERR_402: Ciphertext not found: {0}")]
    CiphertextNotFound(CiphertextHandle),

    /// The encryption backend refused or failed a re-encryption.
    #[error("SB_ERR_403: Encryption backend error: {0}")]
    Backend(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, out-of-range limits, etc.).
    #[error("SB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl SealbidError {
    /// Shorthand for an [`SealbidError::Unauthorized`] rejection.
    pub fn unauthorized(caller: Identity, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller,
            action: action.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SealbidError>;

impl From<serde_json::Error> for SealbidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
