//! # sealbid-types
//!
//! Shared types, errors, and configuration for the **sealbid** confidential
//! auction ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AuctionId`], [`RoundIndex`], [`PlayerId`], [`Identity`], [`CiphertextHandle`]
//! - **Ciphertext model**: [`EncryptedInput`], [`ReencryptionKey`], [`SealedValue`]
//! - **Encryption seam**: [`EncryptionBackend`]
//! - **Access control**: [`AccessToken`]
//! - **Round model**: [`RoundWindow`], [`RoundPhase`]
//! - **Read models**: [`AuctionSummary`], [`AuctionView`], [`RoundInfo`], [`BettorBid`], [`PlacedBid`], [`PlayerBids`], [`RoundBids`]
//! - **Time**: [`Clock`], [`SystemClock`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`SealbidError`] with `SB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod access;
pub mod backend;
pub mod ciphertext;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod round;
pub mod views;

// Re-export all primary types at crate root for ergonomic imports:
//   use sealbid_types::{AuctionId, Identity, RoundWindow, ...};

pub use access::*;
pub use backend::*;
pub use ciphertext::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use round::*;
pub use views::*;

// Constants are accessed via `sealbid_types::constants::FOO`
// (not re-exported to avoid name collisions).
