//! # sealbid-ledger
//!
//! **Confidential bid-collection ledger**: auctions made of time-boxed
//! rounds, encrypted bid intake with replace and withdraw semantics, and
//! access-controlled re-encryption reads.
//!
//! ## Architecture
//!
//! 1. **CiphertextStore**: opaque handles, per-handle reader lists, backend re-encryption
//! 2. **BidBook**: per-round `(player, bettor) -> handle` with submission ordering
//! 3. **Round**: window + book; phase recomputed from the clock on every access
//! 4. **AuctionRegistry**: auctions, owners, append-only round sequences
//! 5. **AuctionLedger**: composes the above with an injected [`Clock`] and
//!    [`EncryptionBackend`]; exposes the command surface
//!
//! ## Access rules
//!
//! ```text
//! place / withdraw      → round ACTIVE
//! own bids (token)      → any phase, caller's entries only
//! all bids (token)      → ENDED rounds only, auction owner only
//! add round             → auction owner, last round ENDED
//! ```
//!
//! No code path compares or orders bid values: they are never decrypted here.
//!
//! [`Clock`]: sealbid_types::Clock
//! [`EncryptionBackend`]: sealbid_types::EncryptionBackend

pub mod bid_book;
pub mod ciphertext_store;
pub mod command;
pub mod ledger;
pub mod registry;
pub mod round;

pub use bid_book::BidBook;
pub use ciphertext_store::CiphertextStore;
pub use command::{Command, CommandOutcome};
pub use ledger::AuctionLedger;
pub use registry::{Auction, AuctionRegistry};
pub use round::Round;
