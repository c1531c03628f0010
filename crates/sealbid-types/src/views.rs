//! Read models returned by ledger queries.
//!
//! These are snapshots: they carry handles and sealed values, never the
//! ledger's internal maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuctionId, Identity, PlayerId, RoundIndex, RoundPhase, RoundWindow, SealedValue};

/// One entry of the auction listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSummary {
    pub auction_id: AuctionId,
    pub owner: Identity,
    pub round_count: usize,
    pub created_at: DateTime<Utc>,
}

/// A round as seen from outside, with its phase evaluated at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub index: RoundIndex,
    pub window: RoundWindow,
    pub phase: RoundPhase,
    /// Number of live bids across all players and bettors.
    pub bid_count: usize,
}

/// Full detail of a single auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionView {
    pub auction_id: AuctionId,
    pub owner: Identity,
    pub created_at: DateTime<Utc>,
    pub rounds: Vec<RoundInfo>,
}

/// A bettor's own bid, re-encrypted to the bettor's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettorBid {
    pub player_id: PlayerId,
    pub amount: SealedValue,
}

/// One bettor's bid inside an aggregate read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBid {
    pub bettor: Identity,
    pub amount: SealedValue,
}

/// Every live bid on one player, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBids {
    pub player_id: PlayerId,
    pub bids: Vec<PlacedBid>,
}

/// Aggregate of a closed round, grouped by player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundBids {
    pub round: RoundIndex,
    pub players: Vec<PlayerBids>,
}

impl RoundBids {
    /// Total number of bids across all players.
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.players.iter().map(|p| p.bids.len()).sum()
    }

    /// The group for `player_id`, if any bettor has a live bid on it.
    #[must_use]
    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerBids> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}
