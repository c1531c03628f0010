//! Serializable command surface.
//!
//! A [`Command`] is what a client submits over whatever transport fronts the
//! ledger; [`AuctionLedger::execute`] dispatches it under the caller's
//! identity and returns a [`CommandOutcome`]. Both are tagged by `"type"` in
//! snake case:
//!
//! ```json
//! {"type":"add_round","auction_id":1,"start":"2024-01-01T00:00:00Z","end":"2024-01-01T00:00:20Z"}
//! ```

use chrono::{DateTime, Utc};
use sealbid_types::{
    AccessToken, AuctionId, AuctionSummary, AuctionView, BettorBid, Clock, EncryptedInput,
    EncryptionBackend, Identity, PlayerId, Result, RoundBids, RoundIndex, RoundInfo,
};
use serde::{Deserialize, Serialize};

use crate::ledger::AuctionLedger;

/// A client command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateAuction,
    AddRound {
        auction_id: AuctionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    PlaceBid {
        auction_id: AuctionId,
        player_id: PlayerId,
        amount: EncryptedInput,
    },
    WithdrawBid {
        auction_id: AuctionId,
        player_id: PlayerId,
    },
    GetAuctions,
    GetAuction {
        auction_id: AuctionId,
    },
    GetCurrentRound {
        auction_id: AuctionId,
    },
    /// Caller's own bids. Without `round`, the current round or else the
    /// most recently started one.
    GetBidsByBettor {
        auction_id: AuctionId,
        token: AccessToken,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round: Option<RoundIndex>,
    },
    /// Owner aggregate. Without `round`, every ended round.
    GetBids {
        auction_id: AuctionId,
        token: AccessToken,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round: Option<RoundIndex>,
    },
}

impl Command {
    /// Whether the command can change ledger state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateAuction
                | Self::AddRound { .. }
                | Self::PlaceBid { .. }
                | Self::WithdrawBid { .. }
        )
    }

    /// Stable name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAuction => "create_auction",
            Self::AddRound { .. } => "add_round",
            Self::PlaceBid { .. } => "place_bid",
            Self::WithdrawBid { .. } => "withdraw_bid",
            Self::GetAuctions => "get_auctions",
            Self::GetAuction { .. } => "get_auction",
            Self::GetCurrentRound { .. } => "get_current_round",
            Self::GetBidsByBettor { .. } => "get_bids_by_bettor",
            Self::GetBids { .. } => "get_bids",
        }
    }
}

/// Successful result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOutcome {
    AuctionCreated { auction_id: AuctionId },
    RoundAdded { round: RoundIndex },
    BidPlaced,
    BidWithdrawn,
    Auctions { auctions: Vec<AuctionSummary> },
    Auction { auction: AuctionView },
    CurrentRound { round: RoundInfo },
    BettorBids { bids: Vec<BettorBid> },
    Bids { rounds: Vec<RoundBids> },
}

impl<C: Clock, B: EncryptionBackend> AuctionLedger<C, B> {
    /// Run one command on behalf of `caller`.
    pub fn execute(&mut self, caller: Identity, command: Command) -> Result<CommandOutcome> {
        tracing::debug!(
            command = command.name(),
            mutation = command.is_mutation(),
            caller = %caller,
            "executing command"
        );
        match command {
            Command::CreateAuction => Ok(CommandOutcome::AuctionCreated {
                auction_id: self.create_auction(caller),
            }),
            Command::AddRound {
                auction_id,
                start,
                end,
            } => self
                .add_round(caller, auction_id, start, end)
                .map(|round| CommandOutcome::RoundAdded { round }),
            Command::PlaceBid {
                auction_id,
                player_id,
                amount,
            } => self
                .place_bid(caller, auction_id, player_id, amount)
                .map(|()| CommandOutcome::BidPlaced),
            Command::WithdrawBid {
                auction_id,
                player_id,
            } => self
                .withdraw_bid(caller, auction_id, player_id)
                .map(|()| CommandOutcome::BidWithdrawn),
            Command::GetAuctions => Ok(CommandOutcome::Auctions {
                auctions: self.auctions(),
            }),
            Command::GetAuction { auction_id } => self
                .auction(auction_id)
                .map(|auction| CommandOutcome::Auction { auction }),
            Command::GetCurrentRound { auction_id } => self
                .current_round(auction_id)
                .map(|round| CommandOutcome::CurrentRound { round }),
            Command::GetBidsByBettor {
                auction_id,
                token,
                round,
            } => match round {
                Some(round) => self.get_round_bids_by_bettor(caller, auction_id, round, &token),
                None => self.get_bids_by_bettor(caller, auction_id, &token),
            }
            .map(|bids| CommandOutcome::BettorBids { bids }),
            Command::GetBids {
                auction_id,
                token,
                round,
            } => match round {
                Some(round) => self
                    .get_round_bids(caller, auction_id, round, &token)
                    .map(|bids| vec![bids]),
                None => self.get_bids(caller, auction_id, &token),
            }
            .map(|rounds| CommandOutcome::Bids { rounds }),
        }
    }
}
