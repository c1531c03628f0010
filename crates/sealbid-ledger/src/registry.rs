//! Auction registry: owns every auction and its append-only round sequence.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sealbid_types::{
    AuctionId, AuctionSummary, AuctionView, Identity, LedgerConfig, Result, RoundIndex,
    RoundPhase, RoundWindow, SealbidError, constants,
};

use crate::round::Round;

/// An auction: immutable id and owner, plus rounds that are only appended.
#[derive(Debug)]
pub struct Auction {
    id: AuctionId,
    owner: Identity,
    created_at: DateTime<Utc>,
    rounds: Vec<Round>,
}

impl Auction {
    #[must_use]
    pub fn id(&self) -> AuctionId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> Identity {
        self.owner
    }

    #[must_use]
    pub fn is_owner(&self, identity: &Identity) -> bool {
        self.owner == *identity
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Round at `index`.
    ///
    /// # Errors
    /// Returns `RoundNotFound` if the auction has no such round.
    pub fn round(&self, index: RoundIndex) -> Result<&Round> {
        self.rounds
            .get(index.as_usize())
            .ok_or(SealbidError::RoundNotFound {
                auction: self.id,
                round: index,
            })
    }

    /// Mutable round at `index`.
    pub fn round_mut(&mut self, index: RoundIndex) -> Result<&mut Round> {
        let auction = self.id;
        self.rounds
            .get_mut(index.as_usize())
            .ok_or(SealbidError::RoundNotFound {
                auction,
                round: index,
            })
    }

    /// First round, in sequence order, whose window contains `now`.
    #[must_use]
    pub fn current_round_index(&self, now: DateTime<Utc>) -> Option<RoundIndex> {
        self.rounds
            .iter()
            .find(|round| round.window().contains(now))
            .map(Round::index)
    }

    /// Round an auction-level command refers to at `now`: the current round,
    /// else the most recently started one, else the first (still pending).
    /// `None` only when the auction has no rounds.
    #[must_use]
    pub fn target_round_index(&self, now: DateTime<Utc>) -> Option<RoundIndex> {
        self.current_round_index(now).or_else(|| {
            self.rounds
                .iter()
                .rev()
                .find(|round| round.phase(now) != RoundPhase::Pending)
                .or_else(|| self.rounds.first())
                .map(Round::index)
        })
    }

    /// Round that bid mutations at `now` target.
    ///
    /// # Errors
    /// - `NoActiveRound` if the auction has no rounds at all
    /// - `RoundNotActive` naming the most recently started round (or the
    ///   first pending one) when no window contains `now`
    pub fn bidding_round_index(&self, now: DateTime<Utc>) -> Result<RoundIndex> {
        let index = self
            .target_round_index(now)
            .ok_or(SealbidError::NoActiveRound(self.id))?;
        self.round(index)?.ensure_active(now)?;
        Ok(index)
    }

    #[must_use]
    pub fn summary(&self) -> AuctionSummary {
        AuctionSummary {
            auction_id: self.id,
            owner: self.owner,
            round_count: self.rounds.len(),
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn view(&self, now: DateTime<Utc>) -> AuctionView {
        AuctionView {
            auction_id: self.id,
            owner: self.owner,
            created_at: self.created_at,
            rounds: self.rounds.iter().map(|round| round.info(now)).collect(),
        }
    }
}

/// All auctions, keyed by id. Ids are sequential, so key order is creation
/// order.
#[derive(Debug)]
pub struct AuctionRegistry {
    auctions: BTreeMap<AuctionId, Auction>,
    next_id: AuctionId,
}

impl AuctionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            auctions: BTreeMap::new(),
            next_id: AuctionId(constants::FIRST_AUCTION_ID),
        }
    }

    /// Allocate a new auction owned by `owner` with no rounds.
    pub fn create(&mut self, owner: Identity, now: DateTime<Utc>) -> AuctionId {
        let id = self.next_id;
        self.next_id = id.next();
        self.auctions.insert(
            id,
            Auction {
                id,
                owner,
                created_at: now,
                rounds: Vec::new(),
            },
        );
        id
    }

    /// # Errors
    /// Returns `AuctionNotFound` if the id is unknown.
    pub fn get(&self, id: AuctionId) -> Result<&Auction> {
        self.auctions
            .get(&id)
            .ok_or(SealbidError::AuctionNotFound(id))
    }

    /// # Errors
    /// Returns `AuctionNotFound` if the id is unknown.
    pub fn get_mut(&mut self, id: AuctionId) -> Result<&mut Auction> {
        self.auctions
            .get_mut(&id)
            .ok_or(SealbidError::AuctionNotFound(id))
    }

    /// Every auction in creation order.
    #[must_use]
    pub fn summaries(&self) -> Vec<AuctionSummary> {
        self.auctions.values().map(Auction::summary).collect()
    }

    /// Append a round `[start, end)` to an auction. Owner only.
    ///
    /// Checks run in this order: auction exists, caller is owner, window is
    /// well formed, the last round has ended at `now`, round limit, overlap
    /// with existing rounds (unless allowed by config).
    ///
    /// # Errors
    /// - `AuctionNotFound`
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidWindow` if `end <= start`
    /// - `PreviousRoundOpen` if the last round is still pending or active
    /// - `RoundLimitExceeded` if the auction is full
    /// - `RoundOverlap` if the window intersects an existing round
    pub fn add_round(
        &mut self,
        caller: &Identity,
        id: AuctionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Result<RoundIndex> {
        let auction = self.get_mut(id)?;
        if !auction.is_owner(caller) {
            return Err(SealbidError::unauthorized(
                *caller,
                format!("add rounds to {id}"),
            ));
        }
        let window = RoundWindow::new(start, end)?;
        if let Some(last) = auction.rounds.last() {
            let phase = last.phase(now);
            if phase != RoundPhase::Ended {
                return Err(SealbidError::PreviousRoundOpen {
                    auction: id,
                    round: last.index(),
                    phase,
                });
            }
        }
        if auction.rounds.len() >= config.max_rounds_per_auction {
            return Err(SealbidError::RoundLimitExceeded {
                auction: id,
                limit: config.max_rounds_per_auction,
            });
        }
        if !config.allow_overlapping_rounds {
            if let Some(existing) = auction
                .rounds
                .iter()
                .find(|round| round.window().overlaps(&window))
            {
                return Err(SealbidError::RoundOverlap {
                    auction: id,
                    existing: existing.index(),
                });
            }
        }

        let index = RoundIndex(
            u32::try_from(auction.rounds.len())
                .map_err(|_| SealbidError::Internal("round index overflow".to_string()))?,
        );
        auction.rounds.push(Round::new(index, window));
        Ok(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.auctions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty()
    }
}

impl Default for AuctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
