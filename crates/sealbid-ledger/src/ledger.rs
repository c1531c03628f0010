//! The auction ledger engine.
//!
//! [`AuctionLedger`] composes the registry, the ciphertext store, a clock and
//! an encryption backend into the command surface. It is an ordinary owned
//! value: tests build as many isolated ledgers as they like, and every
//! mutating command takes `&mut self`, so commands against one ledger run in
//! a single total order.
//!
//! Every command reads the clock exactly once and evaluates all round phases
//! against that reading. A command either commits all of its changes or
//! returns an error having changed nothing.

use chrono::{DateTime, Utc};
use sealbid_types::{
    AccessToken, AuctionId, AuctionSummary, AuctionView, BettorBid, Clock, EncryptedInput,
    EncryptionBackend, Identity, LedgerConfig, PlacedBid, PlayerBids, PlayerId,
    ReencryptionKey, Result, RoundBids, RoundIndex, RoundInfo, RoundPhase, SealbidError,
};

use crate::{
    ciphertext_store::CiphertextStore,
    registry::{Auction, AuctionRegistry},
    round::Round,
};

fn rejected(command: &'static str, caller: &Identity, err: &SealbidError) {
    tracing::warn!(command, caller = %caller, error = %err, "command rejected");
}

fn log_read<T>(
    command: &'static str,
    auction_id: AuctionId,
    caller: &Identity,
    token: &AccessToken,
    result: &Result<T>,
) {
    match result {
        Ok(_) => tracing::debug!(
            command,
            auction = %auction_id,
            caller = %caller,
            sealed_to = %token.public_key.fingerprint(),
            "read served"
        ),
        Err(err) => rejected(command, caller, err),
    }
}

/// Confidential sealed-bid auction ledger.
pub struct AuctionLedger<C: Clock, B: EncryptionBackend> {
    config: LedgerConfig,
    clock: C,
    backend: B,
    registry: AuctionRegistry,
    store: CiphertextStore,
}

impl<C: Clock, B: EncryptionBackend> AuctionLedger<C, B> {
    /// Build an empty ledger.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: LedgerConfig, clock: C, backend: B) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            ledger_id = %config.ledger_id,
            max_rounds = config.max_rounds_per_auction,
            overlapping_rounds = config.allow_overlapping_rounds,
            "auction ledger initialised"
        );
        Ok(Self {
            store: CiphertextStore::new(config.max_ciphertext_bytes),
            registry: AuctionRegistry::new(),
            config,
            clock,
            backend,
        })
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of ciphertexts currently held (live bids across all rounds).
    #[must_use]
    pub fn ciphertext_count(&self) -> usize {
        self.store.len()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -----------------------------------------------------------------
    // Registry commands
    // -----------------------------------------------------------------

    /// Create an auction owned by `caller`.
    pub fn create_auction(&mut self, caller: Identity) -> AuctionId {
        let now = self.now();
        let id = self.registry.create(caller, now);
        tracing::info!(auction = %id, owner = %caller, "auction created");
        id
    }

    /// Every auction in creation order.
    #[must_use]
    pub fn auctions(&self) -> Vec<AuctionSummary> {
        self.registry.summaries()
    }

    /// Detail of one auction, with round phases evaluated now.
    pub fn auction(&self, auction_id: AuctionId) -> Result<AuctionView> {
        let now = self.now();
        Ok(self.registry.get(auction_id)?.view(now))
    }

    /// Append a round `[start, end)` to an auction. Owner only.
    ///
    /// # Errors
    /// `AuctionNotFound`, `Unauthorized`, `InvalidWindow`,
    /// `PreviousRoundOpen`, `RoundLimitExceeded`, `RoundOverlap`.
    pub fn add_round(
        &mut self,
        caller: Identity,
        auction_id: AuctionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RoundIndex> {
        let now = self.now();
        let result = self
            .registry
            .add_round(&caller, auction_id, start, end, now, &self.config);
        match &result {
            Ok(round) => tracing::info!(
                auction = %auction_id,
                round = %round,
                start = %start,
                end = %end,
                "round added"
            ),
            Err(err) => rejected("add_round", &caller, err),
        }
        result
    }

    /// The round whose window contains the current time.
    ///
    /// # Errors
    /// `AuctionNotFound`, or `NoActiveRound` if no window contains now.
    pub fn current_round(&self, auction_id: AuctionId) -> Result<RoundInfo> {
        let now = self.now();
        let auction = self.registry.get(auction_id)?;
        let index = auction
            .current_round_index(now)
            .ok_or(SealbidError::NoActiveRound(auction_id))?;
        Ok(auction.round(index)?.info(now))
    }

    /// A specific round, whatever its phase.
    pub fn round(&self, auction_id: AuctionId, round: RoundIndex) -> Result<RoundInfo> {
        let now = self.now();
        Ok(self.registry.get(auction_id)?.round(round)?.info(now))
    }

    // -----------------------------------------------------------------
    // Bid mutations
    // -----------------------------------------------------------------

    /// Place or replace `caller`'s bid on `player_id` in the current round.
    ///
    /// The auction owner is admitted as a reader of the ciphertext so the
    /// aggregate can be re-encrypted for them once the round ends.
    ///
    /// # Errors
    /// `AuctionNotFound`, `NoActiveRound` (auction has no rounds),
    /// `RoundNotActive`, `InvalidCiphertext`.
    pub fn place_bid(
        &mut self,
        caller: Identity,
        auction_id: AuctionId,
        player_id: PlayerId,
        amount: EncryptedInput,
    ) -> Result<()> {
        let result = self.try_place_bid(caller, auction_id, player_id, amount);
        match &result {
            Ok((round, replaced)) => tracing::info!(
                auction = %auction_id,
                round = %round,
                player = %player_id,
                bettor = %caller,
                replaced,
                "bid placed"
            ),
            Err(err) => rejected("place_bid", &caller, err),
        }
        result.map(|_| ())
    }

    fn try_place_bid(
        &mut self,
        caller: Identity,
        auction_id: AuctionId,
        player_id: PlayerId,
        amount: EncryptedInput,
    ) -> Result<(RoundIndex, bool)> {
        let now = self.now();
        let auction = self.registry.get_mut(auction_id)?;
        let owner = auction.owner();
        let index = auction.bidding_round_index(now)?;
        let book = auction.round_mut(index)?.book_for_bidding(now)?;

        if let Some(handle) = book.get(player_id, &caller) {
            self.store.replace(handle, amount, &self.backend)?;
            return Ok((index, true));
        }

        let handle = self.store.store(caller, amount, &[owner], &self.backend)?;
        book.upsert(player_id, caller, handle);
        Ok((index, false))
    }

    /// Withdraw `caller`'s bid on `player_id` from the current round.
    ///
    /// # Errors
    /// `AuctionNotFound`, `NoActiveRound`, `RoundNotActive`, and
    /// `BidNotFound` if the caller has no live bid on that player (a repeated
    /// withdrawal fails the same way).
    pub fn withdraw_bid(
        &mut self,
        caller: Identity,
        auction_id: AuctionId,
        player_id: PlayerId,
    ) -> Result<()> {
        let result = self.try_withdraw_bid(caller, auction_id, player_id);
        match &result {
            Ok(round) => tracing::info!(
                auction = %auction_id,
                round = %round,
                player = %player_id,
                bettor = %caller,
                "bid withdrawn"
            ),
            Err(err) => rejected("withdraw_bid", &caller, err),
        }
        result.map(|_| ())
    }

    fn try_withdraw_bid(
        &mut self,
        caller: Identity,
        auction_id: AuctionId,
        player_id: PlayerId,
    ) -> Result<RoundIndex> {
        let now = self.now();
        let auction = self.registry.get_mut(auction_id)?;
        let index = auction.bidding_round_index(now)?;
        let book = auction.round_mut(index)?.book_for_bidding(now)?;

        let handle = book
            .get(player_id, &caller)
            .ok_or(SealbidError::BidNotFound {
                player: player_id,
                bettor: caller,
            })?;
        if self.store.get(handle).is_none() {
            return Err(SealbidError::Internal(format!(
                "bid book references missing ciphertext {handle}"
            )));
        }
        book.remove(player_id, &caller);
        self.store.remove(handle)?;
        Ok(index)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// `caller`'s own bids, re-encrypted to the key in `token`.
    ///
    /// Reads the current round, or once no window contains now, the most
    /// recently started round (the first round while all are pending).
    ///
    /// # Errors
    /// `InvalidAccessToken`, `AuctionNotFound`, `NoActiveRound` if the
    /// auction has no rounds.
    pub fn get_bids_by_bettor(
        &self,
        caller: Identity,
        auction_id: AuctionId,
        token: &AccessToken,
    ) -> Result<Vec<BettorBid>> {
        let now = self.now();
        let result: Result<Vec<BettorBid>> = token
            .verify(&caller, &self.config.ledger_id)
            .and_then(|()| self.registry.get(auction_id))
            .and_then(|auction| -> Result<Vec<BettorBid>> {
                let index = auction
                    .target_round_index(now)
                    .ok_or(SealbidError::NoActiveRound(auction_id))?;
                self.bettor_bids_in(auction.round(index)?, caller, &token.public_key)
            });
        log_read("get_bids_by_bettor", auction_id, &caller, token, &result);
        result
    }

    /// `caller`'s own bids in a specific round, any phase.
    ///
    /// # Errors
    /// `InvalidAccessToken`, `AuctionNotFound`, `RoundNotFound`.
    pub fn get_round_bids_by_bettor(
        &self,
        caller: Identity,
        auction_id: AuctionId,
        round: RoundIndex,
        token: &AccessToken,
    ) -> Result<Vec<BettorBid>> {
        let result: Result<Vec<BettorBid>> = token
            .verify(&caller, &self.config.ledger_id)
            .and_then(|()| self.registry.get(auction_id))
            .and_then(|auction| auction.round(round))
            .and_then(|round| self.bettor_bids_in(round, caller, &token.public_key));
        log_read("get_round_bids_by_bettor", auction_id, &caller, token, &result);
        result
    }

    fn bettor_bids_in(
        &self,
        round: &Round,
        caller: Identity,
        key: &ReencryptionKey,
    ) -> Result<Vec<BettorBid>> {
        round
            .book()
            .bettor_bids(&caller)
            .into_iter()
            .map(|(player_id, handle)| -> Result<BettorBid> {
                Ok(BettorBid {
                    player_id,
                    amount: self
                        .store
                        .reencrypt_for(handle, &caller, key, &self.backend)?,
                })
            })
            .collect()
    }

    /// Aggregates of every ended round of the auction, in round order,
    /// grouped by player and re-encrypted to the owner's key. Owner only.
    /// Pending and active rounds are left out.
    ///
    /// # Errors
    /// `InvalidAccessToken`, `AuctionNotFound`, `Unauthorized`,
    /// `NoActiveRound` if the auction has no rounds, `RoundNotEnded` if no
    /// round has ended yet.
    pub fn get_bids(
        &self,
        caller: Identity,
        auction_id: AuctionId,
        token: &AccessToken,
    ) -> Result<Vec<RoundBids>> {
        let now = self.now();
        let result: Result<Vec<RoundBids>> = self
            .owned_auction(caller, auction_id, token)
            .and_then(|auction| -> Result<Vec<RoundBids>> {
                let first = auction
                    .rounds()
                    .first()
                    .ok_or(SealbidError::NoActiveRound(auction_id))?;
                let ended: Vec<&Round> = auction
                    .rounds()
                    .iter()
                    .filter(|round| round.phase(now) == RoundPhase::Ended)
                    .collect();
                if ended.is_empty() {
                    first.ensure_ended(now)?;
                }
                ended
                    .into_iter()
                    .map(|round| self.aggregate(round, now, caller, token))
                    .collect()
            });
        log_read("get_bids", auction_id, &caller, token, &result);
        result
    }

    /// Aggregate of a single ended round. Owner only.
    ///
    /// # Errors
    /// `InvalidAccessToken`, `AuctionNotFound`, `Unauthorized`,
    /// `RoundNotFound`, `RoundNotEnded`.
    pub fn get_round_bids(
        &self,
        caller: Identity,
        auction_id: AuctionId,
        round: RoundIndex,
        token: &AccessToken,
    ) -> Result<RoundBids> {
        let now = self.now();
        let result: Result<RoundBids> = self
            .owned_auction(caller, auction_id, token)
            .and_then(|auction| auction.round(round))
            .and_then(|round| self.aggregate(round, now, caller, token));
        log_read("get_round_bids", auction_id, &caller, token, &result);
        result
    }

    fn owned_auction(
        &self,
        caller: Identity,
        auction_id: AuctionId,
        token: &AccessToken,
    ) -> Result<&Auction> {
        token.verify(&caller, &self.config.ledger_id)?;
        let auction = self.registry.get(auction_id)?;
        if !auction.is_owner(&caller) {
            return Err(SealbidError::unauthorized(
                caller,
                format!("read all bids of {auction_id}"),
            ));
        }
        Ok(auction)
    }

    fn aggregate(
        &self,
        round: &Round,
        now: DateTime<Utc>,
        owner: Identity,
        token: &AccessToken,
    ) -> Result<RoundBids> {
        let players = round
            .book_for_aggregate(now)?
            .grouped()
            .into_iter()
            .map(|(player_id, entries)| -> Result<PlayerBids> {
                let bids = entries
                    .iter()
                    .map(|(bettor, handle)| -> Result<PlacedBid> {
                        Ok(PlacedBid {
                            bettor: *bettor,
                            amount: self.store.reencrypt_for(
                                *handle,
                                &owner,
                                &token.public_key,
                                &self.backend,
                            )?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(PlayerBids { player_id, bids })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RoundBids {
            round: round.index(),
            players,
        })
    }
}
