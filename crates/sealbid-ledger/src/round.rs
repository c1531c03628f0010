//! Time-gated round: a bidding window plus its bid book.
//!
//! The book is only reachable through phase-checked accessors:
//! [`Round::book_for_bidding`] during ACTIVE, [`Round::book_for_aggregate`]
//! once ENDED. The bettor-scoped view [`Round::book`] is open in every phase
//! because it only ever yields the caller's own entries upstream.

use chrono::{DateTime, Utc};
use sealbid_types::{Result, RoundIndex, RoundInfo, RoundPhase, RoundWindow, SealbidError};

use crate::bid_book::BidBook;

/// One round of an auction.
#[derive(Debug)]
pub struct Round {
    index: RoundIndex,
    window: RoundWindow,
    book: BidBook,
}

impl Round {
    #[must_use]
    pub fn new(index: RoundIndex, window: RoundWindow) -> Self {
        Self {
            index,
            window,
            book: BidBook::new(),
        }
    }

    #[must_use]
    pub fn index(&self) -> RoundIndex {
        self.index
    }

    #[must_use]
    pub fn window(&self) -> &RoundWindow {
        &self.window
    }

    /// Phase at `now`, recomputed on every call.
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> RoundPhase {
        self.window.phase_at(now)
    }

    /// Guard a bid mutation.
    ///
    /// # Errors
    /// Returns `RoundNotActive` unless the round is ACTIVE at `now`.
    pub fn ensure_active(&self, now: DateTime<Utc>) -> Result<()> {
        match self.phase(now) {
            RoundPhase::Active => Ok(()),
            phase => Err(SealbidError::RoundNotActive {
                round: self.index,
                phase,
            }),
        }
    }

    /// Guard an aggregate read.
    ///
    /// # Errors
    /// Returns `RoundNotEnded` unless the round is ENDED at `now`.
    pub fn ensure_ended(&self, now: DateTime<Utc>) -> Result<()> {
        match self.phase(now) {
            RoundPhase::Ended => Ok(()),
            phase => Err(SealbidError::RoundNotEnded {
                round: self.index,
                phase,
            }),
        }
    }

    /// Mutable book access, only while bidding is open.
    pub fn book_for_bidding(&mut self, now: DateTime<Utc>) -> Result<&mut BidBook> {
        self.ensure_active(now)?;
        Ok(&mut self.book)
    }

    /// Read access to every bettor's entries, only after the round closed.
    pub fn book_for_aggregate(&self, now: DateTime<Utc>) -> Result<&BidBook> {
        self.ensure_ended(now)?;
        Ok(&self.book)
    }

    /// Read access for bettor-scoped queries, open in every phase.
    #[must_use]
    pub fn book(&self) -> &BidBook {
        &self.book
    }

    /// Snapshot for queries.
    #[must_use]
    pub fn info(&self, now: DateTime<Utc>) -> RoundInfo {
        RoundInfo {
            index: self.index,
            window: self.window,
            phase: self.phase(now),
            bid_count: self.book.live_bid_count(),
        }
    }
}
