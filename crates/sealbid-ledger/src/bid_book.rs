//! Per-round bid book: `(player, bettor) -> ciphertext handle`.
//!
//! The book holds at most one live bid per `(player, bettor)` key. Placing a
//! bid on an occupied key replaces the handle in place; withdrawing removes
//! the key entirely.
//!
//! Ordering is by submission only, never by value (values are encrypted):
//! - players are listed in the order they first received a live bid
//! - within a player, bettors are listed in the order they bid
//! - a bettor's own bids are listed in the order they first bid on each player
//!
//! A replacement keeps the entry's position. A withdrawal followed by a new
//! bid appends the key at the end, as if it had never been placed.

use std::collections::HashMap;

use sealbid_types::{CiphertextHandle, Identity, PlayerId};

/// Live bids of a single round.
#[derive(Debug, Default)]
pub struct BidBook {
    /// Player -> bettor entries in submission order.
    by_player: HashMap<PlayerId, Vec<(Identity, CiphertextHandle)>>,
    /// Players in order of their first live bid.
    player_order: Vec<PlayerId>,
    /// Bettor -> players in the order the bettor first bid on them.
    by_bettor: HashMap<Identity, Vec<PlayerId>>,
}

impl BidBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the live bid for `(player, bettor)`, if any.
    #[must_use]
    pub fn get(&self, player: PlayerId, bettor: &Identity) -> Option<CiphertextHandle> {
        self.by_player
            .get(&player)?
            .iter()
            .find(|(who, _)| who == bettor)
            .map(|(_, handle)| *handle)
    }

    /// Insert or replace the bid for `(player, bettor)`.
    ///
    /// Returns the handle that was replaced, if the key was occupied.
    pub fn upsert(
        &mut self,
        player: PlayerId,
        bettor: Identity,
        handle: CiphertextHandle,
    ) -> Option<CiphertextHandle> {
        let entries = self.by_player.entry(player).or_insert_with(|| {
            self.player_order.push(player);
            Vec::new()
        });

        if let Some(slot) = entries.iter_mut().find(|(who, _)| *who == bettor) {
            return Some(std::mem::replace(&mut slot.1, handle));
        }

        entries.push((bettor, handle));
        self.by_bettor.entry(bettor).or_default().push(player);
        None
    }

    /// Remove the bid for `(player, bettor)`, returning its handle.
    pub fn remove(&mut self, player: PlayerId, bettor: &Identity) -> Option<CiphertextHandle> {
        let entries = self.by_player.get_mut(&player)?;
        let pos = entries.iter().position(|(who, _)| who == bettor)?;
        let (_, handle) = entries.remove(pos);

        if entries.is_empty() {
            self.by_player.remove(&player);
            self.player_order.retain(|p| *p != player);
        }

        if let Some(players) = self.by_bettor.get_mut(bettor) {
            players.retain(|p| *p != player);
            if players.is_empty() {
                self.by_bettor.remove(bettor);
            }
        }

        Some(handle)
    }

    /// Every live bid of `bettor`, in the bettor's own insertion order.
    #[must_use]
    pub fn bettor_bids(&self, bettor: &Identity) -> Vec<(PlayerId, CiphertextHandle)> {
        self.by_bettor
            .get(bettor)
            .map(|players| {
                players
                    .iter()
                    .filter_map(|player| self.get(*player, bettor).map(|h| (*player, h)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All live bids grouped by player.
    #[must_use]
    pub fn grouped(&self) -> Vec<(PlayerId, &[(Identity, CiphertextHandle)])> {
        self.player_order
            .iter()
            .filter_map(|player| {
                self.by_player
                    .get(player)
                    .map(|entries| (*player, entries.as_slice()))
            })
            .collect()
    }

    /// Total number of live bids.
    #[must_use]
    pub fn live_bid_count(&self) -> usize {
        self.by_player.values().map(Vec::len).sum()
    }

    /// Number of players with at least one live bid.
    #[must_use]
    pub fn players_with_bids(&self) -> usize {
        self.player_order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.player_order.is_empty()
    }
}
