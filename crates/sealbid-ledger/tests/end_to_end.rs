//! End-to-end tests for the sealed-bid lifecycle.
//!
//! These exercise the full flow through the public ledger API:
//! create auction -> add round -> place / replace / withdraw encrypted bids
//! -> bettor-scoped reads while open -> owner aggregate after close.
//!
//! Bid amounts are encrypted with the mock backend and only ever decrypted
//! here, on the "client" side, with the reader's own key pair.

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use sealbid_ledger::{AuctionLedger, Command, CommandOutcome};
use sealbid_types::*;

const T0: i64 = 1_704_067_200;

/// A participant: identity signing key plus re-encryption key pair.
struct Participant {
    signing: SigningKey,
    keys: MockKeyPair,
}

impl Participant {
    fn new(seed: u8) -> Self {
        Self {
            signing: SigningKey::from_bytes(&[seed; 32]),
            keys: MockKeyPair::from_seed(seed),
        }
    }

    fn random() -> Self {
        Self {
            signing: SigningKey::generate(&mut rand::thread_rng()),
            keys: MockKeyPair::random(),
        }
    }

    fn id(&self) -> Identity {
        Identity::from_verifying_key(&self.signing.verifying_key())
    }
}

/// Harness: ledger + shared clock + client-side backend.
struct Harness {
    ledger: AuctionLedger<ManualClock, MockBackend>,
    clock: ManualClock,
    client: MockBackend,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::at_unix(T0);
        let ledger = AuctionLedger::new(
            LedgerConfig::with_ledger_id("fantasy-football"),
            clock.clone(),
            MockBackend::new(),
        )
        .expect("default limits are valid");
        Self {
            ledger,
            clock,
            client: MockBackend::new(),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(T0 + secs, 0).unwrap()
    }

    /// Auction with one round `[t, t+len)` starting now.
    fn auction_with_round(&mut self, owner: &Participant, len: i64) -> AuctionId {
        let id = self.ledger.create_auction(owner.id());
        self.ledger
            .add_round(owner.id(), id, Self::at(0), Self::at(len))
            .expect("owner adds round");
        id
    }

    fn bid(&mut self, who: &Participant, auction: AuctionId, player: u64, amount: u64) {
        let input = self.client.encrypt(amount);
        self.ledger
            .place_bid(who.id(), auction, PlayerId(player), input)
            .expect("bid accepted");
    }

    fn token(&self, who: &Participant) -> AccessToken {
        AccessToken::sign(
            &who.signing,
            &self.ledger.config().ledger_id,
            who.keys.public_key(),
        )
    }

    /// Decrypted `(player, amount)` list of `who`'s own bids.
    fn my_bids(&self, who: &Participant, auction: AuctionId) -> Vec<(u64, u64)> {
        self.ledger
            .get_bids_by_bettor(who.id(), auction, &self.token(who))
            .expect("bettor read")
            .iter()
            .map(|bid| {
                (
                    bid.player_id.0,
                    self.client.decrypt(&bid.amount, &who.keys).unwrap(),
                )
            })
            .collect()
    }

    /// Decrypted aggregate: `player -> [(bettor, amount)]`, in ledger order.
    fn all_bids(
        &self,
        owner: &Participant,
        auction: AuctionId,
    ) -> Vec<(u64, Vec<(Identity, u64)>)> {
        let rounds = self
            .ledger
            .get_bids(owner.id(), auction, &self.token(owner))
            .expect("owner aggregate");
        assert_eq!(rounds.len(), 1);
        rounds[0]
            .players
            .iter()
            .map(|group| {
                (
                    group.player_id.0,
                    group
                        .bids
                        .iter()
                        .map(|b| (b.bettor, self.client.decrypt(&b.amount, &owner.keys).unwrap()))
                        .collect(),
                )
            })
            .collect()
    }
}

// =============================================================================
// Test: auction creation
// =============================================================================
#[test]
fn e2e_create_auction() {
    let mut h = Harness::new();
    let alice = Participant::new(1);

    let id = h.ledger.create_auction(alice.id());
    let listed = h.ledger.auctions();
    assert_eq!(listed.len(), 1);

    let auction = h.ledger.auction(listed[0].auction_id).unwrap();
    assert_eq!(auction.auction_id, id);
    assert_eq!(auction.owner, alice.id());
}

// =============================================================================
// Test: auction with a round; current round resolves to it
// =============================================================================
#[test]
fn e2e_auction_with_round() {
    let mut h = Harness::new();
    let alice = Participant::new(1);
    let id = h.auction_with_round(&alice, 20);

    let round = h.ledger.current_round(id).unwrap();
    assert_eq!(round.window.start, Harness::at(0));
    assert_eq!(round.window.end, Harness::at(20));
    assert_eq!(round.phase, RoundPhase::Active);
}

// =============================================================================
// Scenario: multiple bids, bettor reads own values; aggregate refused
// =============================================================================
#[test]
fn e2e_place_multiple_bids_and_read_back() {
    let mut h = Harness::new();
    let alice = Participant::new(1);
    let bob = Participant::new(2);
    let id = h.auction_with_round(&alice, 20);
    h.clock.advance(2);

    h.bid(&bob, id, 1, 18);
    h.bid(&bob, id, 2, 29);
    h.bid(&alice, id, 1, 5);

    assert_eq!(h.my_bids(&bob, id), vec![(1, 18), (2, 29)]);
    assert_eq!(h.my_bids(&alice, id), vec![(1, 5)]);

    let err = h
        .ledger
        .get_bids(alice.id(), id, &h.token(&alice))
        .unwrap_err();
    assert!(
        matches!(err, SealbidError::RoundNotEnded { .. }),
        "Expected RoundNotEnded, got: {err:?}"
    );
}

// =============================================================================
// Scenario: replacement is total, never additive
// =============================================================================
#[test]
fn e2e_replace_bid() {
    let mut h = Harness::new();
    let alice = Participant::new(1);
    let bob = Participant::new(2);
    let id = h.auction_with_round(&alice, 50);
    h.clock.advance(2);

    h.bid(&bob, id, 1, 18);
    h.bid(&bob, id, 2, 29);
    h.bid(&alice, id, 1, 5);
    h.bid(&bob, id, 2, 25);

    assert_eq!(h.my_bids(&bob, id), vec![(1, 18), (2, 25)]);
    assert_eq!(h.ledger.current_round(id).unwrap().bid_count, 3);
}

// =============================================================================
// Scenario: withdrawal removes the key; re-withdrawal fails
// =============================================================================
#[test]
fn e2e_withdraw_bid() {
    let mut h = Harness::new();
    let alice = Participant::new(1);
    let bob = Participant::new(2);
    let id = h.auction_with_round(&alice, 50);
    h.clock.advance(2);

    h.bid(&bob, id, 1, 18);
    h.bid(&bob, id, 2, 29);
    h.bid(&alice, id, 1, 5);

    h.ledger.withdraw_bid(bob.id(), id, PlayerId(1)).unwrap();
    assert_eq!(h.my_bids(&bob, id), vec![(2, 29)]);

    let err = h.ledger.withdraw_bid(bob.id(), id, PlayerId(1)).unwrap_err();
    assert!(matches!(
        err,
        SealbidError::BidNotFound {
            player: PlayerId(1),
            ..
        }
    ));

    // Alice's bid on the same player is untouched.
    assert_eq!(h.my_bids(&alice, id), vec![(1, 5)]);
}

// =============================================================================
// Scenario: owner aggregate after close, grouped by player
// =============================================================================
#[test]
fn e2e_get_all_bids_after_end() {
    let mut h = Harness::new();
    let alice = Participant::new(1);
    let bob = Participant::new(2);
    let id = h.auction_with_round(&alice, 50);
    h.clock.advance(2);

    h.bid(&bob, id, 1, 18);
    h.bid(&bob, id, 2, 29);
    h.bid(&alice, id, 1, 2);
    h.bid(&alice, id, 3, 44);

    h.clock.advance(50);

    let all = h.all_bids(&alice, id);
    assert_eq!(
        all,
        vec![
            (1, vec![(bob.id(), 18), (alice.id(), 2)]),
            (2, vec![(bob.id(), 29)]),
            (3, vec![(alice.id(), 44)]),
        ]
    );
}

// =============================================================================
// Scenario: the full spec walk-through, with withdraw before close
// =============================================================================
#[test]
fn e2e_full_lifecycle() {
    let mut h = Harness::new();
    let owner = Participant::new(1);
    let bob = Participant::new(2);
    let carol = Participant::new(3);
    let id = h.auction_with_round(&owner, 20);
    h.clock.advance(2);

    h.bid(&bob, id, 1, 18);
    h.bid(&bob, id, 2, 29);
    h.bid(&carol, id, 1, 5);
    h.bid(&bob, id, 2, 25);
    h.ledger.withdraw_bid(bob.id(), id, PlayerId(1)).unwrap();

    assert_eq!(h.my_bids(&bob, id), vec![(2, 25)]);

    // Exactly at end the round is closed.
    h.clock.set_unix(T0 + 20);
    let all = h.all_bids(&owner, id);
    assert_eq!(
        all,
        vec![(1, vec![(carol.id(), 5)]), (2, vec![(bob.id(), 25)])]
    );

    // Closed round: no more mutations.
    let err = h
        .ledger
        .place_bid(bob.id(), id, PlayerId(1), h.client.encrypt(99))
        .unwrap_err();
    assert!(matches!(err, SealbidError::RoundNotActive { .. }));
}

// =============================================================================
// Property: a bettor's result size equals their distinct live players
// =============================================================================
#[test]
fn e2e_result_size_independent_of_others() {
    let mut h = Harness::new();
    let owner = Participant::random();
    let bob = Participant::random();
    let id = h.auction_with_round(&owner, 100);

    let others: Vec<Participant> = (0..5).map(|_| Participant::random()).collect();
    for (i, other) in others.iter().enumerate() {
        for player in 0..=i as u64 {
            h.bid(other, id, player, 100 + player);
        }
    }
    for player in [4u64, 9, 4, 1, 9] {
        h.bid(&bob, id, player, player * 10);
    }

    let mine = h.my_bids(&bob, id);
    assert_eq!(mine, vec![(4, 40), (9, 90), (1, 10)]);
}

// =============================================================================
// Security: owner-only administration and aggregate
// =============================================================================
#[test]
fn e2e_owner_only_operations() {
    let mut h = Harness::new();
    let owner = Participant::new(1);
    let mallory = Participant::new(6);
    let id = h.ledger.create_auction(owner.id());

    let err = h
        .ledger
        .add_round(mallory.id(), id, Harness::at(0), Harness::at(20))
        .unwrap_err();
    assert!(matches!(err, SealbidError::Unauthorized { .. }));

    let err = h
        .ledger
        .add_round(owner.id(), id, Harness::at(20), Harness::at(20))
        .unwrap_err();
    assert!(matches!(err, SealbidError::InvalidWindow { .. }));

    h.ledger
        .add_round(owner.id(), id, Harness::at(0), Harness::at(20))
        .unwrap();
    h.bid(&mallory, id, 1, 1);
    h.clock.advance(30);

    let err = h
        .ledger
        .get_bids(mallory.id(), id, &h.token(&mallory))
        .unwrap_err();
    assert!(matches!(err, SealbidError::Unauthorized { .. }));
}

// =============================================================================
// Security: tokens are bound to caller and ledger
// =============================================================================
#[test]
fn e2e_token_binding() {
    let mut h = Harness::new();
    let owner = Participant::new(1);
    let bob = Participant::new(2);
    let eve = Participant::new(5);
    let id = h.auction_with_round(&owner, 20);
    h.bid(&bob, id, 1, 18);

    // Eve presents Bob's token under her own identity.
    let err = h
        .ledger
        .get_bids_by_bettor(eve.id(), id, &h.token(&bob))
        .unwrap_err();
    assert!(matches!(err, SealbidError::InvalidAccessToken { .. }));

    // Bob's token minted for another deployment.
    let foreign = AccessToken::sign(&bob.signing, "other-ledger", bob.keys.public_key());
    assert!(h.ledger.get_bids_by_bettor(bob.id(), id, &foreign).is_err());

    // Eve's own valid token shows her nothing.
    let bids = h
        .ledger
        .get_bids_by_bettor(eve.id(), id, &h.token(&eve))
        .unwrap();
    assert!(bids.is_empty());
}

// =============================================================================
// Rounds: sequential rounds, gaps, and per-round isolation
// =============================================================================
#[test]
fn e2e_sequential_rounds() {
    let mut h = Harness::new();
    let owner = Participant::new(1);
    let bob = Participant::new(2);
    let id = h.auction_with_round(&owner, 20);
    h.bid(&bob, id, 1, 10);

    // Round 0 is still open.
    let err = h
        .ledger
        .add_round(owner.id(), id, Harness::at(30), Harness::at(60))
        .unwrap_err();
    assert!(matches!(err, SealbidError::PreviousRoundOpen { .. }));

    h.clock.set_unix(T0 + 25);
    let err = h
        .ledger
        .add_round(owner.id(), id, Harness::at(10), Harness::at(40))
        .unwrap_err();
    assert!(matches!(err, SealbidError::RoundOverlap { .. }));
    h.ledger
        .add_round(owner.id(), id, Harness::at(30), Harness::at(60))
        .unwrap();

    // In the gap: nothing current, nothing to bid on, own bids still readable.
    assert!(matches!(
        h.ledger.current_round(id).unwrap_err(),
        SealbidError::NoActiveRound(_)
    ));
    assert_eq!(h.my_bids(&bob, id), vec![(1, 10)]);
    assert_eq!(h.all_bids(&owner, id), vec![(1, vec![(bob.id(), 10)])]);

    h.clock.set_unix(T0 + 35);
    assert_eq!(h.ledger.current_round(id).unwrap().index, RoundIndex(1));
    assert!(h.my_bids(&bob, id).is_empty());
    h.bid(&bob, id, 1, 11);
    assert_eq!(h.my_bids(&bob, id), vec![(1, 11)]);

    // The open round stays out of the aggregate until it ends.
    let rounds = h
        .ledger
        .get_bids(owner.id(), id, &h.token(&owner))
        .unwrap();
    assert_eq!(rounds.len(), 1);

    h.clock.set_unix(T0 + 60);
    let rounds = h
        .ledger
        .get_bids(owner.id(), id, &h.token(&owner))
        .unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].bid_count(), 1);
    assert_eq!(rounds[1].bid_count(), 1);
}

// =============================================================================
// Reads after close: bettor keeps access to their own bids
// =============================================================================
#[test]
fn e2e_bettor_reads_after_close() {
    let mut h = Harness::new();
    let owner = Participant::new(1);
    let bob = Participant::new(2);
    let id = h.auction_with_round(&owner, 20);
    h.bid(&bob, id, 1, 18);
    h.bid(&bob, id, 2, 29);

    h.clock.set_unix(T0 + 30);
    assert_eq!(h.my_bids(&bob, id), vec![(1, 18), (2, 29)]);

    let outcome = h
        .ledger
        .execute(
            bob.id(),
            Command::GetBidsByBettor {
                auction_id: id,
                token: h.token(&bob),
                round: None,
            },
        )
        .unwrap();
    let CommandOutcome::BettorBids { bids } = outcome else {
        panic!("expected BettorBids");
    };
    assert_eq!(bids.len(), 2);
}

// =============================================================================
// Command surface: JSON in, typed outcome out
// =============================================================================
#[test]
fn e2e_json_commands() {
    let mut h = Harness::new();
    let owner = Participant::new(1);

    let cmd: Command = serde_json::from_str(r#"{"type":"create_auction"}"#).unwrap();
    let outcome = h.ledger.execute(owner.id(), cmd).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::AuctionCreated {
            auction_id: AuctionId(1)
        }
    );

    let cmd: Command = serde_json::from_str(
        r#"{"type":"add_round","auction_id":1,"start":"2024-01-01T00:00:00Z","end":"2024-01-01T00:00:20Z"}"#,
    )
    .unwrap();
    h.ledger.execute(owner.id(), cmd).unwrap();

    let cmd: Command = serde_json::from_str(r#"{"type":"get_current_round","auction_id":1}"#).unwrap();
    let CommandOutcome::CurrentRound { round } = h.ledger.execute(owner.id(), cmd).unwrap() else {
        panic!("expected CurrentRound");
    };
    assert_eq!(round.window.end, Harness::at(20));

    // A token survives the JSON trip.
    let cmd = Command::GetBidsByBettor {
        auction_id: AuctionId(1),
        token: h.token(&owner),
        round: None,
    };
    let json = serde_json::to_string(&cmd).unwrap();
    let back: Command = serde_json::from_str(&json).unwrap();
    let outcome = h.ledger.execute(owner.id(), back).unwrap();
    assert_eq!(outcome, CommandOutcome::BettorBids { bids: Vec::new() });
}
