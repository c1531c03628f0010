//! System-wide constants for the sealbid auction ledger.

/// Default ledger identifier bound into access-token signatures.
pub const DEFAULT_LEDGER_ID: &str = "sealbid-local";

/// Maximum rounds a single auction may accumulate (default).
pub const DEFAULT_MAX_ROUNDS_PER_AUCTION: usize = 256;

/// Maximum size of a submitted encrypted bid, in bytes (default).
///
/// Sized for a 64-bit FHE ciphertext plus its input proof.
pub const DEFAULT_MAX_CIPHERTEXT_BYTES: usize = 64 * 1024;

/// Domain separator prefixed to every access-token signing payload.
pub const ACCESS_TOKEN_DOMAIN: &[u8] = b"sealbid:reencrypt:v1:";

/// First auction id handed out by a fresh registry.
pub const FIRST_AUCTION_ID: u64 = 1;
