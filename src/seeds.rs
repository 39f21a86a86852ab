//! Seed handling for generation.
//!
//! Every seeded operation in the crate builds its own generator from the seed it
//! is handed. There is no shared generator, so two calls with the same seed see
//! the same stream no matter what ran in between, and concurrent calls cannot
//! disturb each other.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Upper bound (exclusive) for seeds drawn by [`new_random_seed`].
pub const RANDOM_SEED_LIMIT: u64 = 10_000;

/// A fresh generator for `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draw a new seed from OS entropy, in `0..RANDOM_SEED_LIMIT`.
pub fn new_random_seed() -> u64 {
    rand::thread_rng().gen_range(0..RANDOM_SEED_LIMIT)
}

/// Produce a version-4 UUID string from `seed`.
pub fn uuid_from_seed(seed: u64) -> String {
    let mut bytes = [0u8; 16];
    seeded_rng(seed).fill_bytes(&mut bytes);

    // Version 4, RFC 4122 variant
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
