//! Deterministic seed derivation for independent random streams.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// Derive a stream-specific seed from the user seed and a domain tag.
///
/// HMAC-SHA256 keyed by the user seed keeps streams statistically
/// independent: two tags never share a seed unless the tags are equal.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &str) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag.as_bytes());
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Build the deterministic generator used for weather draws.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}
