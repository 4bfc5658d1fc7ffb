//! Per-engine random number generators.
//!
//! Every trainer task and every particle owns its own `StdRng`. With a base
//! seed the streams are reproducible; each one is derived from the base and
//! a stable label so no two engines draw from the same sequence.

use rand::rngs::StdRng;
use rand::SeedableRng;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// splitmix64 finaliser
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Combines a base seed with a label (sensor id, particle index, ...).
pub fn derive_seed(base: u64, label: &str) -> u64 {
    let hash = label
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ b as u64).wrapping_mul(FNV_PRIME));
    mix(base ^ mix(hash))
}

/// Seeded generator when `seed` is set, entropy-seeded otherwise.
pub fn rng_for(seed: Option<u64>, label: &str) -> StdRng {
    match seed {
        Some(base) => StdRng::seed_from_u64(derive_seed(base, label)),
        None => StdRng::from_entropy(),
    }
}
