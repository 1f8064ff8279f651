//! Deterministic per-track colors

use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when none is configured
pub const DEFAULT_COLOR_SEED: u64 = 0;

/// Generate `count` colors from a generator seeded with `seed`
///
/// Each channel is drawn uniformly from `[0, 255]`. The same count and seed
/// always yield the same colors, and the colors for `n` tracks are a prefix
/// of the colors for `n + 1`.
pub fn random_colors(count: usize, seed: u64) -> Vec<Rgb<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Rgb([
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                rng.random_range(0..=255),
            ])
        })
        .collect()
}
