//! Deterministic test data.

/// Uniform noise in `[-0.5, 0.5)` from a splitmix64 hash of `(i, seed)`.
pub fn noise(i: usize, seed: u64) -> f64 {
    let mut x = (i as u64).wrapping_add(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}

/// Accumulated noise.
pub fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut level = 0.0;
    (0..n)
        .map(|i| {
            level += noise(i, seed);
            level
        })
        .collect()
}
