//! Deterministic data generators for partition and histogram tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `0, 1, ..., n - 1` as `f64`.
pub fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// `n` values drawn uniformly from `[lo, hi)` with a seeded ChaCha8 stream.
pub fn random_field(seed: u64, n: usize, lo: f64, hi: f64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(lo..hi)).collect()
}

/// A seeded ghost mask of length `n` where roughly `fraction` of entries
/// are nonzero.
pub fn random_mask(seed: u64, n: usize, fraction: f64) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| u8::from(rng.random::<f64>() < fraction))
        .collect()
}

/// Split `values` into `parts` contiguous chunks whose lengths differ by
/// at most one. Trailing chunks may be empty when `parts > values.len()`.
pub fn split_values(values: &[f64], parts: usize) -> Vec<Vec<f64>> {
    assert!(parts > 0, "cannot split into zero parts");
    let base = values.len() / parts;
    let extra = values.len() % parts;
    let mut out = Vec::with_capacity(parts);
    let mut start = 0;
    for p in 0..parts {
        let len = base + usize::from(p < extra);
        out.push(values[start..start + len].to_vec());
        start += len;
    }
    out
}

/// Serial reference histogram: `(min, max, counts)` over the non-NaN
/// values, with the maximum counted in the last bin.
///
/// Returns `None` when fewer than two distinct values exist.
pub fn serial_histogram(values: &[f64], bins: usize) -> Option<(f64, f64, Vec<u64>)> {
    let finite = values.iter().copied().filter(|v| !v.is_nan());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.clone().fold(f64::NEG_INFINITY, f64::max);
    if !(min < max) || bins == 0 {
        return None;
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0u64; bins];
    for v in finite {
        let slot = (((v - min) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }
    Some((min, max, counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_field_is_reproducible() {
        let a = random_field(7, 32, -1.0, 1.0);
        let b = random_field(7, 32, -1.0, 1.0);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (-1.0..1.0).contains(v)));
        assert_ne!(a, random_field(8, 32, -1.0, 1.0));
    }

    #[test]
    fn split_is_contiguous_and_balanced() {
        let parts = split_values(&ramp(10), 3);
        let lens: Vec<usize> = parts.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![4, 3, 3]);
        assert_eq!(parts.concat(), ramp(10));
        assert_eq!(split_values(&ramp(1), 3)[2], Vec::<f64>::new());
    }

    #[test]
    fn serial_reference_matches_hand_count() {
        let mut values = ramp(10);
        values.push(10.0);
        let (min, max, counts) = serial_histogram(&values, 5).unwrap();
        assert_eq!((min, max), (0.0, 10.0));
        assert_eq!(counts, vec![2, 2, 2, 2, 3]);
        assert!(serial_histogram(&[1.0, 1.0], 3).is_none());
    }

    #[test]
    fn mask_fraction_extremes() {
        assert!(random_mask(1, 16, 0.0).iter().all(|&m| m == 0));
        assert!(random_mask(1, 16, 1.0).iter().all(|&m| m == 1));
    }
}
