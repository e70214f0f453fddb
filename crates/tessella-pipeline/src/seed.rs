//! Seed scattering: uniform random points over the display region.
//!
//! The sampler is a pure function of `(region, count, rng)` — the caller
//! supplies the random source, so tests and the orchestrator can use a
//! seeded [`ChaCha8Rng`](rand_chacha::ChaCha8Rng) for reproducible
//! mosaics.
//!
//! Coincident points are legal output: the sampler performs no
//! deduplication. The triangulator flags duplicates instead of choking
//! on them.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::types::{Point, Region};

/// Scatter `count` points independently and uniformly over the region's
/// interior.
#[must_use = "returns the scattered seed points"]
pub fn scatter<R: Rng + ?Sized>(region: Region, count: usize, rng: &mut R) -> Vec<Point> {
    (0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(region.x()..region.right()),
                rng.gen_range(region.y()..region.bottom()),
            )
        })
        .collect()
}

/// Scatter with a freshly seeded deterministic RNG.
///
/// Convenience for the common case: two calls with identical arguments
/// produce identical point sets.
#[must_use = "returns the scattered seed points"]
pub fn scatter_seeded(region: Region, count: usize, rng_seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
    scatter(region, count, &mut rng)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn region() -> Region {
        Region::new(10.0, 20.0, 100.0, 50.0).unwrap()
    }

    #[test]
    fn scatter_produces_requested_count() {
        let points = scatter_seeded(region(), 250, 1);
        assert_eq!(points.len(), 250);
    }

    #[test]
    fn scatter_zero_is_empty() {
        assert!(scatter_seeded(region(), 0, 1).is_empty());
    }

    #[test]
    fn scattered_points_lie_inside_region() {
        let r = region();
        for p in scatter_seeded(r, 500, 7) {
            assert!(r.contains(p), "({}, {}) outside region", p.x, p.y);
        }
    }

    #[test]
    fn identical_seeds_are_reproducible() {
        let a = scatter_seeded(region(), 100, 42);
        let b = scatter_seeded(region(), 100, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = scatter_seeded(region(), 100, 1);
        let b = scatter_seeded(region(), 100, 2);
        assert_ne!(a, b);
    }
}
