//! Input generators shared by the unit tests.

use rand::seq::index::sample;
use rand::Rng;

/// A mask with exactly `runs` maximal runs of set bits, at random positions and lengths.
///
/// The run boundaries are `2 * runs` distinct cut points in `0..=64`, so adjacent runs are always
/// separated by at least one unset bit.
pub(crate) fn random_mask_with_runs<R: Rng>(rng: &mut R, runs: usize) -> u64 {
    assert!(runs <= 32, "a 64-bit mask has at most 32 runs");

    let mut cuts = sample(rng, 65, 2 * runs).into_vec();
    cuts.sort_unstable();

    let mut mask = 0u64;
    for run in cuts.chunks_exact(2) {
        let (start, end) = (run[0], run[1]);
        mask |= if end - start == 64 {
            u64::MAX
        } else {
            ((1u64 << (end - start)) - 1) << start
        };
    }
    mask
}

/// A mask with exactly `popcount` set bits at random positions.
pub(crate) fn random_mask_with_popcount<R: Rng>(rng: &mut R, popcount: usize) -> u64 {
    sample(rng, 64, popcount)
        .into_iter()
        .fold(0u64, |mask, bit| mask | 1 << bit)
}
