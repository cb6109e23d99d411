#![allow(dead_code)]

use criterion::PlotConfiguration;
use rand::distributions::{Distribution, Uniform};
use rand::prelude::ThreadRng;
use rand::seq::index::sample;

/// Number of values each benchmark iteration extracts from.
pub const BATCH: usize = 1 << 12;

pub const POPCOUNTS: [usize; 9] = [1, 2, 4, 8, 16, 24, 32, 48, 64];

pub const RUNS: [usize; 8] = [1, 2, 3, 4, 8, 12, 16, 32];

/// A mask with `runs` maximal runs of set bits at random positions.
pub fn mask_with_runs(rng: &mut ThreadRng, runs: usize) -> u64 {
    let mut cuts = sample(rng, 65, 2 * runs).into_vec();
    cuts.sort_unstable();

    cuts.chunks_exact(2).fold(0u64, |mask, run| {
        let len = run[1] - run[0];
        mask | if len == 64 {
            u64::MAX
        } else {
            ((1u64 << len) - 1) << run[0]
        }
    })
}

/// A mask with `popcount` set bits at random positions.
pub fn mask_with_popcount(rng: &mut ThreadRng, popcount: usize) -> u64 {
    sample(rng, 64, popcount)
        .into_iter()
        .fold(0u64, |mask, bit| mask | 1 << bit)
}

pub fn fill_random_vec(rng: &mut ThreadRng, len: usize) -> Vec<u64> {
    let sample = Uniform::new_inclusive(0, u64::MAX);

    let mut vec = Vec::with_capacity(len);
    for _ in 0..len {
        vec.push(sample.sample(rng));
    }

    vec
}

pub fn plot_config() -> PlotConfiguration {
    PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic)
}
