//! Benchmark driven backend selection.

use std::hint::black_box;
use std::time::{Duration, Instant};

use log::{debug, error};

use super::{AdaptivePext, ExtractMode};
use crate::error::{PextError, Result};
use crate::extract::BlockTable;
use crate::util::SplitMix64;

/// Default number of values benchmarked per candidate.
pub const DEFAULT_BATCH_SIZE: usize = 2 << 16;

/// The result of benchmarking one backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// The measured backend.
    pub mode: ExtractMode,
    /// Total time over all rounds.
    pub elapsed: Duration,
    /// Wrapping sum of all outputs of the backend over the batch, for all rounds.
    pub checksum: u64,
}

/// Configuration of the benchmark that selects a backend for [`AdaptivePext`].
///
/// All candidates run over the same batch of pseudo-random values, generated once by a
/// [`SplitMix64`] generator. Their outputs are summed into a checksum that must agree across all
/// candidates, so a faulty backend is detected during tuning rather than after.
///
/// # Example
/// ```rust
/// use vers_pext::{AdaptivePext, Tuner};
///
/// let tuner = Tuner::default().batch_size(1 << 12).rounds(2).seed(42);
/// let pext = AdaptivePext::with_tuner(0xFF00, &tuner).unwrap();
/// assert_eq!(pext.invoke(0xABCD), 0xAB);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuner {
    batch_size: usize,
    rounds: usize,
    seed: u64,
}

impl Default for Tuner {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            rounds: 1,
            seed: 0,
        }
    }
}

impl Tuner {
    /// Set the number of values per batch.
    ///
    /// # Panics
    /// Panics if `batch_size` is zero.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        self.batch_size = batch_size;
        self
    }

    /// Set how often each candidate runs over the batch.
    ///
    /// # Panics
    /// Panics if `rounds` is zero.
    #[must_use]
    pub fn rounds(mut self, rounds: usize) -> Self {
        assert!(rounds > 0, "number of rounds must be positive");
        self.rounds = rounds;
        self
    }

    /// Set the seed of the value generator.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The backends that are benchmarked on this machine, in measurement order.
    #[must_use]
    pub fn candidates() -> Vec<ExtractMode> {
        let mut candidates = Vec::with_capacity(ExtractMode::ALL.len() - 1);
        if crate::arch::has_hardware_pext() {
            candidates.push(ExtractMode::Hardware);
        }
        candidates.extend_from_slice(&[
            ExtractMode::ByteTable,
            ExtractMode::BlockTable,
            ExtractMode::BlockTableUnrolled2,
            ExtractMode::BlockTableUnrolled4,
            ExtractMode::BlockTableUnrolled8,
        ]);
        candidates
    }

    /// The benchmark input.
    pub(crate) fn batch(&self) -> Vec<u64> {
        SplitMix64::new(self.seed).take(self.batch_size).collect()
    }

    /// Benchmark all [candidates](Self::candidates) for `mask` with its precomputed block table.
    ///
    /// # Errors
    /// Fails only if binding a candidate fails, which does not happen for concrete modes.
    pub fn measure(&self, mask: u64, block_table: &BlockTable) -> Result<Vec<Measurement>> {
        let batch = self.batch();
        Self::candidates()
            .into_iter()
            .map(|mode| {
                let pext = AdaptivePext::bind(mask, mode, *block_table)?;
                let measurement = self.measure_one(&pext, &batch);
                debug!(
                    "mask {mask:#018x}: {mode} took {:?}, checksum {:#x}",
                    measurement.elapsed, measurement.checksum
                );
                Ok(measurement)
            })
            .collect()
    }

    fn measure_one(&self, pext: &AdaptivePext, batch: &[u64]) -> Measurement {
        let mut checksum = 0u64;
        let start = Instant::now();
        for _ in 0..self.rounds {
            for &value in batch {
                checksum = checksum.wrapping_add(pext.invoke(black_box(value)));
            }
        }
        let elapsed = start.elapsed();

        Measurement {
            mode: pext.mode(),
            elapsed,
            checksum: black_box(checksum),
        }
    }

    /// Benchmark all candidates and return the fastest one.
    ///
    /// # Errors
    /// Returns [`PextError::InconsistentBackends`] if two candidates disagree.
    pub fn tune(&self, mask: u64, block_table: &BlockTable) -> Result<ExtractMode> {
        let measurements = self.measure(mask, block_table)?;
        let winner = select_fastest(&measurements).inspect_err(|e| {
            error!("tuning failed for mask {mask:#018x}: {e}");
        })?;
        debug!("mask {mask:#018x}: selected {winner}");
        Ok(winner)
    }
}

/// Select the fastest of `measurements`, after checking that all of them produced the same
/// checksum as the first one. Exact ties go to the measurement that comes first.
///
/// # Errors
/// Returns [`PextError::NoCandidates`] for an empty slice, and
/// [`PextError::InconsistentBackends`] for the first measurement whose checksum differs.
pub fn select_fastest(measurements: &[Measurement]) -> Result<ExtractMode> {
    let (first, rest) = measurements.split_first().ok_or(PextError::NoCandidates)?;

    let mut best = first;
    for m in rest {
        if m.checksum != first.checksum {
            return Err(PextError::InconsistentBackends {
                mode: m.mode,
                expected: first.checksum,
                actual: m.checksum,
            });
        }
        if m.elapsed < best.elapsed {
            best = m;
        }
    }
    Ok(best.mode)
}
