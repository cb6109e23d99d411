//! Run decomposition of a mask, and the block table backends using it.
//!
//! A mask is split into its maximal runs of consecutive set bits. Each run is extracted with a
//! single mask-and and right shift, so the number of loop iterations is the number of runs
//! instead of the number of set bits. A 64-bit word has at most 32 runs.

use crate::error::{PextError, Result};
use crate::util::unroll;

/// Maximum number of runs of set bits in a 64-bit word.
pub const MAX_RUNS: usize = 32;

/// A single run of consecutive set bits of a mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockEntry {
    /// The bits of the run, at their original position in the mask.
    pub run_mask: u64,
    /// Right shift that moves the run to its position in the packed output.
    pub shift: u32,
}

impl BlockEntry {
    #[inline(always)]
    fn apply(self, value: u64) -> u64 {
        (value & self.run_mask) >> self.shift
    }
}

/// The run decomposition of a mask, ordered from the least significant run upwards.
///
/// Applying all entries in order and combining their results with bitwise or is a parallel bits
/// extract with the original mask. The table is a plain value of fixed size, so it is cheap to
/// copy and never allocates. Unused entries are zero.
///
/// With the `serde` feature, deserialization only accepts tables that are exactly the run
/// decomposition of the mask their entries combine to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBlockTable"))]
pub struct BlockTable {
    entries: [BlockEntry; MAX_RUNS],
    len: u8,
}

/// Unchecked wire form of [`BlockTable`].
#[cfg(feature = "serde")]
#[derive(Clone, Copy, serde::Deserialize)]
struct RawBlockTable {
    entries: [BlockEntry; MAX_RUNS],
    len: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBlockTable> for BlockTable {
    type Error = PextError;

    fn try_from(raw: RawBlockTable) -> Result<Self> {
        if raw.len as usize > MAX_RUNS {
            return Err(PextError::TooManyRuns {
                mask: raw.entries.iter().fold(0, |mask, e| mask | e.run_mask),
                runs: raw.len as usize,
            });
        }

        let mask = raw.entries[..raw.len as usize]
            .iter()
            .fold(0, |mask, e| mask | e.run_mask);
        let table = Self::try_from_mask(mask)?;
        // rejects overlapping or split runs, wrong shifts and stray unused entries
        if table.entries != raw.entries || table.len != raw.len {
            return Err(PextError::InconsistentBlockTable { mask });
        }
        Ok(table)
    }
}

impl Default for BlockTable {
    /// The table of the empty mask.
    fn default() -> Self {
        Self {
            entries: [BlockEntry::default(); MAX_RUNS],
            len: 0,
        }
    }
}

impl BlockTable {
    /// Decompose `mask` into its runs. Equivalent to [`preprocess_mask`].
    ///
    /// # Panics
    /// Panics if the decomposition is inconsistent, which can only happen because of a bug in
    /// this crate. See [`try_from_mask`](Self::try_from_mask).
    #[must_use]
    pub fn new(mask: u64) -> Self {
        match Self::try_from_mask(mask) {
            Ok(table) => table,
            Err(e) => panic!("{e}"),
        }
    }

    /// Decompose `mask` into its runs.
    ///
    /// The mask is scanned from the least significant bit upwards. For each maximal run of set
    /// bits starting at bit `start`, an entry with the run bits and a shift of `start` minus the
    /// number of output bits of all lower runs is recorded.
    ///
    /// # Errors
    /// Returns [`PextError::TooManyRuns`] if more than [`MAX_RUNS`] runs are found, or
    /// [`PextError::WidthMismatch`] if the runs do not pack exactly `popcount(mask)` bits.
    /// Neither is possible for a 64-bit mask, both indicate a logic defect.
    pub fn try_from_mask(mask: u64) -> Result<Self> {
        let mut table = Self::default();
        let mut out_pos = 0u32;
        let mut rest = mask;

        while rest != 0 {
            let start = rest.trailing_zeros();
            let len = (rest >> start).trailing_ones();
            let run_mask = if len == u64::BITS {
                u64::MAX
            } else {
                ((1u64 << len) - 1) << start
            };

            if table.len as usize == MAX_RUNS {
                return Err(PextError::TooManyRuns {
                    mask,
                    runs: count_runs(mask) as usize,
                });
            }

            // lower runs occupy at most all bits below `start`
            debug_assert!(start >= out_pos);
            table.entries[table.len as usize] = BlockEntry {
                run_mask,
                shift: start - out_pos,
            };
            table.len += 1;

            out_pos += len;
            rest &= !run_mask;
        }

        if out_pos != mask.count_ones() {
            return Err(PextError::WidthMismatch {
                mask,
                width: out_pos,
                popcount: mask.count_ones(),
            });
        }

        Ok(table)
    }

    /// The entries of the table, one per run, ordered from the least significant run.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries[..self.len as usize]
    }

    /// Number of runs in the table.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the table belongs to the empty mask.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mask this table was computed from.
    #[must_use]
    pub fn mask(&self) -> u64 {
        self.entries().iter().fold(0, |mask, e| mask | e.run_mask)
    }

    /// Number of bits the table extracts, which is the popcount of its mask.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.entries().iter().map(|e| e.run_mask.count_ones()).sum()
    }
}

impl<'a> IntoIterator for &'a BlockTable {
    type Item = &'a BlockEntry;
    type IntoIter = std::slice::Iter<'a, BlockEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries().iter()
    }
}

/// Decompose `mask` into its runs of consecutive set bits, for use with [`pext_block_table`]
/// and its unrolled variants. This needs to be done once per mask.
///
/// # Panics
/// See [`BlockTable::new`].
#[must_use]
pub fn preprocess_mask(mask: u64) -> BlockTable {
    BlockTable::new(mask)
}

/// Number of maximal runs of consecutive set bits in `mask`.
#[inline]
#[must_use]
pub fn count_runs(mask: u64) -> u32 {
    // a run starts at every set bit whose lower neighbour is unset
    (mask & !(mask << 1)).count_ones()
}

/// Parallel bits extract using the run decomposition of the mask.
///
/// This needs one iteration per run of the mask instead of one per set bit, so it is fast for
/// masks with few long runs, as produced by spaced seeds over 2-bit encoded nucleotides.
#[inline]
#[must_use]
pub fn pext_block_table(value: u64, table: &BlockTable) -> u64 {
    let mut out = 0u64;
    for entry in table.entries() {
        out |= entry.apply(value);
    }
    out
}

macro_rules! gen_unrolled {
    ($name:ident, $factor:tt) => {
        #[doc = concat!(
            "Same as [`pext_block_table`], but processes ", stringify!($factor),
            " runs per loop iteration. Remaining runs are processed one at a time."
        )]
        #[inline]
        #[must_use]
        pub fn $name(value: u64, table: &BlockTable) -> u64 {
            let mut out = 0u64;
            let mut chunks = table.entries().chunks_exact($factor);
            for chunk in &mut chunks {
                unroll!($factor, |i| out |= chunk[i].apply(value), 0);
            }
            for entry in chunks.remainder() {
                out |= entry.apply(value);
            }
            out
        }
    };
}

gen_unrolled!(pext_block_table_unrolled2, 2);
gen_unrolled!(pext_block_table_unrolled4, 4);
gen_unrolled!(pext_block_table_unrolled8, 8);
