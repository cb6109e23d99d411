//! Parallel bits extract backends.
//!
//! Every function in this module implements the same contract as the `PEXT` instruction of
//! x86 BMI2: the bits of `value` at the positions of the set bits of `mask` are packed into the
//! low order bits of the result, in ascending order. All other bits of the result are zero.
//! The backends differ only in speed, which depends on the mask and the machine:
//!
//! - [`pext_bitloop`] and [`pext_split32`] iterate over the set bits of the mask,
//! - [`pext_byte_table`] looks up each byte of the mask in a precomputed table,
//! - [`pext_block_table`] and its unrolled variants apply a [`BlockTable`] that has to be
//!   computed once per mask with [`preprocess_mask`],
//! - [`pext_clmul`] runs a fixed number of steps using carry-less multiplication,
//! - [`pext_hardware`] uses the instruction itself, if available.
//!
//! To pick the fastest one for a fixed mask automatically, see [`AdaptivePext`].
//!
//! [`AdaptivePext`]: crate::AdaptivePext

// bit manipulation generally doesn't care about sign, so the caller is aware of the consequences
#![allow(clippy::cast_possible_truncation)]

use crate::arch::{ArchBitOps, BitOps};

pub mod block_table;
pub mod byte_table;
pub mod clmul;

pub use crate::arch::{has_hardware_pext, pext_hardware};
pub use block_table::{
    count_runs, pext_block_table, pext_block_table_unrolled2, pext_block_table_unrolled4,
    pext_block_table_unrolled8, preprocess_mask, BlockEntry, BlockTable, MAX_RUNS,
};
pub use byte_table::pext_byte_table;
pub use clmul::{pext_clmul, pext_clmul_u32};

/// Parallel bits extract
pub trait Pext {
    /// Parallel bits extract.
    ///
    /// Extract bits from `self` at the positions specified by `mask` to
    /// contiguous low order bits of the result.
    ///
    /// Uses the `PEXT` instruction if BMI2 is enabled at compile time, and [`pext_bitloop`]
    /// otherwise.
    fn pext(self, mask: Self) -> Self;
}

impl Pext for u64 {
    #[inline(always)]
    fn pext(self, mask: Self) -> Self {
        ArchBitOps::pext_u64(self, mask)
    }
}

// Implement for other unsigned integer types by widening
macro_rules! impl_pext {
    ($($t:ty),*) => {
        $(
            impl Pext for $t {
                #[inline(always)]
                fn pext(self, mask: Self) -> Self {
                    (self as u64).pext(mask as u64) as Self
                }
            }
        )*
    };
}

impl_pext!(u8, u16, u32);

/// Parallel bits extract by looping over the set bits of the mask.
///
/// Each iteration isolates the lowest remaining bit of the mask and appends the corresponding
/// bit of `value` to the result. This takes `popcount(mask)` iterations of cheap operations and
/// serves as the reference for all other backends.
#[inline]
#[must_use]
pub fn pext_bitloop(value: u64, mut mask: u64) -> u64 {
    let mut out = 0u64;
    let mut out_bit = 1u64;

    while mask != 0 {
        let lsb = mask & mask.wrapping_neg();
        if value & lsb != 0 {
            out |= out_bit;
        }
        mask ^= lsb;
        out_bit <<= 1;
    }
    out
}

#[inline(always)]
fn pext_bitloop_u32(value: u32, mut mask: u32) -> u32 {
    let mut out = 0u32;
    let mut out_bit = 1u32;

    while mask != 0 {
        let lsb = mask & mask.wrapping_neg();
        if value & lsb != 0 {
            out |= out_bit;
        }
        mask ^= lsb;
        out_bit <<= 1;
    }
    out
}

/// Parallel bits extract on the two 32-bit halves separately.
///
/// The high half is extracted independently and shifted by the number of bits the low half
/// contributes. Depending on the compiler this generates slightly better code than
/// [`pext_bitloop`].
#[inline]
#[must_use]
pub fn pext_split32(value: u64, mask: u64) -> u64 {
    let low_mask = mask as u32;
    let high_mask = (mask >> 32) as u32;

    let low = pext_bitloop_u32(value as u32, low_mask);
    let high = pext_bitloop_u32((value >> 32) as u32, high_mask);

    // the low half determines the offset of the high half
    let shift = ArchBitOps::popcount_u64(low_mask as u64);
    low as u64 | (high as u64) << shift
}
