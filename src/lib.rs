#![warn(missing_docs)]

//! This crate provides portable implementations of the parallel bits extract operation (`PEXT`
//! from the x86 BMI2 instruction set) on 64-bit words, and a selector that benchmarks all of
//! them once for a fixed mask and keeps the fastest.
//!
//! Parallel bits extract packs the bits of a value at the positions selected by a mask into the
//! low order bits of the result:
//! ```rust
//! use vers_pext::pext_bitloop;
//!
//! assert_eq!(pext_bitloop(0b1101, 0b1010), 0b10);
//! ```
//!
//! # Backends
//!  - [Hardware][pext_hardware] `PEXT`, if the running CPU supports BMI2.
//!  - A [bit loop][pext_bitloop] over the set bits of the mask, and the same
//!    [on two halves][pext_split32] of the word.
//!  - A [byte-wise lookup table][pext_byte_table] shared by the whole process.
//!  - A [block table][pext_block_table] of the runs of set bits of the mask, computed once per
//!    mask with [`preprocess_mask`], plus variants unrolled by two, four and eight.
//!  - An [emulation][pext_clmul] in a fixed number of steps using carry-less multiplication.
//!
//! # Adaptive selection
//! Hardware `PEXT` is fast on Intel CPUs since Haswell and AMD CPUs since Zen 3, but microcoded
//! with a latency proportional to the popcount of the mask on earlier AMD CPUs. Which software
//! backend wins depends on the number of runs in the mask. [`AdaptivePext`] measures all
//! candidates on the machine it runs on, checks that they agree, and binds the fastest. A
//! [`Tuner`] configures the measurement.
//!
//! # Spaced seeds
//! The [`spaced`] module converts spaced seed patterns over 2-bit encoded nucleotides into masks
//! and extracts their care positions.
//!
//! # Intrinsics
//! On x86_64, hardware `PEXT` is detected at run time unless the `bmi2` target feature is enabled
//! at compile time, in which case the [`Pext`] trait also uses it directly. The carry-less
//! multiplication backend uses `PCLMULQDQ` if the `pclmulqdq` target feature is enabled at compile
//! time. All other architectures use portable fallbacks.
//!
//! # Safety
//! This crate uses no unsafe code, with the only exception being compiler intrinsics for
//! bit-manipulation, which are only executed after their availability has been verified.

pub use crate::adaptive::{select_fastest, AdaptivePext, ExtractMode, Measurement, Tuner};
pub use crate::error::{PextError, Result};
pub use crate::extract::{
    count_runs, has_hardware_pext, pext_bitloop, pext_block_table, pext_block_table_unrolled2,
    pext_block_table_unrolled4, pext_block_table_unrolled8, pext_byte_table, pext_clmul,
    pext_clmul_u32, pext_hardware, pext_split32, preprocess_mask, BlockEntry, BlockTable, Pext,
};
pub use crate::util::SplitMix64;

pub mod adaptive;
pub mod arch;
pub mod extract;
pub mod spaced;

mod error;
pub(crate) mod util;

#[cfg(test)]
mod test_util;
