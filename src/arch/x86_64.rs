//! x86_64 optimized implementations
//!
//! Hardware `PEXT` from BMI2 and carry-less multiplication from PCLMULQDQ. BMI2 is detected at
//! run time unless it is enabled at compile time, PCLMULQDQ is only used when enabled at compile
//! time, because the prefix parity sits in the innermost loop of the emulation backend.

use super::BitOps;

#[cfg(all(target_feature = "pclmulqdq", target_feature = "sse2"))]
use std::arch::x86_64::{
    _mm_clmulepi64_si128, _mm_cvtsi128_si64, _mm_cvtsi64_si128, _mm_set1_epi64x,
};

/// x86_64-optimized bit manipulation operations
pub struct X86BitOps;

impl BitOps for X86BitOps {
    #[inline(always)]
    fn popcount_u64(value: u64) -> u32 {
        // Use native popcnt instruction when available
        value.count_ones()
    }

    #[inline(always)]
    fn prefix_xor_u64(value: u64) -> u64 {
        #[cfg(all(target_feature = "pclmulqdq", target_feature = "sse2"))]
        unsafe {
            let product = _mm_clmulepi64_si128(
                _mm_cvtsi64_si128(value as i64),
                _mm_set1_epi64x(-1),
                0,
            );
            _mm_cvtsi128_si64(product) as u64
        }

        #[cfg(not(all(target_feature = "pclmulqdq", target_feature = "sse2")))]
        {
            super::generic::GenericBitOps::prefix_xor_u64(value)
        }
    }

    #[inline(always)]
    fn pext_u64(value: u64, mask: u64) -> u64 {
        #[cfg(target_feature = "bmi2")]
        unsafe {
            std::arch::x86_64::_pext_u64(value, mask)
        }

        #[cfg(not(target_feature = "bmi2"))]
        {
            // Fallback to generic implementation
            super::generic::GenericBitOps::pext_u64(value, mask)
        }
    }
}

/// Check if BMI2 is available, at compile time or at run time. The run time check is cached by
/// the standard library.
#[inline]
pub fn has_bmi2() -> bool {
    cfg!(target_feature = "bmi2") || std::arch::is_x86_feature_detected!("bmi2")
}

/// Parallel bit extract using the `PEXT` instruction.
///
/// # Safety
/// Requires BMI2 support. Caller must check [`has_bmi2`].
#[inline]
#[target_feature(enable = "bmi2")]
pub unsafe fn pext_bmi2(value: u64, mask: u64) -> u64 {
    std::arch::x86_64::_pext_u64(value, mask)
}
