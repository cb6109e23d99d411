//! Parallel bits extract emulation via carry-less multiplication.
//!
//! The general case is the parallel prefix popcount method of Zach Wegner's zp7: the distance
//! each selected bit has to move to the right is the number of unset mask bits below it. That
//! distance is computed one binary digit at a time as a prefix parity, which is a carry-less
//! multiplication by an all-ones word, and the bits are moved by 1, 2, 4, ... positions in six
//! fixed steps. Sparse masks are extracted directly, peeling the lowest and highest remaining bit
//! per step.

use crate::arch::{ArchBitOps, BitOps};

/// Parallel bits extract in a fixed number of steps, independent of the popcount of the mask.
///
/// Masks with up to seven set bits are handled directly. Uses the `PCLMULQDQ` instruction if it
/// is enabled at compile time, and a shift-xor ladder otherwise.
#[inline]
#[must_use]
pub fn pext_clmul(value: u64, mask: u64) -> u64 {
    match mask.count_ones() {
        0 => 0,
        1 => (value & mask != 0) as u64,
        pc @ 2..=7 => pext_sparse_u64(value, mask, pc),
        _ => pext_prefix_parity_u64(value, mask),
    }
}

/// 32-bit variant of [`pext_clmul`]. Masks with up to four set bits are handled directly.
#[inline]
#[must_use]
pub fn pext_clmul_u32(value: u32, mask: u32) -> u32 {
    match mask.count_ones() {
        0 => 0,
        1 => (value & mask != 0) as u32,
        pc @ 2..=4 => pext_sparse_u64(value as u64, mask as u64, pc) as u32,
        _ => pext_prefix_parity_u32(value, mask),
    }
}

#[inline(always)]
fn bit_at(value: u64, pos: u32) -> u64 {
    (value >> pos) & 1
}

/// Extract `pc` bits by taking the lowest and the highest remaining bit of the mask in each step.
#[inline(always)]
fn pext_sparse_u64(value: u64, mut mask: u64, pc: u32) -> u64 {
    let mut out = 0u64;
    for i in 0..pc / 2 {
        let low = mask.trailing_zeros();
        let high = u64::BITS - 1 - mask.leading_zeros();
        out |= bit_at(value, low) << i;
        out |= bit_at(value, high) << (pc - 1 - i);
        mask &= !(1 << low | 1 << high);
    }
    if pc & 1 == 1 {
        out |= bit_at(value, mask.trailing_zeros()) << (pc / 2);
    }
    out
}

fn pext_prefix_parity_u64(value: u64, mask: u64) -> u64 {
    let mut zeros = !mask;
    let mut packed = value & mask;

    for step in 0..5 {
        // bit i is set if the number of unset mask bits below i has bit `step` set
        let shift_bits = ArchBitOps::prefix_xor_u64(zeros << 1);
        packed = (packed & !shift_bits) | ((packed & shift_bits) >> (1 << step));
        zeros &= shift_bits;
    }

    // the last digit is a plain prefix sum, since only one bit can remain per position
    let shift_bits = zeros.wrapping_neg() << 1;
    (packed & !shift_bits) | ((packed & shift_bits) >> 32)
}

fn pext_prefix_parity_u32(value: u32, mask: u32) -> u32 {
    let mut zeros = !mask;
    let mut packed = value & mask;

    for step in 0..4 {
        let shift_bits = ArchBitOps::prefix_xor_u64((zeros as u64) << 1) as u32;
        packed = (packed & !shift_bits) | ((packed & shift_bits) >> (1 << step));
        zeros &= shift_bits;
    }

    let shift_bits = zeros.wrapping_neg() << 1;
    (packed & !shift_bits) | ((packed & shift_bits) >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::pext_bitloop;

    #[test]
    fn test_sparse_cases() {
        let value = 0xA5A5_5A5A_F00F_1234;
        for pc in 1..=7u32 {
            // spread the bits over the whole word
            let mask = (0..pc).fold(0u64, |m, i| m | 1 << (i * 9 + 1));
            assert_eq!(mask.count_ones(), pc);
            assert_eq!(pext_clmul(value, mask), pext_bitloop(value, mask), "pc = {pc}");
        }
    }

    #[test]
    fn test_dense_cases() {
        let value = 0x0123_4567_89AB_CDEF;
        assert_eq!(pext_clmul(value, u64::MAX), value);
        assert_eq!(pext_clmul(value, 0xFF), 0xEF);
        assert_eq!(pext_clmul(value, 0xFF00_0000_0000_0000), 0x01);
        assert_eq!(pext_clmul(!0, 0xAAAA_AAAA_AAAA_AAAA), 0xFFFF_FFFF);
        assert_eq!(pext_clmul(0x5555_5555_5555_5555, 0x5555_5555_5555_5555), 0xFFFF_FFFF);
        assert_eq!(pext_clmul(0x5555_5555_5555_5555, 0xAAAA_AAAA_AAAA_AAAA), 0);
    }

    #[test]
    fn test_u32_matches_u64() {
        let value = 0x89AB_CDEFu32;
        for mask in [0u32, 1, 0b1010, 0xFF, 0xF0F0_F0F0, u32::MAX, 0x8000_0001, 0x1357_9BDF] {
            assert_eq!(
                pext_clmul_u32(value, mask) as u64,
                pext_bitloop(value as u64, mask as u64),
                "mask = {mask:#x}"
            );
        }
    }

    #[test]
    fn test_exhaustive_u8() {
        for mask in 0..=255u32 {
            for value in 0..=255u32 {
                let expected = pext_bitloop(value as u64, mask as u64);
                assert_eq!(pext_clmul_u32(value, mask) as u64, expected);
                // same bits, moved into the high part of the word
                assert_eq!(pext_clmul((value as u64) << 56, (mask as u64) << 56), expected);
                assert_eq!(pext_clmul((value as u64) << 28, (mask as u64) << 28), expected);
            }
        }
    }
}
