//! Generic fallback implementations for unsupported architectures

use super::BitOps;

/// Generic bit manipulation operations
pub struct GenericBitOps;

impl BitOps for GenericBitOps {
    #[inline(always)]
    fn popcount_u64(value: u64) -> u32 {
        value.count_ones()
    }

    #[inline(always)]
    fn prefix_xor_u64(mut value: u64) -> u64 {
        // carry-less multiplication by !0, as a logarithmic shift-xor ladder
        value ^= value << 1;
        value ^= value << 2;
        value ^= value << 4;
        value ^= value << 8;
        value ^= value << 16;
        value ^= value << 32;
        value
    }

    #[inline(always)]
    fn pext_u64(value: u64, mask: u64) -> u64 {
        let mut result = 0u64;
        let mut bb = 1u64;
        let mut m = mask;

        while m != 0 {
            if value & m & m.wrapping_neg() != 0 {
                result |= bb;
            }
            m &= m - 1;
            bb = bb.wrapping_add(bb);
        }

        result
    }
}
