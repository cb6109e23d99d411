//! Byte-wise lookup table backend.

use std::sync::OnceLock;

/// For each 8-bit mask and 8-bit value the packed result, plus the popcount of each mask byte,
/// which is the shift for the next byte.
pub(crate) struct ByteTable {
    // indexed by `mask << 8 | value`
    packed: Box<[u8]>,
    popcount: [u8; 256],
}

impl ByteTable {
    fn new() -> Self {
        let mut packed = vec![0u8; 256 * 256].into_boxed_slice();
        let mut popcount = [0u8; 256];

        for mask in 0..256usize {
            popcount[mask] = mask.count_ones() as u8;

            for value in 0..256usize {
                let mut out = 0u8;
                let mut out_bit = 1u8;
                for bit in 0..8 {
                    if mask & (1 << bit) != 0 {
                        if value & (1 << bit) != 0 {
                            out |= out_bit;
                        }
                        out_bit = out_bit.wrapping_shl(1);
                    }
                }
                packed[mask << 8 | value] = out;
            }
        }

        Self { packed, popcount }
    }

    /// The process-wide table. It is computed on first use and never modified afterwards.
    pub(crate) fn get() -> &'static ByteTable {
        static TABLE: OnceLock<ByteTable> = OnceLock::new();
        TABLE.get_or_init(ByteTable::new)
    }

    #[inline(always)]
    fn lookup(&self, value: u8, mask: u8) -> u8 {
        self.packed[(mask as usize) << 8 | value as usize]
    }
}

/// Parallel bits extract using a precomputed table for each byte of the mask.
///
/// The eight mask bytes are looked up independently and the results are concatenated at the
/// cumulative popcount of the preceding mask bytes. The 64 KiB table is shared by the whole
/// process and computed on the first call.
#[inline]
#[must_use]
pub fn pext_byte_table(value: u64, mask: u64) -> u64 {
    let table = ByteTable::get();

    let mut out = 0u64;
    let mut shift = 0u32;
    for byte in 0..8 {
        let mask_byte = (mask >> (8 * byte)) as u8;
        let value_byte = (value >> (8 * byte)) as u8;

        out |= (table.lookup(value_byte, mask_byte) as u64) << shift;
        shift += table.popcount[mask_byte as usize] as u32;
    }
    out
}
