//! Spaced seeds over 2-bit encoded nucleotides.
//!
//! A spaced seed is a pattern of `1` (care) and `0` (don't care) positions over a window of `k`
//! nucleotides. With every nucleotide encoded in two bits and the first nucleotide of the window
//! in the highest pair, a window of up to 32 nucleotides fits into a `u64`, and extracting the
//! care positions is a single parallel bits extract with a fixed mask.

use crate::adaptive::{AdaptivePext, ExtractMode};
use crate::error::{PextError, Result};

/// Maximum number of nucleotides in a 64-bit word.
pub const MAX_SPAN: usize = 32;

/// Convert a spaced seed pattern into an extraction mask over 2-bit encoded nucleotides.
///
/// Each symbol becomes a pair of bits, `11` for `'1'` and `00` for `'0'`. The first symbol maps
/// to the highest pair, so the last symbol occupies the two lowest bits.
///
/// # Errors
/// Returns an error if the pattern is empty, longer than [`MAX_SPAN`], or contains a symbol other
/// than `'0'` and `'1'`.
///
/// # Example
/// ```rust
/// use vers_pext::spaced::kmer_mask;
///
/// assert_eq!(kmer_mask("1101").unwrap(), 0b11_11_00_11);
/// ```
pub fn kmer_mask(pattern: &str) -> Result<u64> {
    let span = pattern.chars().count();
    if span == 0 {
        return Err(PextError::EmptyPattern);
    }
    if span > MAX_SPAN {
        return Err(PextError::PatternTooLong(span));
    }

    pattern
        .chars()
        .enumerate()
        .try_fold(0u64, |mask, (position, symbol)| match symbol {
            '0' => Ok(mask << 2),
            '1' => Ok(mask << 2 | 0b11),
            symbol => Err(PextError::InvalidPatternSymbol { symbol, position }),
        })
}

/// Convert a mask over `k` 2-bit encoded nucleotides back into its spaced seed pattern.
///
/// # Errors
/// Returns [`PextError::InvalidKmerMask`] if a pair of bits is neither `00` nor `11`, or if bits
/// above the lowest `2 * k` are set. `k` has to be in `1..=32`.
pub fn kmer_pattern(mask: u64, k: usize) -> Result<String> {
    if k == 0 {
        return Err(PextError::EmptyPattern);
    }
    if k > MAX_SPAN {
        return Err(PextError::PatternTooLong(k));
    }
    if k < MAX_SPAN && mask >> (2 * k) != 0 {
        return Err(PextError::InvalidKmerMask { mask, k });
    }

    (0..k)
        .rev()
        .map(|i| match (mask >> (2 * i)) & 0b11 {
            0b00 => Ok('0'),
            0b11 => Ok('1'),
            _ => Err(PextError::InvalidKmerMask { mask, k }),
        })
        .collect()
}

/// A spaced seed bound to an [`AdaptivePext`] instance for its mask.
///
/// # Example
/// ```rust
/// use vers_pext::spaced::SpacedSeed;
///
/// let seed = SpacedSeed::new("1101").unwrap();
/// assert_eq!(seed.span(), 4);
/// assert_eq!(seed.weight(), 3);
///
/// // nucleotides 3, 2, 1, 0 in 2-bit encoding, the third one is skipped
/// assert_eq!(seed.extract(0b11_10_01_00), 0b11_10_00);
/// ```
#[derive(Clone, Debug)]
pub struct SpacedSeed {
    pattern: String,
    extractor: AdaptivePext,
}

impl SpacedSeed {
    /// Parse `pattern` and tune an extractor for its mask.
    ///
    /// # Errors
    /// See [`kmer_mask`].
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_mode(pattern, ExtractMode::Automatic)
    }

    /// Parse `pattern` and bind an extractor for its mask with the given mode.
    ///
    /// # Errors
    /// See [`kmer_mask`] and [`AdaptivePext::try_with_mode`].
    pub fn with_mode(pattern: &str, mode: ExtractMode) -> Result<Self> {
        let mask = kmer_mask(pattern)?;
        Ok(Self {
            pattern: pattern.to_owned(),
            extractor: AdaptivePext::try_with_mode(mask, mode)?,
        })
    }

    /// Number of nucleotides covered by the seed.
    #[must_use]
    pub fn span(&self) -> usize {
        self.pattern.len()
    }

    /// Number of care positions of the seed.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.pattern.bytes().filter(|&b| b == b'1').count()
    }

    /// The extraction mask over 2-bit encoded nucleotides.
    #[must_use]
    pub fn mask(&self) -> u64 {
        self.extractor.mask()
    }

    /// The pattern the seed was parsed from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The extractor bound to the mask of the seed.
    #[must_use]
    pub fn extractor(&self) -> &AdaptivePext {
        &self.extractor
    }

    /// Pack the nucleotides at the care positions of a 2-bit encoded k-mer word.
    ///
    /// # Panics
    /// Panics if the seed was constructed in hardware mode on a machine without BMI2.
    #[inline]
    #[must_use]
    pub fn extract(&self, kmer_word: u64) -> u64 {
        self.extractor.invoke(kmer_word)
    }
}
