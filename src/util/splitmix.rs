//! Fixed-increment SplitMix64 pseudo random number generator.

/// Fast deterministic pseudo random generator via the SplitMix64 algorithm.
///
/// This generator is not suitable for cryptographic purposes. It is used to generate benchmark
/// inputs for tuning, where speed and reproducibility matter and statistical quality only needs to
/// be good enough to defeat branch prediction.
///
/// See Steele, Lea and Flood, "Fast splittable pseudorandom number generators", OOPSLA 2014.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

    /// Create a generator from a seed. Equal seeds produce equal sequences.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next 64 bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(Self::GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl Iterator for SplitMix64 {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::SplitMix64;

    #[test]
    fn test_reference_sequence() {
        // first outputs for seed 1234567, as published with the reference implementation
        let mut rng = SplitMix64::new(1234567);
        assert_eq!(rng.next_u64(), 6457827717110365317);
        assert_eq!(rng.next_u64(), 3203168211198807973);
        assert_eq!(rng.next_u64(), 9817491932198370423);
    }

    #[test]
    fn test_deterministic() {
        let a: Vec<u64> = SplitMix64::new(42).take(16).collect();
        let b: Vec<u64> = SplitMix64::new(42).take(16).collect();
        let c: Vec<u64> = SplitMix64::new(43).take(16).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
