//! Architecture-specific bit manipulation
//!
//! This module contains the platform-specific building blocks of the extraction backends.
//! x86_64 provides hardware `PEXT` (BMI2) and carry-less multiplication (PCLMULQDQ), all other
//! architectures use the portable fallbacks in [`generic`].

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

/// Generic fallback implementations for unsupported architectures
pub mod generic;

/// Trait for architecture-specific bit manipulation operations
pub trait BitOps {
    /// Count the number of set bits (population count)
    fn popcount_u64(value: u64) -> u32;

    /// Inclusive prefix parity: bit `i` of the result is the XOR of bits `0..=i` of `value`.
    /// This is the carry-less product of `value` with an all-ones word.
    fn prefix_xor_u64(value: u64) -> u64;

    /// Parallel bit extract. Uses the hardware instruction if it is enabled at compile time,
    /// and a software loop otherwise.
    fn pext_u64(value: u64, mask: u64) -> u64;
}

/// Select the appropriate implementation based on the target architecture
#[cfg(target_arch = "x86_64")]
/// Architecture-specific bit operations implementation.
pub type ArchBitOps = x86_64::X86BitOps;

#[cfg(not(target_arch = "x86_64"))]
/// Architecture-specific bit operations implementation.
pub type ArchBitOps = generic::GenericBitOps;

/// Returns true if hardware `PEXT` can be executed on this machine, either because BMI2 is
/// enabled at compile time, or because the running CPU reports it.
#[inline]
pub fn has_hardware_pext() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        x86_64::has_bmi2()
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// Hardware `PEXT`, or `None` if the instruction is not available on this machine.
#[inline]
pub fn pext_hardware(value: u64, mask: u64) -> Option<u64> {
    #[cfg(target_arch = "x86_64")]
    {
        if x86_64::has_bmi2() {
            // SAFETY: BMI2 support was checked above
            Some(unsafe { x86_64::pext_bmi2(value, mask) })
        } else {
            None
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        let _ = (value, mask);
        None
    }
}

/// Hardware `PEXT` without availability check.
///
/// # Safety
/// The caller must have verified [`has_hardware_pext`] before. On other architectures this
/// function is never callable.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) unsafe fn pext_hardware_unchecked(value: u64, mask: u64) -> u64 {
    x86_64::pext_bmi2(value, mask)
}
