//! Self-tuning parallel bits extract for a fixed mask.
//!
//! Which backend is fastest depends on the mask and on the machine: hardware `PEXT` is fast on
//! Intel and on AMD since Zen 3, but microcoded and slow on earlier AMD processors, and the
//! software backends trade table lookups against loop iterations over the runs of the mask.
//! [`AdaptivePext`] runs a small benchmark once when it is constructed and keeps the fastest
//! backend for all later calls.
//!
//! This only pays off if the mask is fixed, as it is for a spaced seed. For changing masks, call
//! a backend from [`extract`](crate::extract) directly.

use std::fmt;
use std::str::FromStr;

use crate::error::{PextError, Result};
use crate::extract::{
    pext_block_table, pext_block_table_unrolled2, pext_block_table_unrolled4,
    pext_block_table_unrolled8, pext_byte_table, BlockTable,
};

mod tuner;

pub use tuner::{select_fastest, Measurement, Tuner, DEFAULT_BATCH_SIZE};

/// The backend used by an [`AdaptivePext`] instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ExtractMode {
    /// Benchmark all available backends during construction and use the fastest.
    /// An instance never reports this mode after construction, except when it is unbound.
    #[default]
    Automatic = 0,
    /// Hardware `PEXT` instruction.
    Hardware = 1,
    /// [`pext_byte_table`].
    ByteTable = 2,
    /// [`pext_block_table`].
    BlockTable = 3,
    /// [`pext_block_table_unrolled2`].
    BlockTableUnrolled2 = 4,
    /// [`pext_block_table_unrolled4`].
    BlockTableUnrolled4 = 5,
    /// [`pext_block_table_unrolled8`].
    BlockTableUnrolled8 = 6,
}

impl ExtractMode {
    /// All modes, in enumeration order.
    pub const ALL: [ExtractMode; 7] = [
        ExtractMode::Automatic,
        ExtractMode::Hardware,
        ExtractMode::ByteTable,
        ExtractMode::BlockTable,
        ExtractMode::BlockTableUnrolled2,
        ExtractMode::BlockTableUnrolled4,
        ExtractMode::BlockTableUnrolled8,
    ];

    /// The printable name of the mode.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ExtractMode::Automatic => "Automatic",
            ExtractMode::Hardware => "Pext",
            ExtractMode::ByteTable => "ByteTable",
            ExtractMode::BlockTable => "BlockTable",
            ExtractMode::BlockTableUnrolled2 => "BlockTableUnrolled2",
            ExtractMode::BlockTableUnrolled4 => "BlockTableUnrolled4",
            ExtractMode::BlockTableUnrolled8 => "BlockTableUnrolled8",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExtractMode {
    type Err = PextError;

    /// Parse a mode from its [name](ExtractMode::name), ignoring ASCII case.
    /// `"Hardware"` is accepted as an alias of `"Pext"`.
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("hardware") {
            return Ok(ExtractMode::Hardware);
        }
        ExtractMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PextError::UnknownModeName(s.to_owned()))
    }
}

impl TryFrom<u8> for ExtractMode {
    type Error = PextError;

    fn try_from(value: u8) -> Result<Self> {
        ExtractMode::ALL
            .get(value as usize)
            .copied()
            .ok_or(PextError::InvalidMode(value))
    }
}

impl From<ExtractMode> for u8 {
    fn from(mode: ExtractMode) -> Self {
        mode as u8
    }
}

/// Extraction function bound at construction, so calls never branch on the mode.
type ExtractFn = fn(&AdaptivePext, u64) -> u64;

/// Whether an instance can be invoked. Only checked by [`AdaptivePext::try_invoke`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Binding {
    Ready,
    Unbound,
    HardwareUnavailable,
}

/// Parallel bits extract with a fixed mask, using the fastest backend for that mask.
///
/// On construction with [`ExtractMode::Automatic`], all available backends are benchmarked on
/// pseudo-random input (see [`Tuner`]), their results are cross-checked, and the fastest backend
/// is bound. Afterwards, [`invoke`](Self::invoke) calls it through a function pointer without any
/// further dispatch. A specific backend can be forced with [`with_mode`](Self::with_mode).
///
/// Construction takes a few milliseconds when tuning. The instance itself is small plain data:
/// it can be copied freely and shared between threads.
///
/// # Example
/// ```rust
/// use vers_pext::{AdaptivePext, ExtractMode};
///
/// let pext = AdaptivePext::new(0b1010);
/// assert_ne!(pext.mode(), ExtractMode::Automatic);
/// assert_eq!(pext.invoke(0b1101), 0b10);
///
/// let forced = AdaptivePext::with_mode(0b1010, ExtractMode::BlockTable);
/// assert_eq!(forced.mode_name(), "BlockTable");
/// assert_eq!(forced.invoke(0b1101), 0b10);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AdaptivePext {
    mode: ExtractMode,
    func: ExtractFn,
    binding: Binding,
    mask: u64,
    block_table: BlockTable,
}

impl Default for AdaptivePext {
    /// An unbound instance. Invoking it panics, see [`AdaptivePext::invoke`].
    fn default() -> Self {
        Self {
            mode: ExtractMode::Automatic,
            func: Self::extract_unbound,
            binding: Binding::Unbound,
            mask: 0,
            block_table: BlockTable::default(),
        }
    }
}

impl AdaptivePext {
    /// Construct an instance for `mask`, tuned to the fastest backend with a default [`Tuner`].
    ///
    /// # Panics
    /// Panics if the backends disagree during tuning, which indicates a bug in this crate.
    #[must_use]
    pub fn new(mask: u64) -> Self {
        Self::with_mode(mask, ExtractMode::Automatic)
    }

    /// Construct an instance for `mask` that uses the backend of `mode`, or tunes if `mode` is
    /// [`ExtractMode::Automatic`].
    ///
    /// Forcing [`ExtractMode::Hardware`] on a machine without BMI2 succeeds, but every call to
    /// [`invoke`](Self::invoke) will panic.
    ///
    /// # Panics
    /// Panics if the backends disagree during tuning, which indicates a bug in this crate.
    #[must_use]
    pub fn with_mode(mask: u64, mode: ExtractMode) -> Self {
        match Self::try_with_mode(mask, mode) {
            Ok(pext) => pext,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible version of [`with_mode`](Self::with_mode).
    ///
    /// # Errors
    /// Returns [`PextError::InconsistentBackends`] if tuning finds that two backends disagree.
    pub fn try_with_mode(mask: u64, mode: ExtractMode) -> Result<Self> {
        match mode {
            ExtractMode::Automatic => Self::with_tuner(mask, &Tuner::default()),
            mode => Self::bind(mask, mode, Self::table_for(mask, mode)),
        }
    }

    /// Construct an instance for `mask`, tuned with the given [`Tuner`].
    ///
    /// # Errors
    /// Returns [`PextError::InconsistentBackends`] if two backends disagree.
    pub fn with_tuner(mask: u64, tuner: &Tuner) -> Result<Self> {
        let block_table = BlockTable::try_from_mask(mask)?;
        let mode = tuner.tune(mask, &block_table)?;
        Self::bind(mask, mode, block_table)
    }

    fn table_for(mask: u64, mode: ExtractMode) -> BlockTable {
        // hardware pext has no use for the block table
        if mode == ExtractMode::Hardware {
            BlockTable::default()
        } else {
            BlockTable::new(mask)
        }
    }

    /// Bind a concrete backend.
    pub(crate) fn bind(mask: u64, mode: ExtractMode, block_table: BlockTable) -> Result<Self> {
        let (func, binding): (ExtractFn, Binding) = match mode {
            ExtractMode::Automatic => return Err(PextError::AutomaticNotBindable),
            ExtractMode::Hardware => Self::hardware_binding(),
            ExtractMode::ByteTable => (Self::extract_byte_table, Binding::Ready),
            ExtractMode::BlockTable => (Self::extract_block_table, Binding::Ready),
            ExtractMode::BlockTableUnrolled2 => {
                (Self::extract_block_table_unrolled2, Binding::Ready)
            }
            ExtractMode::BlockTableUnrolled4 => {
                (Self::extract_block_table_unrolled4, Binding::Ready)
            }
            ExtractMode::BlockTableUnrolled8 => {
                (Self::extract_block_table_unrolled8, Binding::Ready)
            }
        };

        Ok(Self {
            mode,
            func,
            binding,
            mask,
            block_table,
        })
    }

    #[cfg(target_arch = "x86_64")]
    fn hardware_binding() -> (ExtractFn, Binding) {
        if crate::arch::has_hardware_pext() {
            (Self::extract_hardware, Binding::Ready)
        } else {
            (Self::extract_hardware_unavailable, Binding::HardwareUnavailable)
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn hardware_binding() -> (ExtractFn, Binding) {
        (Self::extract_hardware_unavailable, Binding::HardwareUnavailable)
    }

    /// Parallel bits extract of `value` with the mask of this instance.
    ///
    /// # Panics
    /// Panics if the instance is [default constructed](Self::default), or if it was forced to
    /// [`ExtractMode::Hardware`] on a machine without BMI2. Use [`try_invoke`](Self::try_invoke)
    /// to handle these cases.
    #[inline]
    #[must_use]
    pub fn invoke(&self, value: u64) -> u64 {
        (self.func)(self, value)
    }

    /// Like [`invoke`](Self::invoke), but reports an unusable instance as an error.
    ///
    /// # Errors
    /// Returns [`PextError::UnboundInstance`] for default constructed instances, and
    /// [`PextError::HardwareUnavailable`] if hardware mode was forced without BMI2 support.
    #[inline]
    pub fn try_invoke(&self, value: u64) -> Result<u64> {
        match self.binding {
            Binding::Ready => Ok((self.func)(self, value)),
            Binding::Unbound => Err(PextError::UnboundInstance),
            Binding::HardwareUnavailable => Err(PextError::HardwareUnavailable),
        }
    }

    /// Whether [`invoke`](Self::invoke) can be called without panicking.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.binding == Binding::Ready
    }

    /// The mode used by this instance. After tuning, this is the mode that won.
    #[must_use]
    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    /// The mode used by this instance as a printable string.
    #[must_use]
    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    /// The mask of this instance.
    #[must_use]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// The block table of the mask. It is empty if the instance was forced to hardware mode.
    #[must_use]
    pub fn block_table(&self) -> &BlockTable {
        &self.block_table
    }

    #[cfg(target_arch = "x86_64")]
    fn extract_hardware(&self, value: u64) -> u64 {
        // SAFETY: only bound after BMI2 support was verified
        unsafe { crate::arch::pext_hardware_unchecked(value, self.mask) }
    }

    fn extract_hardware_unavailable(&self, _value: u64) -> u64 {
        panic!("{}", PextError::HardwareUnavailable)
    }

    fn extract_unbound(&self, _value: u64) -> u64 {
        panic!("{}", PextError::UnboundInstance)
    }

    fn extract_byte_table(&self, value: u64) -> u64 {
        pext_byte_table(value, self.mask)
    }

    fn extract_block_table(&self, value: u64) -> u64 {
        pext_block_table(value, &self.block_table)
    }

    fn extract_block_table_unrolled2(&self, value: u64) -> u64 {
        pext_block_table_unrolled2(value, &self.block_table)
    }

    fn extract_block_table_unrolled4(&self, value: u64) -> u64 {
        pext_block_table_unrolled4(value, &self.block_table)
    }

    fn extract_block_table_unrolled8(&self, value: u64) -> u64 {
        pext_block_table_unrolled8(value, &self.block_table)
    }
}

#[cfg(test)]
mod tests;
