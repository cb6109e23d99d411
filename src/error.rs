//! Error type shared by all fallible operations of this crate.

use crate::adaptive::ExtractMode;
use thiserror::Error;

/// Result alias using [`PextError`].
pub type Result<T> = std::result::Result<T, PextError>;

/// Errors reported by mask preprocessing, the adaptive selector and the spaced seed adapter.
///
/// Most of these indicate misuse of an API or a logic defect and are not meant to be recovered
/// from. They are reported as values so that callers can decide how loudly to fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PextError {
    /// An [`AdaptivePext`](crate::AdaptivePext) was used without being bound to a mask.
    #[error("invalid call on a default-constructed AdaptivePext instance")]
    UnboundInstance,

    /// Hardware PEXT was requested but the target or the running CPU lacks BMI2.
    #[error("hardware PEXT requested on a CPU or target without BMI2 support")]
    HardwareUnavailable,

    /// [`ExtractMode::Automatic`] only requests tuning, it cannot be bound as a backend.
    #[error("cannot bind the automatic mode as an extraction backend")]
    AutomaticNotBindable,

    /// A numeric mode value outside of the known modes.
    #[error("invalid extraction mode value {0}")]
    InvalidMode(u8),

    /// A mode name that does not match any known mode.
    #[error("unknown extraction mode name {0:?}")]
    UnknownModeName(String),

    /// The run decomposition of a mask found more runs than a 64-bit word can contain.
    #[error("mask {mask:#018x} decomposed into {runs} runs, at most 32 are possible")]
    TooManyRuns {
        /// The decomposed mask.
        mask: u64,
        /// Number of runs found.
        runs: usize,
    },

    /// The run decomposition of a mask does not cover exactly its set bits.
    #[error("block table of mask {mask:#018x} packs {width} bits, but the mask has {popcount}")]
    WidthMismatch {
        /// The decomposed mask.
        mask: u64,
        /// Number of bits packed by the runs.
        width: u32,
        /// Number of set bits of the mask.
        popcount: u32,
    },

    /// Two backends disagreed on the same benchmark input during tuning.
    #[error("backend {mode} produced checksum {actual:#x}, expected {expected:#x}")]
    InconsistentBackends {
        /// The backend that disagreed.
        mode: ExtractMode,
        /// Checksum of the first measured backend.
        expected: u64,
        /// Checksum of the disagreeing backend.
        actual: u64,
    },

    /// Tuning was asked to select from an empty set of measurements.
    #[error("no extraction backends were measured")]
    NoCandidates,

    /// A spaced seed pattern without symbols.
    #[error("empty spaced seed pattern")]
    EmptyPattern,

    /// A spaced seed pattern longer than 32 symbols does not fit into a 64-bit word.
    #[error("spaced seed pattern of length {0} exceeds 32 symbols")]
    PatternTooLong(usize),

    /// A spaced seed pattern symbol other than `0` or `1`.
    #[error("invalid symbol {symbol:?} at position {position} of spaced seed pattern")]
    InvalidPatternSymbol {
        /// The offending symbol.
        symbol: char,
        /// Position of the symbol in the pattern, counted in characters.
        position: usize,
    },

    /// A mask that is not a valid k-mer mask of the given span.
    #[error("mask {mask:#018x} is not a spaced k-mer mask of span {k}")]
    InvalidKmerMask {
        /// The rejected mask.
        mask: u64,
        /// The span the mask was checked against.
        k: usize,
    },

    /// A block table whose entries are not the run decomposition of their combined mask.
    #[error("block table entries are not the run decomposition of mask {mask:#018x}")]
    InconsistentBlockTable {
        /// The combined mask of the entries.
        mask: u64,
    },
}
