pub(crate) mod splitmix;
pub(crate) mod unroll;

pub use splitmix::SplitMix64;

// reexport all macros at toplevel for convenience
pub(crate) use unroll::unroll;
