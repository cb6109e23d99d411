//! Manual loop unrolling for the block table backends.
//!
//! `unroll!(n, |i| body, base)` expands `body` `n` times, with `i` bound to the constants
//! `base, base + 1, ..., base + n - 1`. Only powers of two up to eight are supported, each arm
//! doubling the one below. Constant indices let the compiler drop the bounds checks on
//! `chunks_exact` slices, which it does not reliably do for a rolled loop.

macro_rules! unroll {
    (1, |$i:ident| $body:expr, $base:expr) => {{
        let $i: usize = $base;
        $body;
    }};
    (2, |$i:ident| $body:expr, $base:expr) => {
        unroll!(1, |$i| $body, $base);
        unroll!(1, |$i| $body, $base + 1);
    };
    (4, |$i:ident| $body:expr, $base:expr) => {
        unroll!(2, |$i| $body, $base);
        unroll!(2, |$i| $body, $base + 2);
    };
    (8, |$i:ident| $body:expr, $base:expr) => {
        unroll!(4, |$i| $body, $base);
        unroll!(4, |$i| $body, $base + 4);
    };
}

pub(crate) use unroll;
