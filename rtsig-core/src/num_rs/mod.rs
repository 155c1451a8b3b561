//! Contiguous 1D numeric primitives.

#[cfg(feature = "alloc")]
mod convolve;
mod median;
mod vecops;

#[cfg(feature = "alloc")]
pub use convolve::*;
pub use median::*;
pub use vecops::*;
