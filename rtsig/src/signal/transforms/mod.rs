//! Transforms: the real-to-complex DFT plan, analytic-signal envelopes, and
//! DFT utilities.

mod dft;
mod envelope;
mod utils;

pub use dft::*;
pub use envelope::*;
pub use utils::*;
