//! Streaming filter implementations.
//!
//! Stateful engines with delay lines. Each filter is created uninitialized,
//! validated and armed by `initialize`, fed packets through `apply`, and
//! torn down by `clear`. The post-processing/real-time distinction is a
//! mode flag on one type, never two types: tests depend on single-type
//! behavior parity.

mod decimate;
mod downsample;
mod fir;
mod iir;
mod iiriir;
mod median;
mod multirate;
mod sos;

pub use decimate::*;
pub use downsample::*;
pub use fir::*;
pub use iir::*;
pub use iiriir::*;
pub use median::*;
pub use multirate::*;
pub use sos::*;

use crate::kernel::ExecInvariantViolation;

/// Output-capacity check shared by the streaming filters.
pub(crate) fn check_output_len(needed: usize, got: usize) -> Result<(), ExecInvariantViolation> {
    if got < needed {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "y",
            expected: needed,
            got,
        });
    }
    Ok(())
}
