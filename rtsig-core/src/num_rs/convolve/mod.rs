//! Linear convolution over contiguous 1D signals.
//!
//! This is the block path the streaming FIR kernels reach for when a
//! post-processing packet starts from rest: applying the taps to a whole
//! packet is one `Full` convolution truncated to the packet length.

use crate::{Error, Result};
use alloc::string::ToString;
use ndarray::{Array1, ArrayView1};
use ndarray_conv::{ConvExt, ConvMode, PaddingMode};

/// How much of the taps/signal overlap to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Every point of overlap, `signal + taps - 1` samples. The leading
    /// `taps - 1` samples carry the start-up transient and the trailing
    /// ones the ring-out.
    Full,
    /// Only the samples where the taps sit entirely inside the signal,
    /// `signal - taps + 1` of them. No edge transients.
    Valid,
    /// The central `signal`-length slice of the full result.
    Same,
}

impl From<ConvolveMode> for ConvMode<1> {
    fn from(mode: ConvolveMode) -> Self {
        match mode {
            ConvolveMode::Full => ConvMode::Full,
            ConvolveMode::Valid => ConvMode::Valid,
            ConvolveMode::Same => ConvMode::Same,
        }
    }
}

/// Convolve a signal `a` with the taps `v`.
///
/// The taps are the second argument and are assumed to be no longer than
/// the signal; callers filtering packets shorter than the taps take the
/// delay-line path instead.
///
/// # Examples
/// A unit impulse reproduces the taps at its own delay:
/// ```
/// use ndarray::array;
/// use rtsig_core::num_rs::{convolve, ConvolveMode};
///
/// let impulse = array![0.0, 0.0, 1.0, 0.0, 0.0];
/// let taps = array![0.5, 0.3, 0.2];
///
/// let response = convolve((&impulse).into(), (&taps).into(), ConvolveMode::Full).unwrap();
/// assert_eq!(response, array![0.0, 0.0, 0.5, 0.3, 0.2, 0.0, 0.0]);
/// ```
pub fn convolve<T>(a: ArrayView1<T>, v: ArrayView1<T>, mode: ConvolveMode) -> Result<Array1<T>>
where
    T: num_traits::NumAssign + core::marker::Copy,
{
    a.conv(&v, mode.into(), PaddingMode::Zeros)
        .map_err(|e| Error::RuntimeFailure {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn impulse_response_is_the_shifted_taps() {
        let impulse = array![0.0, 0.0, 1.0, 0.0, 0.0];
        let taps = array![0.5, 0.3, 0.2];

        let y = convolve((&impulse).into(), (&taps).into(), ConvolveMode::Full).unwrap();
        assert_eq!(y, array![0.0, 0.0, 0.5, 0.3, 0.2, 0.0, 0.0]);
    }

    #[test]
    fn full_mode_keeps_the_edge_transients() {
        // Two-point averager over a ramp: half-weight samples at both ends.
        let ramp = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let taps = array![0.5, 0.5];

        let y = convolve((&ramp).into(), (&taps).into(), ConvolveMode::Full).unwrap();
        assert_eq!(y, array![0.5, 1.5, 2.5, 3.5, 4.5, 2.5]);
    }

    #[test]
    fn same_mode_preserves_the_signal_length() {
        let ramp = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let taps = array![0.5, 0.5];

        let y = convolve((&ramp).into(), (&taps).into(), ConvolveMode::Same).unwrap();
        assert_eq!(y, array![0.5, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn valid_mode_drops_partial_overlap() {
        // The averaged ramp is exact wherever the taps fully overlap.
        let ramp = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let taps = array![0.5, 0.5];

        let y = convolve((&ramp).into(), (&taps).into(), ConvolveMode::Valid).unwrap();
        assert_eq!(y, array![1.5, 2.5, 3.5, 4.5]);
    }
}
