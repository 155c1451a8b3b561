//! Trait interfaces for signal-processing capabilities.

use rtsig_core::Result;

/// Packet-by-packet 1D filtering capability shared by every streaming
/// filter.
///
/// Implementors pair this with [`crate::kernel::StreamLifecycle`]: all
/// methods here report [`rtsig_core::Error::NotInitialized`] before a
/// successful `initialize`.
pub trait StreamFilter1D<F> {
    /// Length of the initial-condition array, the delay-line length L.
    fn initial_condition_length(&self) -> Result<usize>;

    /// Stamp `zi` as the initial conditions and load it into the working
    /// delay line. `zi.len()` must equal [`Self::initial_condition_length`].
    fn set_initial_conditions(&mut self, zi: &[F]) -> Result<()>;

    /// Copy the stamped initial conditions back into the working delay
    /// line. Useful after a gap in real-time data.
    fn reset_initial_conditions(&mut self) -> Result<()>;

    /// Filter the packet `x` into `y`, returning the number of output
    /// samples written. `y` must be large enough for the packet; filters
    /// that preserve the sampling rate write exactly `x.len()` samples.
    ///
    /// In real-time mode the delay line advances across calls; in
    /// post-processing mode every call is an independent block run starting
    /// from the stamped initial conditions. An empty packet is a no-op.
    fn apply(&mut self, x: &[F], y: &mut [F]) -> Result<usize>;
}
