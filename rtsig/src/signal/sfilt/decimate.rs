//! Lowpass-filter-then-downsample convenience.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::filter::design::{firwin, FilterBandType, FirWindow};
use crate::signal::traits::StreamFilter1D;
use crate::special::Bessel;
use alloc::vec::Vec;
use num_traits::{Float, NumAssign};
use rtsig_core::{Error, Result};

use super::{Downsample, DownsampleConfig, FirFilter, FirFilterConfig};

const MODULE: &str = "Decimate";

/// Configuration for [`Decimate::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimateConfig {
    /// Downsampling factor, at least 2.
    pub down_factor: usize,
    /// Requested FIR length, at least 5. When removing the phase shift the
    /// length is adjusted so the group delay aligns with the decimation
    /// grid; check [`Decimate::fir_filter_length`] for the value in force.
    pub filter_length: usize,
    /// Remove the FIR group delay from the output. Post-processing only;
    /// ignored with a warning in real-time mode.
    pub remove_phase_shift: bool,
    /// State persistence mode.
    pub mode: ProcessingMode,
}

impl Default for DecimateConfig {
    fn default() -> Self {
        Self {
            down_factor: 2,
            filter_length: 30,
            remove_phase_shift: true,
            mode: ProcessingMode::PostProcessing,
        }
    }
}

#[derive(Debug, Clone)]
struct DecimateState<F>
where
    F: Float,
{
    factor: usize,
    fir: FirFilter<F>,
    down: Downsample,
    group_delay: usize,
    fir_length: usize,
    remove_phase_shift: bool,
    mode: ProcessingMode,
}

/// Downsampler with an anti-alias Hamming FIR lowpass at cutoff `1/q`.
///
/// With phase-shift removal (post-processing), the FIR length is grown
/// until `group delay + 1` divides evenly by the decimation factor, the
/// output is shifted left by the group delay, and the trailing zeros are
/// dropped so an input of `n` samples yields `ceil(n / q)`.
#[derive(Debug, Clone, Default)]
pub struct Decimate<F>
where
    F: Float,
{
    state: Option<DecimateState<F>>,
}

impl<F> Decimate<F>
where
    F: Float + NumAssign + Bessel,
{
    /// Create an uninitialized decimator.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// The downsampling factor.
    pub fn downsampling_factor(&self) -> Result<usize> {
        Ok(self.state()?.factor)
    }

    /// The anti-alias FIR length in force.
    pub fn fir_filter_length(&self) -> Result<usize> {
        Ok(self.state()?.fir_length)
    }

    /// Output samples produced for an input of `n` samples.
    pub fn estimate_space(&self, n: usize) -> Result<usize> {
        let state = self.state()?;
        if state.remove_phase_shift {
            Ok(n.div_ceil(state.factor))
        } else {
            state.down.estimate_space(n)
        }
    }

    fn state(&self) -> Result<&DecimateState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut DecimateState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }
}

impl<F> StreamLifecycle for Decimate<F>
where
    F: Float + NumAssign + Bessel,
{
    type Config = DecimateConfig;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.down_factor < 2 {
            return Err(ConfigError::InvalidArgument {
                arg: "down_factor",
                reason: "downsampling factor must be at least 2",
            });
        }
        if config.filter_length < 5 {
            return Err(ConfigError::InvalidArgument {
                arg: "filter_length",
                reason: "FIR length must be at least 5",
            });
        }
        let q = config.down_factor;

        let mut remove_phase_shift = config.remove_phase_shift;
        if remove_phase_shift && config.mode == ProcessingMode::RealTime {
            log::warn!("phase-shift removal applies to post-processing only; ignoring");
            remove_phase_shift = false;
        }

        // Align the group delay with the decimation grid so the shifted
        // output lands on the kept samples.
        let mut nt = config.filter_length;
        if remove_phase_shift {
            if nt % 2 == 0 {
                nt += 1;
            }
            while ((nt - 1) / 2 + 1) % q != 0 {
                nt += 2;
            }
            if nt != config.filter_length {
                log::warn!(
                    "FIR length adjusted from {} to {nt} to align the group delay",
                    config.filter_length
                );
            }
        }

        let cutoff = F::one() / F::from(q).unwrap();
        let fir_design = firwin(nt, FilterBandType::Lowpass, &[cutoff], FirWindow::Hamming)?;
        let nt = fir_design.taps.len();
        let group_delay = (nt - 1) / 2;

        let mut fir = FirFilter::new();
        fir.initialize(FirFilterConfig {
            taps: fir_design.taps,
            mode: config.mode,
        })?;
        let mut down = Downsample::new();
        down.initialize(DownsampleConfig {
            factor: q,
            mode: config.mode,
        })?;

        self.state = Some(DecimateState {
            factor: q,
            fir,
            down,
            group_delay,
            fir_length: nt,
            remove_phase_shift,
            mode: config.mode,
        });
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn clear(&mut self) {
        self.state = None;
    }
}

impl<F> StreamFilter1D<F> for Decimate<F>
where
    F: Float + NumAssign + Bessel,
{
    fn initial_condition_length(&self) -> Result<usize> {
        self.state()?.fir.initial_condition_length()
    }

    fn set_initial_conditions(&mut self, zi: &[F]) -> Result<()> {
        let state = self.state_mut()?;
        state.fir.set_initial_conditions(zi)?;
        StreamFilter1D::<F>::reset_initial_conditions(&mut state.down)?;
        Ok(())
    }

    fn reset_initial_conditions(&mut self) -> Result<()> {
        let state = self.state_mut()?;
        state.fir.reset_initial_conditions()?;
        StreamFilter1D::<F>::reset_initial_conditions(&mut state.down)?;
        Ok(())
    }

    fn apply(&mut self, x: &[F], y: &mut [F]) -> Result<usize> {
        if x.is_empty() {
            return Ok(0);
        }
        let state = self.state_mut()?;

        if state.remove_phase_shift && state.mode == ProcessingMode::PostProcessing {
            let g = state.group_delay;
            let mut padded = Vec::with_capacity(x.len() + g);
            padded.extend_from_slice(x);
            padded.extend(core::iter::repeat(F::zero()).take(g));
            let mut filtered = alloc::vec![F::zero(); padded.len()];
            state.fir.apply(&padded, &mut filtered)?;
            return state.down.apply(&filtered[g..], y);
        }

        let mut filtered = alloc::vec![F::zero(); x.len()];
        state.fir.apply(x, &mut filtered)?;
        state.down.apply(&filtered, y)
    }
}
