//! Direct-form FIR streaming filter.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::traits::StreamFilter1D;
use alloc::vec::Vec;
use ndarray::ArrayView1;
use num_traits::{Float, NumAssign};
use rtsig_core::num_rs::{convolve, ConvolveMode};
use rtsig_core::{Error, Result};

use super::check_output_len;

const MODULE: &str = "FirFilter";

/// Configuration for [`FirFilter::initialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct FirFilterConfig<F>
where
    F: Float,
{
    /// Filter taps `b`, applied as `y[n] = sum_k b[k] x[n - k]`.
    pub taps: Vec<F>,
    /// Delay-line persistence mode.
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone)]
struct FirState<F> {
    b: Vec<F>,
    zi: Vec<F>,
    dly: Vec<F>,
    mode: ProcessingMode,
}

/// Streaming direct-form FIR filter with `nt - 1` delay-line samples.
#[derive(Debug, Clone, Default)]
pub struct FirFilter<F>
where
    F: Float,
{
    state: Option<FirState<F>>,
}

impl<F> FirFilter<F>
where
    F: Float + NumAssign,
{
    /// Create an uninitialized filter.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// The number of filter taps.
    pub fn taps_len(&self) -> Result<usize> {
        let state = self.state()?;
        Ok(state.b.len())
    }

    fn state(&self) -> Result<&FirState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut FirState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }
}

impl<F> StreamLifecycle for FirFilter<F>
where
    F: Float + NumAssign,
{
    type Config = FirFilterConfig<F>;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.taps.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "taps" });
        }
        let ic_len = config.taps.len() - 1;
        self.state = Some(FirState {
            b: config.taps,
            zi: alloc::vec![F::zero(); ic_len],
            dly: alloc::vec![F::zero(); ic_len],
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

impl<F> StreamFilter1D<F> for FirFilter<F>
where
    F: Float + NumAssign,
{
    fn initial_condition_length(&self) -> Result<usize> {
        Ok(self.state()?.zi.len())
    }

    fn set_initial_conditions(&mut self, zi: &[F]) -> Result<()> {
        let state = self.state_mut()?;
        if zi.len() != state.zi.len() {
            return Err(ConfigError::LengthMismatch {
                arg: "zi",
                expected: state.zi.len(),
                got: zi.len(),
            }
            .into());
        }
        state.zi.copy_from_slice(zi);
        state.dly.copy_from_slice(zi);
        Ok(())
    }

    fn reset_initial_conditions(&mut self) -> Result<()> {
        let state = self.state_mut()?;
        let zi = state.zi.clone();
        state.dly.copy_from_slice(&zi);
        Ok(())
    }

    fn apply(&mut self, x: &[F], y: &mut [F]) -> Result<usize> {
        if x.is_empty() {
            return Ok(0);
        }
        let state = self.state_mut()?;
        check_output_len(x.len(), y.len())?;

        let m = x.len();
        let nt = state.b.len();
        let ic_len = nt - 1;

        // Zero-state post-processing packets are a plain convolution.
        if state.mode == ProcessingMode::PostProcessing
            && m >= nt
            && state.dly.iter().all(|v| *v == F::zero())
        {
            let full = convolve(
                ArrayView1::from(x),
                ArrayView1::from(state.b.as_slice()),
                ConvolveMode::Full,
            )?;
            for (yi, v) in y.iter_mut().zip(full.iter().take(m)) {
                *yi = *v;
            }
            return Ok(m);
        }

        let mut work = Vec::with_capacity(ic_len + m);
        work.extend_from_slice(&state.dly);
        work.extend_from_slice(x);

        for (i, yi) in y.iter_mut().enumerate().take(m) {
            let mut acc = F::zero();
            for (k, bk) in state.b.iter().enumerate() {
                acc = acc + *bk * work[ic_len + i - k];
            }
            *yi = acc;
        }

        if state.mode == ProcessingMode::RealTime && ic_len > 0 {
            state.dly.copy_from_slice(&work[m..]);
        }
        Ok(m)
    }
}
