//! Zero-phase IIR filtering: forward, reverse, forward, reverse.

use crate::kernel::{ConfigError, ExecInvariantViolation, ProcessingMode, StreamLifecycle};
use crate::linalg::companion;
use crate::signal::traits::StreamFilter1D;
use alloc::vec::Vec;
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;
use rtsig_core::{Error, Result};

use super::iir::{df2t_run, normalize_ba};
use super::check_output_len;

const MODULE: &str = "IirIirFilter";

/// Configuration for [`IirIirFilter::initialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct IirIirConfig<F>
where
    F: Float,
{
    /// Numerator coefficients.
    pub b: Vec<F>,
    /// Denominator coefficients; `a[0]` must be non-zero.
    pub a: Vec<F>,
    /// Reflect-pad length at each edge. `None` selects the default
    /// `3 * max(nb, na)`.
    pub pad_length: Option<usize>,
    /// Must be [`ProcessingMode::PostProcessing`]; zero-phase filtering has
    /// no causal streaming form.
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone)]
struct IirIirState<F> {
    b: Vec<F>,
    a: Vec<F>,
    /// Steady-state unit step delay line; scaled by the edge sample before
    /// each directional pass.
    zi: Vec<F>,
    pad_length: usize,
}

/// Zero-phase IIR filter.
///
/// Runs the filter forward, reverses, runs it again, and reverses, so the
/// pass band sees no phase delay and the effective order doubles. Edges are
/// handled by odd reflection of `pad_length` samples and the per-direction
/// initial conditions solve `(I - A) zi = B` scaled by the first sample, so
/// transients at both ends are suppressed.
#[derive(Debug, Clone, Default)]
pub struct IirIirFilter<F>
where
    F: Float,
{
    state: Option<IirIirState<F>>,
}

/// Steady-state delay line of the transposed direct-form II filter for a
/// unit-amplitude step, the `lfilter_zi` construction.
pub(crate) fn lfilter_zi<F>(b: &[F], a: &[F]) -> core::result::Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Float + Copy,
{
    let n = b.len();
    if n < 2 {
        return Ok(Vec::new());
    }
    let m = n - 1;
    let comp = companion(a)?;
    let iminus_a = DMatrix::<F>::identity(m, m) - comp.transpose();
    let rhs = DVector::from_iterator(m, (1..n).map(|i| b[i] - a[i] * b[0]));
    let zi = iminus_a
        .lu()
        .solve(&rhs)
        .ok_or(ExecInvariantViolation::InvalidState {
            reason: "steady-state initial-condition solve is singular",
        })?;
    Ok(zi.iter().copied().collect())
}

/// Odd extension of `x` by `edge` samples at both ends.
fn odd_ext<F: Float>(x: &[F], edge: usize) -> Vec<F> {
    let two = F::from(2.0).unwrap();
    let first = x[0];
    let last = x[x.len() - 1];
    let mut out = Vec::with_capacity(x.len() + 2 * edge);
    for i in 0..edge {
        out.push(two * first - x[edge - i]);
    }
    out.extend_from_slice(x);
    for i in 0..edge {
        out.push(two * last - x[x.len() - 2 - i]);
    }
    out
}

impl<F> IirIirFilter<F>
where
    F: RealField + Float + Copy,
{
    /// Create an uninitialized filter.
    pub fn new() -> Self {
        Self { state: None }
    }

    fn state(&self) -> Result<&IirIirState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut IirIirState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    /// The reflect-pad length applied at each edge.
    pub fn pad_length(&self) -> Result<usize> {
        Ok(self.state()?.pad_length)
    }
}

impl<F> StreamLifecycle for IirIirFilter<F>
where
    F: RealField + Float + Copy,
{
    type Config = IirIirConfig<F>;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.mode != ProcessingMode::PostProcessing {
            return Err(ConfigError::InvalidArgument {
                arg: "mode",
                reason: "zero-phase filtering is only valid in post-processing",
            });
        }
        let (b, a) = normalize_ba(&config.b, &config.a)?;
        let zi = lfilter_zi(&b, &a).map_err(|_| ConfigError::InvalidArgument {
            arg: "a",
            reason: "steady-state initial-condition solve failed",
        })?;
        let pad_length = config.pad_length.unwrap_or(3 * b.len());
        self.state = Some(IirIirState {
            b,
            a,
            zi,
            pad_length,
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

impl<F> StreamFilter1D<F> for IirIirFilter<F>
where
    F: RealField + Float + Copy,
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
        Ok(())
    }

    fn reset_initial_conditions(&mut self) -> Result<()> {
        // Forward-backward runs are stateless across packets; the stamped
        // conditions are already in force.
        self.state()?;
        Ok(())
    }

    fn apply(&mut self, x: &[F], y: &mut [F]) -> Result<usize> {
        if x.is_empty() {
            return Ok(0);
        }
        let state = self.state()?;
        check_output_len(x.len(), y.len())?;
        let edge = state.pad_length;
        if x.len() <= edge {
            return Err(Error::InvalidArg {
                arg: "x".into(),
                reason: alloc::format!(
                    "zero-phase filtering needs more than pad_length = {edge} samples"
                ),
            });
        }

        let ext = odd_ext(x, edge);

        // Forward pass, transient matched to the first extended sample.
        let mut z: Vec<F> = state.zi.iter().map(|v| *v * ext[0]).collect();
        let mut forward = alloc::vec![F::zero(); ext.len()];
        df2t_run(&state.b, &state.a, &mut z, &ext, &mut forward);

        // Backward pass over the reversed forward output.
        forward.reverse();
        let mut z: Vec<F> = state.zi.iter().map(|v| *v * forward[0]).collect();
        let mut backward = alloc::vec![F::zero(); forward.len()];
        df2t_run(&state.b, &state.a, &mut z, &forward, &mut backward);
        backward.reverse();

        for (yi, v) in y.iter_mut().zip(backward[edge..edge + x.len()].iter()) {
            *yi = *v;
        }
        Ok(x.len())
    }
}
