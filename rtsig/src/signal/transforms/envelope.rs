//! Analytic-signal envelopes.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::filter::design::hilbert_transformer;
use crate::signal::sfilt::{FirFilter, FirFilterConfig};
use crate::signal::traits::StreamFilter1D;
use crate::special::Bessel;
use alloc::sync::Arc;
use alloc::vec::Vec;
use num_traits::{Float, NumAssign};
use rtsig_core::num_rs;
use rtsig_core::{Error, Result};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftNum, FftPlanner};

const FFT_MODULE: &str = "Envelope";
const FIR_MODULE: &str = "FirEnvelope";

/// Real-time FIR envelope packets are processed in chunks of this size.
const CHUNK_SIZE: usize = 1024;

/// Configuration for [`Envelope::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// Number of samples per transform.
    pub length: usize,
}

struct EnvelopeState<F> {
    n: usize,
    forward: Arc<dyn Fft<F>>,
    inverse: Arc<dyn Fft<F>>,
    buffer: Vec<Complex<F>>,
    scratch: Vec<Complex<F>>,
}

/// FFT-based envelope through the frequency-domain analytic signal.
///
/// `Z[0] = X[0]`, interior bins are doubled, the Nyquist bin (even N) is
/// kept, negative frequencies are zeroed, and the envelope is the magnitude
/// of the inverse transform.
pub struct Envelope<F>
where
    F: FftNum + Float,
{
    state: Option<EnvelopeState<F>>,
}

impl<F> Default for Envelope<F>
where
    F: FftNum + Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Envelope<F>
where
    F: FftNum + Float,
{
    /// Create an uninitialized transform.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// The configured signal length.
    pub fn length(&self) -> Result<usize> {
        Ok(self
            .state
            .as_ref()
            .ok_or(Error::NotInitialized { module: FFT_MODULE })?
            .n)
    }

    /// Compute the envelope of `x` into `y`. `x.len()` must equal the
    /// configured length.
    pub fn transform(&mut self, x: &[F], y: &mut [F]) -> Result<()> {
        let state = self
            .state
            .as_mut()
            .ok_or(Error::NotInitialized { module: FFT_MODULE })?;
        let n = state.n;
        if x.len() != n {
            return Err(ConfigError::LengthMismatch {
                arg: "x",
                expected: n,
                got: x.len(),
            }
            .into());
        }
        if y.len() < n {
            return Err(ConfigError::LengthMismatch {
                arg: "y",
                expected: n,
                got: y.len(),
            }
            .into());
        }
        if n == 1 {
            y[0] = Float::abs(x[0]);
            return Ok(());
        }

        for (dst, src) in state.buffer.iter_mut().zip(x.iter()) {
            *dst = Complex::new(*src, F::zero());
        }
        state
            .forward
            .process_with_scratch(&mut state.buffer, &mut state.scratch);

        // Analytic-signal weights: interior positive bins doubled, the
        // Nyquist bin (even N) kept, negative frequencies zeroed.
        let two = F::from(2.0).unwrap();
        for k in 1..n {
            if 2 * k < n {
                state.buffer[k] = state.buffer[k] * two;
            } else if 2 * k > n {
                state.buffer[k] = Complex::new(F::zero(), F::zero());
            }
        }

        state
            .inverse
            .process_with_scratch(&mut state.buffer, &mut state.scratch);
        let scale = F::one() / F::from(n).unwrap();
        for (dst, src) in y.iter_mut().zip(state.buffer.iter()) {
            *dst = src.norm() * scale;
        }
        Ok(())
    }
}

impl<F> StreamLifecycle for Envelope<F>
where
    F: FftNum + Float,
{
    type Config = EnvelopeConfig;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.length < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "length",
                reason: "signal length must be positive",
            });
        }
        let n = config.length;
        let mut planner = FftPlanner::<F>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        self.state = Some(EnvelopeState {
            n,
            forward,
            inverse,
            buffer: alloc::vec![Complex::new(F::zero(), F::zero()); n],
            scratch: alloc::vec![Complex::new(F::zero(), F::zero()); scratch_len],
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

/// Configuration for [`FirEnvelope::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirEnvelopeConfig {
    /// Hilbert transformer tap count. Odd counts give the type III pair.
    pub taps: usize,
    /// Post-processing compensates the group delay; real-time streams
    /// phase-consistently without compensation.
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone)]
struct FirEnvelopeState<F>
where
    F: Float,
{
    taps: usize,
    type3: bool,
    mode: ProcessingMode,
    real: FirFilter<F>,
    imag: FirFilter<F>,
}

/// FIR-Hilbert-based envelope.
///
/// The Kaiser-windowed (beta = 8) Hilbert pair forms the analytic signal.
/// Post-processing removes the mean, zero-pads by the group delay, aligns
/// the two branches, and restores the mean after the magnitude. Real-time
/// packets are run through both branches in 1024-sample chunks with no
/// delay compensation.
#[derive(Debug, Clone, Default)]
pub struct FirEnvelope<F>
where
    F: Float,
{
    state: Option<FirEnvelopeState<F>>,
}

impl<F> FirEnvelope<F>
where
    F: Float + NumAssign + Bessel,
{
    /// Create an uninitialized transform.
    pub fn new() -> Self {
        Self { state: None }
    }

    fn state_mut(&mut self) -> Result<&mut FirEnvelopeState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: FIR_MODULE })
    }

    fn state(&self) -> Result<&FirEnvelopeState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: FIR_MODULE })
    }

    /// Length of the initial-condition array of either branch.
    pub fn initial_condition_length(&self) -> Result<usize> {
        self.state()?.imag.initial_condition_length()
    }

    /// Stamp initial conditions into both branch filters.
    pub fn set_initial_conditions(&mut self, zi: &[F]) -> Result<()> {
        let state = self.state_mut()?;
        state.real.set_initial_conditions(zi)?;
        state.imag.set_initial_conditions(zi)?;
        Ok(())
    }

    /// Restore both branch filters to the stamped initial conditions.
    pub fn reset_initial_conditions(&mut self) -> Result<()> {
        let state = self.state_mut()?;
        state.real.reset_initial_conditions()?;
        state.imag.reset_initial_conditions()?;
        Ok(())
    }

    /// Compute the envelope of the packet `x` into `y`.
    pub fn transform(&mut self, x: &[F], y: &mut [F]) -> Result<usize> {
        if x.is_empty() {
            return Ok(0);
        }
        let state = self.state_mut()?;
        if y.len() < x.len() {
            return Err(ConfigError::LengthMismatch {
                arg: "y",
                expected: x.len(),
                got: y.len(),
            }
            .into());
        }
        let n = x.len();

        match state.mode {
            ProcessingMode::PostProcessing => {
                let mean = num_rs::mean(x);
                let g = state.taps / 2;
                let npad = n + g;

                let mut xpad = Vec::with_capacity(npad);
                xpad.extend(x.iter().map(|v| *v - mean));
                xpad.extend(core::iter::repeat(F::zero()).take(g));

                let mut imag_out = alloc::vec![F::zero(); npad];
                state.imag.apply(&xpad, &mut imag_out)?;

                if state.type3 {
                    // The real branch is a pure delay; align the shifted
                    // imaginary branch against the unfiltered input.
                    num_rs::magnitude(&xpad[..n], &imag_out[g..g + n], &mut y[..n]);
                } else {
                    let mut real_out = alloc::vec![F::zero(); npad];
                    state.real.apply(&xpad, &mut real_out)?;
                    num_rs::magnitude(&real_out[g..g + n], &imag_out[g..g + n], &mut y[..n]);
                }
                num_rs::add_scalar(&mut y[..n], mean);
                Ok(n)
            }
            ProcessingMode::RealTime => {
                let mut real_chunk = alloc::vec![F::zero(); CHUNK_SIZE];
                let mut imag_chunk = alloc::vec![F::zero(); CHUNK_SIZE];
                let mut start = 0usize;
                while start < n {
                    let len = CHUNK_SIZE.min(n - start);
                    let xc = &x[start..start + len];
                    state.real.apply(xc, &mut real_chunk[..len])?;
                    state.imag.apply(xc, &mut imag_chunk[..len])?;
                    num_rs::magnitude(
                        &real_chunk[..len],
                        &imag_chunk[..len],
                        &mut y[start..start + len],
                    );
                    start += len;
                }
                Ok(n)
            }
        }
    }
}

impl<F> StreamLifecycle for FirEnvelope<F>
where
    F: Float + NumAssign + Bessel,
{
    type Config = FirEnvelopeConfig;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.taps < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "taps",
                reason: "tap count must be positive",
            });
        }
        let beta = F::from(8.0).unwrap();
        let (real_fir, imag_fir) = hilbert_transformer(config.taps - 1, beta)?;

        let mut real = FirFilter::new();
        real.initialize(FirFilterConfig {
            taps: real_fir.taps,
            mode: config.mode,
        })?;
        let mut imag = FirFilter::new();
        imag.initialize(FirFilterConfig {
            taps: imag_fir.taps,
            mode: config.mode,
        })?;

        self.state = Some(FirEnvelopeState {
            taps: config.taps,
            type3: config.taps % 2 == 1,
            mode: config.mode,
            real,
            imag,
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
