//! Fixed-length real-to-complex DFT plan.

use crate::kernel::{ConfigError, StreamLifecycle};
use alloc::sync::Arc;
use alloc::vec::Vec;
use num_traits::Float;
use rtsig_core::{Error, Result};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftNum, FftPlanner};

const MODULE: &str = "RealToComplexDft";

/// Requested transform backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DftImplementation {
    /// Plain DFT at any length.
    #[default]
    Dft,
    /// FFT; honored when the transform length is a power of two.
    Fft,
}

/// Configuration for [`RealToComplexDft::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealToComplexDftConfig {
    /// Fixed transform length N. Shorter forward inputs are zero-padded.
    pub length: usize,
    /// Backend request; [`DftImplementation::Fft`] applies when `length`
    /// is a power of two.
    pub implementation: DftImplementation,
}

struct DftState<F> {
    n: usize,
    implementation: DftImplementation,
    forward: Arc<dyn Fft<F>>,
    inverse: Arc<dyn Fft<F>>,
    buffer: Vec<Complex<F>>,
    scratch: Vec<Complex<F>>,
}

/// A real-to-complex DFT plan of fixed length N.
///
/// Forward transforms accept up to N real samples (zero-padded to N) and
/// produce `N/2 + 1` complex bins; the inverse accepts up to `N/2 + 1`
/// bins, extends them Hermitian-symmetrically, and produces N real samples
/// scaled by `1/N`.
pub struct RealToComplexDft<F>
where
    F: FftNum + Float,
{
    state: Option<DftState<F>>,
}

impl<F> Default for RealToComplexDft<F>
where
    F: FftNum + Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F> RealToComplexDft<F>
where
    F: FftNum + Float,
{
    /// Create an uninitialized plan.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// The fixed input length N.
    pub fn length(&self) -> Result<usize> {
        Ok(self.state()?.n)
    }

    /// Number of complex output bins, `N/2 + 1`.
    pub fn transform_length(&self) -> Result<usize> {
        Ok(self.state()?.n / 2 + 1)
    }

    /// The backend in force: [`DftImplementation::Fft`] only when it was
    /// requested and N is a power of two.
    pub fn implementation(&self) -> Result<DftImplementation> {
        Ok(self.state()?.implementation)
    }

    fn state(&self) -> Result<&DftState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut DftState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    /// Forward transform: `x.len() <= N` real samples in, `N/2 + 1`
    /// complex bins out.
    pub fn forward(&mut self, x: &[F], z: &mut [Complex<F>]) -> Result<()> {
        let state = self.state_mut()?;
        let n = state.n;
        let nbins = n / 2 + 1;
        if x.len() > n {
            return Err(ConfigError::InvalidArgument {
                arg: "x",
                reason: "input exceeds the configured transform length",
            }
            .into());
        }
        if z.len() < nbins {
            return Err(ConfigError::LengthMismatch {
                arg: "z",
                expected: nbins,
                got: z.len(),
            }
            .into());
        }

        for (dst, src) in state.buffer.iter_mut().zip(x.iter()) {
            *dst = Complex::new(*src, F::zero());
        }
        for dst in state.buffer.iter_mut().skip(x.len()) {
            *dst = Complex::new(F::zero(), F::zero());
        }
        state
            .forward
            .process_with_scratch(&mut state.buffer, &mut state.scratch);
        z[..nbins].copy_from_slice(&state.buffer[..nbins]);
        Ok(())
    }

    /// Inverse transform: up to `N/2 + 1` bins in (Hermitian extension
    /// implied), N real samples out, scaled by `1/N`.
    pub fn inverse(&mut self, z: &[Complex<F>], y: &mut [F]) -> Result<()> {
        let state = self.state_mut()?;
        let n = state.n;
        let nbins = n / 2 + 1;
        if z.len() > nbins {
            return Err(ConfigError::InvalidArgument {
                arg: "z",
                reason: "input exceeds the one-sided bin count",
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

        for dst in state.buffer.iter_mut() {
            *dst = Complex::new(F::zero(), F::zero());
        }
        state.buffer[..z.len()].copy_from_slice(z);
        if n > 1 {
            let max_k = if n % 2 == 0 { n / 2 - 1 } else { n / 2 };
            for k in 1..=max_k {
                state.buffer[n - k] = state.buffer[k].conj();
            }
        }
        state
            .inverse
            .process_with_scratch(&mut state.buffer, &mut state.scratch);
        let scale = F::one() / F::from(n).unwrap();
        for (dst, src) in y.iter_mut().zip(state.buffer.iter()) {
            *dst = src.re * scale;
        }
        Ok(())
    }
}

impl<F> StreamLifecycle for RealToComplexDft<F>
where
    F: FftNum + Float,
{
    type Config = RealToComplexDftConfig;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.length < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "length",
                reason: "transform length must be positive",
            });
        }
        let n = config.length;
        let implementation = if config.implementation == DftImplementation::Fft
            && n.is_power_of_two()
        {
            DftImplementation::Fft
        } else {
            DftImplementation::Dft
        };

        let mut planner = FftPlanner::<F>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        self.state = Some(DftState {
            n,
            implementation,
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
