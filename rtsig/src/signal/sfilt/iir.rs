//! IIR streaming filter in direct form II.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::traits::StreamFilter1D;
use alloc::vec::Vec;
use num_traits::Float;
use rtsig_core::{Error, Result};

use super::check_output_len;

const MODULE: &str = "IirFilter";

/// Selectable direct-form II realization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IirImplementation {
    /// Transposed direct form II. The numerically stabler default.
    #[default]
    Df2Transposed,
    /// Plain direct form II. Slightly cheaper per sample.
    Df2Fast,
}

/// Configuration for [`IirFilter::initialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct IirFilterConfig<F>
where
    F: Float,
{
    /// Numerator coefficients.
    pub b: Vec<F>,
    /// Denominator coefficients; `a[0]` must be non-zero. Both sets are
    /// normalized by `a[0]` at initialization.
    pub a: Vec<F>,
    /// Delay-line persistence mode.
    pub mode: ProcessingMode,
    /// Realization to run.
    pub implementation: IirImplementation,
}

#[derive(Debug, Clone)]
struct IirState<F> {
    b: Vec<F>,
    a: Vec<F>,
    zi: Vec<F>,
    dly: Vec<F>,
    mode: ProcessingMode,
    implementation: IirImplementation,
}

/// Streaming IIR filter with `max(nb, na) - 1` delay-line samples.
///
/// The transposed and fast realizations produce the same output up to
/// accumulated rounding; initial conditions are interpreted in the state
/// space of the selected realization.
#[derive(Debug, Clone, Default)]
pub struct IirFilter<F>
where
    F: Float,
{
    state: Option<IirState<F>>,
}

/// One transposed direct-form II pass over `x`, advancing `z` in place.
///
/// Coefficients must be normalized and zero-padded to the same length.
pub(crate) fn df2t_run<F: Float>(b: &[F], a: &[F], z: &mut [F], x: &[F], y: &mut [F]) {
    let n = b.len();
    let order = n - 1;
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        let out = if order == 0 {
            b[0] * *xi
        } else {
            b[0] * *xi + z[0]
        };
        for i in 0..order.saturating_sub(1) {
            z[i] = b[i + 1] * *xi + z[i + 1] - a[i + 1] * out;
        }
        if order > 0 {
            z[order - 1] = b[n - 1] * *xi - a[n - 1] * out;
        }
        *yi = out;
    }
}

fn df2_run<F: Float>(b: &[F], a: &[F], w: &mut [F], x: &[F], y: &mut [F]) {
    let n = b.len();
    let order = n - 1;
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        let mut w0 = *xi;
        for i in 1..n {
            w0 = w0 - a[i] * w[i - 1];
        }
        let mut out = b[0] * w0;
        for i in 1..n {
            out = out + b[i] * w[i - 1];
        }
        for i in (1..order).rev() {
            w[i] = w[i - 1];
        }
        if order > 0 {
            w[0] = w0;
        }
        *yi = out;
    }
}

impl<F> IirFilter<F>
where
    F: Float,
{
    /// Create an uninitialized filter.
    pub fn new() -> Self {
        Self { state: None }
    }

    fn state(&self) -> Result<&IirState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut IirState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }
}

/// Validate, normalize by `a[0]`, and zero-pad both coefficient sets to
/// `max(nb, na)`.
pub(crate) fn normalize_ba<F: Float>(
    b: &[F],
    a: &[F],
) -> core::result::Result<(Vec<F>, Vec<F>), ConfigError> {
    if b.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "b" });
    }
    if a.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "a" });
    }
    if a[0] == F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg: "a",
            reason: "leading denominator coefficient must be non-zero",
        });
    }
    let n = b.len().max(a.len());
    let a0 = a[0];
    let mut bn = alloc::vec![F::zero(); n];
    let mut an = alloc::vec![F::zero(); n];
    for (dst, src) in bn.iter_mut().zip(b.iter()) {
        *dst = *src / a0;
    }
    for (dst, src) in an.iter_mut().zip(a.iter()) {
        *dst = *src / a0;
    }
    Ok((bn, an))
}

impl<F> StreamLifecycle for IirFilter<F>
where
    F: Float,
{
    type Config = IirFilterConfig<F>;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        let (b, a) = normalize_ba(&config.b, &config.a)?;
        let ic_len = b.len() - 1;
        self.state = Some(IirState {
            b,
            a,
            zi: alloc::vec![F::zero(); ic_len],
            dly: alloc::vec![F::zero(); ic_len],
            mode: config.mode,
            implementation: config.implementation,
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

impl<F> StreamFilter1D<F> for IirFilter<F>
where
    F: Float,
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

        match state.mode {
            ProcessingMode::PostProcessing => {
                let mut scratch = state.dly.clone();
                match state.implementation {
                    IirImplementation::Df2Transposed => {
                        df2t_run(&state.b, &state.a, &mut scratch, x, y)
                    }
                    IirImplementation::Df2Fast => df2_run(&state.b, &state.a, &mut scratch, x, y),
                }
            }
            ProcessingMode::RealTime => {
                let IirState {
                    b,
                    a,
                    dly,
                    implementation,
                    ..
                } = state;
                match implementation {
                    IirImplementation::Df2Transposed => df2t_run(b, a, dly, x, y),
                    IirImplementation::Df2Fast => df2_run(b, a, dly, x, y),
                }
            }
        }
        Ok(x.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_pole(mode: ProcessingMode, implementation: IirImplementation) -> IirFilter<f64> {
        let mut f = IirFilter::new();
        f.initialize(IirFilterConfig {
            b: vec![1.0],
            a: vec![1.0, -0.5],
            mode,
            implementation,
        })
        .expect("valid config");
        f
    }

    #[test]
    fn one_pole_impulse_response() {
        let mut f = one_pole(ProcessingMode::PostProcessing, IirImplementation::Df2Transposed);
        let x = [1.0, 0.0, 0.0, 0.0];
        let mut y = [0.0; 4];
        f.apply(&x, &mut y).expect("apply");
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(y[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(y[2], 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(y[3], 0.125, epsilon = 1e-15);
    }

    #[test]
    fn normalizes_by_leading_denominator() {
        let mut f = IirFilter::new();
        f.initialize(IirFilterConfig {
            b: vec![2.0],
            a: vec![2.0, -1.0],
            mode: ProcessingMode::PostProcessing,
            implementation: IirImplementation::Df2Transposed,
        })
        .expect("valid config");
        let mut y = [0.0; 2];
        f.apply(&[1.0, 0.0], &mut y).expect("apply");
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(y[1], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn realizations_agree_on_identical_input() {
        let b = vec![0.2, 0.3, 0.1];
        let a = vec![1.0, -0.4, 0.2];
        let x: Vec<f64> = (0..256).map(|i| ((i * 13) % 17) as f64 - 8.0).collect();

        let mut yt = vec![0.0; x.len()];
        let mut yf = vec![0.0; x.len()];
        let mut ft = IirFilter::new();
        ft.initialize(IirFilterConfig {
            b: b.clone(),
            a: a.clone(),
            mode: ProcessingMode::PostProcessing,
            implementation: IirImplementation::Df2Transposed,
        })
        .expect("valid config");
        ft.apply(&x, &mut yt).expect("apply");

        let mut ff = IirFilter::new();
        ff.initialize(IirFilterConfig {
            b,
            a,
            mode: ProcessingMode::PostProcessing,
            implementation: IirImplementation::Df2Fast,
        })
        .expect("valid config");
        ff.apply(&x, &mut yf).expect("apply");

        for (t, f) in yt.iter().zip(yf.iter()) {
            assert_abs_diff_eq!(t, f, epsilon = 1e-10);
        }
    }

    #[test]
    fn real_time_packets_concatenate() {
        let b = vec![0.2, 0.3, 0.1];
        let a = vec![1.0, -0.4, 0.2];
        let x: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin()).collect();

        let mut reference = vec![0.0; x.len()];
        let mut post = IirFilter::new();
        post.initialize(IirFilterConfig {
            b: b.clone(),
            a: a.clone(),
            mode: ProcessingMode::PostProcessing,
            implementation: IirImplementation::Df2Transposed,
        })
        .expect("valid config");
        post.apply(&x, &mut reference).expect("apply");

        let mut rt = IirFilter::new();
        rt.initialize(IirFilterConfig {
            b,
            a,
            mode: ProcessingMode::RealTime,
            implementation: IirImplementation::Df2Transposed,
        })
        .expect("valid config");
        let mut streamed = vec![0.0; x.len()];
        for (cx, cy) in x.chunks(7).zip(streamed.chunks_mut(7)) {
            rt.apply(cx, cy).expect("apply");
        }
        for (s, r) in streamed.iter().zip(reference.iter()) {
            assert_abs_diff_eq!(s, r, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_zero_leading_denominator() {
        let mut f = IirFilter::<f64>::new();
        let err = f
            .initialize(IirFilterConfig {
                b: vec![1.0],
                a: vec![0.0, 1.0],
                mode: ProcessingMode::PostProcessing,
                implementation: IirImplementation::Df2Transposed,
            })
            .expect_err("invalid a[0]");
        assert!(matches!(err, ConfigError::InvalidArgument { arg: "a", .. }));
        assert!(!f.is_initialized());
    }
}
