//! Sliding-window median streaming filter.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::traits::StreamFilter1D;
use alloc::vec::Vec;
use num_traits::Float;
use rtsig_core::num_rs::sorted_window_median;
use rtsig_core::{Error, Result};

use super::check_output_len;

const MODULE: &str = "MedianFilter";

/// Configuration for [`MedianFilter::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianFilterConfig {
    /// Window length. Must be odd; an even request is promoted by one with
    /// a warning.
    pub window: usize,
    /// Delay-line persistence mode.
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone)]
struct MedianState<F> {
    window: usize,
    zi: Vec<F>,
    dly: Vec<F>,
    mode: ProcessingMode,
}

/// Causal sliding-window median with `window - 1` delay-line samples and a
/// group delay of `window / 2`.
///
/// `y[n]` is the middle element of the sorted window ending at `x[n]`, so
/// the first `window - 1` outputs of a fresh stream mix in the initial
/// conditions.
#[derive(Debug, Clone, Default)]
pub struct MedianFilter<F>
where
    F: Float,
{
    state: Option<MedianState<F>>,
}

impl<F> MedianFilter<F>
where
    F: Float,
{
    /// Create an uninitialized filter.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Group delay of the filter, `window / 2` samples.
    pub fn group_delay(&self) -> Result<usize> {
        Ok(self.state()?.window / 2)
    }

    fn state(&self) -> Result<&MedianState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut MedianState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }
}

impl<F> StreamLifecycle for MedianFilter<F>
where
    F: Float,
{
    type Config = MedianFilterConfig;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.window < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "window",
                reason: "window length must be positive",
            });
        }
        let mut window = config.window;
        if window % 2 == 0 {
            window += 1;
            log::warn!(
                "median window {} should be odd; promoting to {window}",
                config.window
            );
        }
        let ic_len = window - 1;
        self.state = Some(MedianState {
            window,
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

impl<F> StreamFilter1D<F> for MedianFilter<F>
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

        let m = x.len();
        let w = state.window;
        let ic_len = w - 1;

        let mut work = Vec::with_capacity(ic_len + m);
        work.extend_from_slice(&state.dly);
        work.extend_from_slice(x);

        let mut scratch = alloc::vec![F::zero(); w];
        for (i, yi) in y.iter_mut().enumerate().take(m) {
            scratch.copy_from_slice(&work[i..i + w]);
            *yi = sorted_window_median(&mut scratch);
        }

        if state.mode == ProcessingMode::RealTime && ic_len > 0 {
            state.dly.copy_from_slice(&work[m..]);
        }
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn init(window: usize, mode: ProcessingMode) -> MedianFilter<f64> {
        let mut f = MedianFilter::new();
        f.initialize(MedianFilterConfig { window, mode })
            .expect("valid config");
        f
    }

    #[test]
    fn window_three_reference() {
        let mut f = init(3, ProcessingMode::PostProcessing);
        let x = [1.0, 2.0, 127.0, 4.0, 5.0, 0.0, 7.0, 8.0];
        let reference = [1.0, 2.0, 4.0, 5.0, 4.0, 5.0, 7.0, 7.0];
        let mut y = [0.0; 8];
        f.apply(&x, &mut y).expect("apply");
        // The causal output trails the centered reference by the group
        // delay of one sample.
        for i in 1..7 {
            assert_abs_diff_eq!(y[i + 1], reference[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn window_five_reference() {
        let mut f = init(5, ProcessingMode::PostProcessing);
        let x = [1.0, 2.0, 127.0, 4.0, 5.0, 0.0, 7.0, 8.0];
        let reference = [1.0, 2.0, 4.0, 4.0, 5.0, 5.0, 5.0, 0.0];
        let mut y = [0.0; 8];
        f.apply(&x, &mut y).expect("apply");
        for i in 2..6 {
            assert_abs_diff_eq!(y[i + 2], reference[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn even_window_is_promoted_with_group_delay() {
        let f = init(4, ProcessingMode::PostProcessing);
        assert_eq!(f.initial_condition_length().expect("length"), 4);
        assert_eq!(f.group_delay().expect("delay"), 2);
    }

    #[test]
    fn real_time_packets_concatenate() {
        let x: Vec<f64> = (0..300)
            .map(|i| ((i * 31) % 23) as f64 - 11.0)
            .collect();

        let mut post = init(11, ProcessingMode::PostProcessing);
        let mut reference = vec![0.0; x.len()];
        post.apply(&x, &mut reference).expect("apply");

        let mut rt = init(11, ProcessingMode::RealTime);
        let mut streamed = vec![0.0; x.len()];
        for (cx, cy) in x.chunks(17).zip(streamed.chunks_mut(17)) {
            rt.apply(cx, cy).expect("apply");
        }
        for (s, r) in streamed.iter().zip(reference.iter()) {
            assert_abs_diff_eq!(s, r, epsilon = 1e-14);
        }
    }

    #[test]
    fn reset_restores_fresh_output() {
        let x: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();
        let mut f = init(5, ProcessingMode::RealTime);
        let mut y1 = vec![0.0; x.len()];
        f.apply(&x, &mut y1).expect("apply");
        f.reset_initial_conditions().expect("reset");
        let mut y2 = vec![0.0; x.len()];
        f.apply(&x, &mut y2).expect("apply");
        assert_eq!(y1, y2);
    }

    #[test]
    fn rejects_zero_window_and_uninitialized_use() {
        let mut f = MedianFilter::<f64>::new();
        assert!(f
            .initialize(MedianFilterConfig {
                window: 0,
                mode: ProcessingMode::PostProcessing,
            })
            .is_err());
        assert!(!f.is_initialized());
        assert!(f.group_delay().is_err());
    }
}
