//! Phase-aware downsampler.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::traits::StreamFilter1D;
use num_traits::Float;
use rtsig_core::{Error, Result};

const MODULE: &str = "Downsample";

/// Configuration for [`Downsample::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownsampleConfig {
    /// Decimation factor; every `factor`-th sample is kept.
    pub factor: usize,
    /// Phase persistence mode.
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone, Copy)]
struct DownsampleState {
    factor: usize,
    phase: usize,
    initial_phase: usize,
    mode: ProcessingMode,
}

/// Keeps every q-th sample with a starting phase.
///
/// In real-time mode the phase advances by the packet length modulo q, so
/// concatenated packets pick exactly the samples the block run picks. In
/// post-processing mode every call restarts at phase 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Downsample {
    state: Option<DownsampleState>,
}

impl Downsample {
    /// Create an uninitialized downsampler.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// The decimation factor.
    pub fn downsampling_factor(&self) -> Result<usize> {
        Ok(self.state()?.factor)
    }

    /// The phase the next packet will start from.
    pub fn phase(&self) -> Result<usize> {
        Ok(self.state()?.phase)
    }

    /// Stamp the starting phase, `0 <= phase < factor`. Real-time only
    /// bookkeeping; post-processing calls always start at phase 0.
    pub fn set_initial_phase(&mut self, phase: usize) -> Result<()> {
        let state = self.state_mut()?;
        if phase >= state.factor {
            return Err(ConfigError::InvalidArgument {
                arg: "phase",
                reason: "phase must be less than the decimation factor",
            }
            .into());
        }
        state.initial_phase = phase;
        state.phase = phase;
        Ok(())
    }

    /// Output samples produced for an input of length `n` at the current
    /// phase.
    pub fn estimate_space(&self, n: usize) -> Result<usize> {
        let state = self.state()?;
        let phase = match state.mode {
            ProcessingMode::PostProcessing => 0,
            ProcessingMode::RealTime => state.phase,
        };
        Ok((n + state.factor - 1 - phase) / state.factor)
    }

    fn state(&self) -> Result<&DownsampleState> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut DownsampleState> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }
}

impl StreamLifecycle for Downsample {
    type Config = DownsampleConfig;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.factor < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "factor",
                reason: "decimation factor must be positive",
            });
        }
        self.state = Some(DownsampleState {
            factor: config.factor,
            phase: 0,
            initial_phase: 0,
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

impl<F> StreamFilter1D<F> for Downsample
where
    F: Float,
{
    fn initial_condition_length(&self) -> Result<usize> {
        self.state()?;
        Ok(0)
    }

    fn set_initial_conditions(&mut self, zi: &[F]) -> Result<()> {
        self.state()?;
        if !zi.is_empty() {
            return Err(ConfigError::LengthMismatch {
                arg: "zi",
                expected: 0,
                got: zi.len(),
            }
            .into());
        }
        Ok(())
    }

    fn reset_initial_conditions(&mut self) -> Result<()> {
        let state = self.state_mut()?;
        state.phase = state.initial_phase;
        Ok(())
    }

    fn apply(&mut self, x: &[F], y: &mut [F]) -> Result<usize> {
        if x.is_empty() {
            return Ok(0);
        }
        let state = self.state_mut()?;
        let q = state.factor;
        let phase = match state.mode {
            ProcessingMode::PostProcessing => 0,
            ProcessingMode::RealTime => state.phase,
        };
        let needed = (x.len() + q - 1 - phase) / q;
        if y.len() < needed {
            return Err(ConfigError::LengthMismatch {
                arg: "y",
                expected: needed,
                got: y.len(),
            }
            .into());
        }

        let mut count = 0usize;
        for (i, v) in x.iter().enumerate() {
            if (i + phase) % q == 0 {
                y[count] = *v;
                count += 1;
            }
        }

        if state.mode == ProcessingMode::RealTime {
            state.phase = (phase + x.len()) % q;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(factor: usize, mode: ProcessingMode) -> Downsample {
        let mut d = Downsample::new();
        d.initialize(DownsampleConfig { factor, mode })
            .expect("valid config");
        d
    }

    #[test]
    fn post_processing_keeps_every_qth_sample() {
        let x: Vec<f64> = (0..23).map(|i| i as f64).collect();
        for q in 1..8 {
            let mut d = init(q, ProcessingMode::PostProcessing);
            let mut y = vec![0.0; x.len()];
            let n = d.apply(&x, &mut y).expect("apply");
            let expected: Vec<f64> = x.iter().copied().step_by(q).collect();
            assert_eq!(n, expected.len());
            assert_eq!(&y[..n], expected.as_slice());
        }
    }

    #[test]
    fn real_time_phase_carries_across_packets() {
        let x: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let q = 3;
        let mut reference = vec![0.0; x.len()];
        let mut post = init(q, ProcessingMode::PostProcessing);
        let n_ref = post.apply(&x, &mut reference).expect("apply");

        for chunk in [1usize, 2, 4, 7, 13] {
            let mut rt = init(q, ProcessingMode::RealTime);
            let mut streamed = Vec::new();
            for cx in x.chunks(chunk) {
                let mut buf = vec![0.0; cx.len()];
                let n = rt.apply(cx, &mut buf).expect("apply");
                streamed.extend_from_slice(&buf[..n]);
            }
            assert_eq!(streamed.len(), n_ref);
            assert_eq!(streamed.as_slice(), &reference[..n_ref]);
        }
    }

    #[test]
    fn output_length_formula() {
        let mut d = init(3, ProcessingMode::RealTime);
        assert_eq!(d.estimate_space(4).expect("estimate"), 2);
        let mut y = [0.0; 4];
        let n = d.apply(&[0.0, 1.0, 2.0, 3.0], &mut y).expect("apply");
        assert_eq!(n, 2);
        assert_eq!(d.phase().expect("phase"), 1);
        // Next packet keeps only the sample falling on the global grid.
        assert_eq!(d.estimate_space(4).expect("estimate"), 1);
        let n = d.apply(&[4.0, 5.0, 6.0, 7.0], &mut y).expect("apply");
        assert_eq!(n, 1);
        assert_eq!(y[0], 6.0);
    }

    #[test]
    fn reset_returns_to_the_stamped_phase() {
        let mut d = init(4, ProcessingMode::RealTime);
        d.set_initial_phase(2).expect("set phase");
        let mut y = [0.0; 4];
        let n = d
            .apply(&[0.0f64, 1.0, 2.0, 3.0], &mut y)
            .expect("apply");
        assert_eq!(n, 1);
        assert_eq!(y[0], 2.0);
        StreamFilter1D::<f64>::reset_initial_conditions(&mut d).expect("reset");
        let n = d
            .apply(&[0.0f64, 1.0, 2.0, 3.0], &mut y)
            .expect("apply");
        assert_eq!(n, 1);
        assert_eq!(y[0], 2.0);
    }

    #[test]
    fn validates_factor_and_phase() {
        let mut d = Downsample::new();
        assert!(d
            .initialize(DownsampleConfig {
                factor: 0,
                mode: ProcessingMode::PostProcessing,
            })
            .is_err());
        let mut d = init(3, ProcessingMode::RealTime);
        assert!(d.set_initial_phase(3).is_err());
        assert!(StreamFilter1D::<f64>::set_initial_conditions(&mut d, &[1.0]).is_err());
    }
}
