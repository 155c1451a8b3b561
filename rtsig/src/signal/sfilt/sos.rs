//! Cascaded second-order-section streaming filter.

use crate::kernel::{ConfigError, ProcessingMode, StreamLifecycle};
use crate::signal::filter::design::Sos;
use crate::signal::traits::StreamFilter1D;
use alloc::vec::Vec;
use nalgebra::RealField;
use num_traits::Float;
use rtsig_core::{Error, Result};

use super::check_output_len;

const MODULE: &str = "SosFilter";

/// Configuration for [`SosFilter::initialize`].
#[derive(Debug, Clone)]
pub struct SosFilterConfig<F>
where
    F: RealField + Copy,
{
    /// Sections, applied first to last. Leading coefficients must be
    /// non-zero; each section is normalized by its `a[0]`.
    pub sos: Vec<Sos<F>>,
    /// Delay-line persistence mode.
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone)]
struct SosState<F>
where
    F: RealField + Copy,
{
    sections: Vec<Sos<F>>,
    zi: Vec<F>,
    mode: ProcessingMode,
}

/// Streaming SOS cascade. Each section runs transposed direct form II and
/// holds two delay states, so the initial-condition length is `2 ns`.
#[derive(Debug, Clone, Default)]
pub struct SosFilter<F>
where
    F: RealField + Copy,
{
    state: Option<SosState<F>>,
}

fn run_sections<F>(sections: &mut [Sos<F>], x: &[F], y: &mut [F])
where
    F: RealField + Float + Copy,
{
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        let mut v = *xi;
        for s in sections.iter_mut() {
            let out = s.b[0] * v + s.zi0;
            s.zi0 = s.b[1] * v + s.zi1 - s.a[1] * out;
            s.zi1 = s.b[2] * v - s.a[2] * out;
            v = out;
        }
        *yi = v;
    }
}

impl<F> SosFilter<F>
where
    F: RealField + Float + Copy,
{
    /// Create an uninitialized filter.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Number of sections.
    pub fn sections_len(&self) -> Result<usize> {
        Ok(self.state()?.sections.len())
    }

    fn state(&self) -> Result<&SosState<F>> {
        self.state
            .as_ref()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn state_mut(&mut self) -> Result<&mut SosState<F>> {
        self.state
            .as_mut()
            .ok_or(Error::NotInitialized { module: MODULE })
    }

    fn load_states(sections: &mut [Sos<F>], zi: &[F]) {
        for (i, s) in sections.iter_mut().enumerate() {
            s.zi0 = zi[2 * i];
            s.zi1 = zi[2 * i + 1];
        }
    }
}

impl<F> StreamLifecycle for SosFilter<F>
where
    F: RealField + Float + Copy,
{
    type Config = SosFilterConfig<F>;

    fn initialize(&mut self, config: Self::Config) -> core::result::Result<(), ConfigError> {
        self.clear();
        if config.sos.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "sos" });
        }
        let mut sections = config.sos;
        for s in sections.iter_mut() {
            if s.b[0] == F::zero() {
                return Err(ConfigError::InvalidArgument {
                    arg: "sos",
                    reason: "leading numerator coefficient of a section is zero",
                });
            }
            if s.a[0] == F::zero() {
                return Err(ConfigError::InvalidArgument {
                    arg: "sos",
                    reason: "leading denominator coefficient of a section is zero",
                });
            }
            let a0 = s.a[0];
            for c in s.b.iter_mut() {
                *c = *c / a0;
            }
            for c in s.a.iter_mut() {
                *c = *c / a0;
            }
            s.zi0 = F::zero();
            s.zi1 = F::zero();
        }
        let ic_len = 2 * sections.len();
        self.state = Some(SosState {
            sections,
            zi: alloc::vec![F::zero(); ic_len],
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

impl<F> StreamFilter1D<F> for SosFilter<F>
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
        let zi = state.zi.clone();
        Self::load_states(&mut state.sections, &zi);
        Ok(())
    }

    fn reset_initial_conditions(&mut self) -> Result<()> {
        let state = self.state_mut()?;
        let zi = state.zi.clone();
        Self::load_states(&mut state.sections, &zi);
        Ok(())
    }

    fn apply(&mut self, x: &[F], y: &mut [F]) -> Result<usize> {
        if x.is_empty() {
            return Ok(0);
        }
        let state = self.state_mut()?;
        check_output_len(x.len(), y.len())?;

        if state.mode == ProcessingMode::PostProcessing {
            let zi = state.zi.clone();
            Self::load_states(&mut state.sections, &zi);
        }
        run_sections(&mut state.sections, x, y);
        Ok(x.len())
    }
}
