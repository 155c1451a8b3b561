//! Sampling-period bookkeeping and normalized-frequency conversion.
//!
//! The design functions take cutoffs normalized so 1 is the Nyquist
//! frequency; acquisition code works in Hz. This is the glue between the
//! two.

use crate::kernel::ConfigError;
use num_traits::Float;

/// A positive sampling period in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPeriod<F>
where
    F: Float,
{
    dt: F,
}

impl<F> SamplingPeriod<F>
where
    F: Float,
{
    /// Wrap a sampling period, which must be greater than zero.
    pub fn new(dt: F) -> Result<Self, ConfigError> {
        if dt <= F::zero() {
            return Err(ConfigError::InvalidArgument {
                arg: "dt",
                reason: "sampling period must be greater than zero",
            });
        }
        Ok(Self { dt })
    }

    /// The sampling period in seconds.
    pub fn period(&self) -> F {
        self.dt
    }

    /// The sampling rate in Hz.
    pub fn rate(&self) -> F {
        F::one() / self.dt
    }

    /// The Nyquist frequency `1 / (2 dt)` in Hz.
    pub fn nyquist(&self) -> F {
        F::one() / (F::from(2.0).unwrap() * self.dt)
    }

    /// Normalize a cutoff in Hz to the (0, 1) design range where 1 is
    /// Nyquist.
    pub fn normalized_cutoff(&self, f_hz: F) -> Result<F, ConfigError> {
        let r = f_hz / self.nyquist();
        if r <= F::zero() || r >= F::one() {
            return Err(ConfigError::InvalidArgument {
                arg: "f_hz",
                reason: "cutoff must lie strictly between 0 and the Nyquist frequency",
            });
        }
        Ok(r)
    }

    /// Normalize a band `(f1, f2)` in Hz, enforcing `0 < r1 < r2 < 1`.
    pub fn normalized_band(&self, f1_hz: F, f2_hz: F) -> Result<(F, F), ConfigError> {
        let r1 = self.normalized_cutoff(f1_hz)?;
        let r2 = self.normalized_cutoff(f2_hz)?;
        if r1 >= r2 {
            return Err(ConfigError::InvalidArgument {
                arg: "f_hz",
                reason: "band edges must be strictly increasing",
            });
        }
        Ok((r1, r2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn nyquist_and_normalization() {
        let fs = SamplingPeriod::new(1.0 / 200.0f64).expect("valid dt");
        assert_abs_diff_eq!(fs.nyquist(), 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fs.rate(), 200.0, epsilon = 1e-12);
        let r = fs.normalized_cutoff(10.0).expect("valid cutoff");
        assert_abs_diff_eq!(r, 0.1, epsilon = 1e-12);
        let (r1, r2) = fs.normalized_band(1.0, 10.0).expect("valid band");
        assert_abs_diff_eq!(r1, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(r2, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert!(SamplingPeriod::new(0.0f64).is_err());
        let fs = SamplingPeriod::new(0.01f64).expect("valid dt");
        assert!(fs.normalized_cutoff(0.0).is_err());
        assert!(fs.normalized_cutoff(50.0).is_err());
        assert!(fs.normalized_band(10.0, 5.0).is_err());
    }
}
