//! Analog lowpass prototypes with cutoff 1 rad/s.

use crate::kernel::{ConfigError, ExecInvariantViolation};
use crate::linalg::polynomial_roots;
use alloc::vec::Vec;
use nalgebra::{Complex, RealField};
use num_traits::Float;

use super::ZpkFormatFilter;

fn check_order(n: usize) -> Result<(), ConfigError> {
    if n < 1 {
        return Err(ConfigError::InvalidArgument {
            arg: "order",
            reason: "order must be greater than zero",
        });
    }
    Ok(())
}

/// Butterworth analog lowpass prototype of order `n`.
///
/// Poles sit on the unit circle in the left half plane, no zeros, unit gain.
pub fn butterap<F>(n: usize) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_order(n)?;
    let pi = F::pi();
    let nf = F::from(n).unwrap();
    let two = F::from(2.0).unwrap();
    let p = (1..=n)
        .map(|k| {
            let theta = pi * (two * F::from(k).unwrap() + nf - F::one()) / (two * nf);
            Complex::new(Float::cos(theta), Float::sin(theta))
        })
        .collect();
    Ok(ZpkFormatFilter::new(Vec::new(), p, F::one()))
}

/// Chebyshev type I analog lowpass prototype with `rp` dB of passband
/// ripple.
pub fn cheb1ap<F>(n: usize, rp: F) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_order(n)?;
    if rp <= F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg: "rp",
            reason: "passband ripple must be positive",
        });
    }
    let pi = F::pi();
    let nf = F::from(n).unwrap();
    let two = F::from(2.0).unwrap();
    let ten = F::from(10.0).unwrap();

    let eps = Float::sqrt(Float::powf(ten, rp / ten) - F::one());
    let mu = Float::asinh(F::one() / eps) / nf;

    let p: Vec<Complex<F>> = (1..=n)
        .map(|k| {
            let theta = pi * (two * F::from(k).unwrap() - F::one()) / (two * nf);
            Complex::new(
                -Float::sinh(mu) * Float::sin(theta),
                Float::cosh(mu) * Float::cos(theta),
            )
        })
        .collect();

    let mut k = p
        .iter()
        .fold(Complex::new(F::one(), F::zero()), |acc, pi| acc * -*pi)
        .re;
    if n % 2 == 0 {
        k = k / Float::sqrt(F::one() + eps * eps);
    }
    Ok(ZpkFormatFilter::new(Vec::new(), p, k))
}

/// Chebyshev type II (inverse Chebyshev) analog lowpass prototype with `rs`
/// dB of stopband ripple.
pub fn cheb2ap<F>(n: usize, rs: F) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_order(n)?;
    if rs <= F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg: "rs",
            reason: "stopband ripple must be positive",
        });
    }
    let pi = F::pi();
    let nf = F::from(n).unwrap();
    let two = F::from(2.0).unwrap();
    let ten = F::from(10.0).unwrap();

    let de = F::one() / Float::sqrt(Float::powf(ten, rs / ten) - F::one());
    let mu = Float::asinh(F::one() / de) / nf;

    // Zeros on the imaginary axis; the middle index is dropped for odd
    // orders so the zero count stays even.
    let m_indices: Vec<i64> = if n % 2 == 1 {
        let ni = n as i64;
        (-ni + 1..0)
            .step_by(2)
            .chain((2..ni).step_by(2))
            .collect()
    } else {
        let ni = n as i64;
        (-ni + 1..ni).step_by(2).collect()
    };
    let z: Vec<Complex<F>> = m_indices
        .iter()
        .map(|&m| {
            let s = Float::sin(F::from(m).unwrap() * pi / (two * nf));
            Complex::new(F::zero(), F::one() / s)
        })
        .collect();

    let ni = n as i64;
    let p: Vec<Complex<F>> = (-ni + 1..ni)
        .step_by(2)
        .map(|m| {
            let theta = pi * F::from(m).unwrap() / (two * nf);
            let base = Complex::new(-Float::cos(theta), -Float::sin(theta));
            let stretched = Complex::new(
                Float::sinh(mu) * base.re,
                Float::cosh(mu) * base.im,
            );
            Complex::new(F::one(), F::zero()) / stretched
        })
        .collect();

    let num = p
        .iter()
        .fold(Complex::new(F::one(), F::zero()), |acc, pi| acc * -*pi);
    let den = z
        .iter()
        .fold(Complex::new(F::one(), F::zero()), |acc, zi| acc * -*zi);
    let k = (num / den).re;
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Bessel-Thomson analog lowpass prototype of order `n`.
///
/// Poles are the roots of the reverse Bessel polynomial, scaled so the
/// geometric mean of the pole magnitudes is one; gain gives unit DC
/// response.
pub fn besselap<F>(n: usize) -> Result<ZpkFormatFilter<F>, ExecInvariantViolation>
where
    F: RealField + Float + Copy,
{
    check_order(n)?;

    // Reverse Bessel polynomial coefficients, descending powers:
    // a_k = (2n - k)! / (2^(n - k) k! (n - k)!) for the s^k term.
    let factorial = |m: usize| -> F {
        let mut acc = F::one();
        for i in 2..=m {
            acc = acc * F::from(i).unwrap();
        }
        acc
    };
    let two = F::from(2.0).unwrap();
    let coeffs: Vec<F> = (0..=n)
        .map(|i| {
            let k = n - i;
            factorial(2 * n - k)
                / (Float::powi(two, (n - k) as i32) * factorial(k) * factorial(n - k))
        })
        .collect();

    let mut p = polynomial_roots(&coeffs)?;
    if p.len() != n {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "reverse Bessel root finding failed to converge",
        });
    }

    let nf = F::from(n).unwrap();
    let log_scale = p
        .iter()
        .map(|pi| Float::ln(pi.norm()))
        .fold(F::zero(), |a, b| a + b)
        / nf;
    let scale = Float::exp(log_scale);
    for pi in p.iter_mut() {
        *pi = Complex::new(pi.re / scale, pi.im / scale);
    }

    let k = p
        .iter()
        .fold(Complex::new(F::one(), F::zero()), |acc, pi| acc * -*pi)
        .re;
    Ok(ZpkFormatFilter::new(Vec::new(), p, k))
}
