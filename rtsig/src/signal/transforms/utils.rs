//! DFT utilities.

use crate::kernel::ConfigError;
use alloc::vec::Vec;
use nalgebra::Complex;
use num_traits::Float;
use rtsig_core::{Error, Result};

/// Phase angle of each element, `atan2(im, re)`, optionally in degrees.
pub fn phase<F>(z: &[Complex<F>], degrees: bool) -> Vec<F>
where
    F: Float,
{
    let factor = if degrees {
        F::from(180.0).unwrap() / F::from(core::f64::consts::PI).unwrap()
    } else {
        F::one()
    };
    z.iter().map(|v| v.im.atan2(v.re) * factor).collect()
}

fn rem<F: Float>(x: F, y: F) -> F {
    x - y * (x / y).trunc()
}

/// Remove phase jumps larger than `tol` (default pi) by accumulating
/// +-2 pi corrections. The first sample anchors the result.
pub fn unwrap<F>(p: &[F], tol: Option<F>) -> Result<Vec<F>>
where
    F: Float,
{
    if p.is_empty() {
        return Ok(Vec::new());
    }
    let pi = F::from(core::f64::consts::PI).unwrap();
    let tol = tol.unwrap_or(pi);
    if tol < F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg: "tol",
            reason: "tolerance cannot be negative",
        }
        .into());
    }
    let two_pi = pi + pi;

    let pmin = p.iter().copied().fold(F::infinity(), F::min);
    let mut q: Vec<F> = p.iter().map(|v| rem(*v - pmin, two_pi) + pmin).collect();

    // Differentiate, locate the jumps, and integrate the corrections.
    let mut cumsum = F::zero();
    let mut prev = q[0];
    for (i, v) in q.iter_mut().enumerate() {
        let diff = if i == 0 { *v } else { *v - prev };
        prev = *v;
        let mut step = F::zero();
        if diff > tol {
            step = step - two_pi;
        }
        if diff < -tol {
            step = step + two_pi;
        }
        cumsum = cumsum + step;
        *v = *v + cumsum;
    }
    Ok(q)
}

/// Smallest power of two greater than or equal to `n`.
pub fn next_power_of_two(n: usize) -> Result<usize> {
    if n == 0 {
        return Ok(1);
    }
    n.checked_next_power_of_two()
        .ok_or_else(|| Error::RuntimeFailure {
            reason: "next power of two overflows".into(),
        })
}

/// Rotate the spectrum so index 0 maps to the middle, `floor(n/2)`.
pub fn fft_shift<T>(x: &[T]) -> Vec<T>
where
    T: Copy,
{
    let n = x.len();
    if n <= 1 {
        return x.to_vec();
    }
    let split = if n % 2 == 0 { n / 2 } else { n / 2 + 1 };
    let mut y = Vec::with_capacity(n);
    y.extend_from_slice(&x[split..]);
    y.extend_from_slice(&x[..split]);
    y
}

/// One-sided DFT bin frequencies `k / (n dt)` for `k` in `0..=n/2`.
pub fn r2c_dft_frequencies<F>(n: usize, dt: F) -> Result<Vec<F>>
where
    F: Float,
{
    if n < 1 {
        return Err(ConfigError::InvalidArgument {
            arg: "n",
            reason: "sample count must be positive",
        }
        .into());
    }
    if dt <= F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg: "dt",
            reason: "sampling period must be positive",
        }
        .into());
    }
    let nbins = n / 2 + 1;
    if nbins == 1 {
        return Ok(alloc::vec![F::zero()]);
    }
    let df = F::one() / (F::from(n).unwrap() * dt);
    Ok((0..nbins).map(|k| df * F::from(k).unwrap()).collect())
}
