//! ZPK-domain transforms: band substitutions, the bilinear transform, and
//! conversion to transfer-function coefficients.

use crate::kernel::ConfigError;
use crate::linalg::{poly_from_roots, polymul};
use alloc::vec::Vec;
use nalgebra::{Complex, RealField};
use num_traits::Float;

use super::{BaFormatFilter, ZpkFormatFilter};

/// Relative degree `len(p) - len(z)` of a proper transfer function.
pub fn relative_degree<F>(
    z: &[Complex<F>],
    p: &[Complex<F>],
) -> Result<usize, ConfigError>
where
    F: RealField + Copy,
{
    if p.len() < z.len() {
        return Err(ConfigError::InvalidArgument {
            arg: "zpk",
            reason: "improper transfer function; poles must be >= zeros",
        });
    }
    Ok(p.len() - z.len())
}

fn check_positive<F: Float>(value: F, arg: &'static str) -> Result<(), ConfigError> {
    if value <= F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "must be greater than zero",
        });
    }
    Ok(())
}

/// Transform a lowpass prototype to a lowpass filter with cutoff `wo`
/// (rad/s) via `s -> s / wo`.
pub fn lp2lp_zpk<F>(zpk: ZpkFormatFilter<F>, wo: F) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_positive(wo, "wo")?;
    let degree = relative_degree(&zpk.z, &zpk.p)?;
    let scale = Complex::new(wo, F::zero());
    let z = zpk.z.iter().map(|zi| zi * scale).collect();
    let p = zpk.p.iter().map(|pi| pi * scale).collect();
    let k = zpk.k * Float::powi(wo, degree as i32);
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Transform a lowpass prototype to a highpass filter with cutoff `wo`
/// (rad/s) via `s -> wo / s`.
pub fn lp2hp_zpk<F>(zpk: ZpkFormatFilter<F>, wo: F) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_positive(wo, "wo")?;
    let degree = relative_degree(&zpk.z, &zpk.p)?;
    let wo_c = Complex::new(wo, F::zero());
    let one = Complex::new(F::one(), F::zero());

    let mut z: Vec<Complex<F>> = zpk.z.iter().map(|zi| wo_c / zi).collect();
    let p: Vec<Complex<F>> = zpk.p.iter().map(|pi| wo_c / pi).collect();

    // k * real(prod(-z) / prod(-p))
    let num = zpk
        .z
        .iter()
        .fold(one, |acc, zi| acc * -*zi);
    let den = zpk
        .p
        .iter()
        .fold(one, |acc, pi| acc * -*pi);
    let k = zpk.k * (num / den).re;

    // Degree zeros move from infinity to the origin.
    z.extend(core::iter::repeat(Complex::new(F::zero(), F::zero())).take(degree));
    Ok(ZpkFormatFilter::new(z, p, k))
}

fn quadratic_split<F>(root: Complex<F>, wo2: F) -> (Complex<F>, Complex<F>)
where
    F: RealField + Float + Copy,
{
    let disc = (root * root - Complex::new(wo2, F::zero())).sqrt();
    (root + disc, root - disc)
}

/// Transform a lowpass prototype to a bandpass filter with center `wo` and
/// bandwidth `bw` via `s -> (s^2 + wo^2) / (bw s)`. Each root doubles.
pub fn lp2bp_zpk<F>(
    zpk: ZpkFormatFilter<F>,
    wo: F,
    bw: F,
) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_positive(wo, "wo")?;
    check_positive(bw, "bw")?;
    let degree = relative_degree(&zpk.z, &zpk.p)?;
    let half_bw = bw / F::from(2.0).unwrap();
    let wo2 = wo * wo;
    let scale = Complex::new(half_bw, F::zero());

    let mut z = Vec::with_capacity(2 * zpk.z.len() + degree);
    for zi in &zpk.z {
        let (a, b) = quadratic_split(zi * scale, wo2);
        z.push(a);
        z.push(b);
    }
    let mut p = Vec::with_capacity(2 * zpk.p.len());
    for pi in &zpk.p {
        let (a, b) = quadratic_split(pi * scale, wo2);
        p.push(a);
        p.push(b);
    }
    z.extend(core::iter::repeat(Complex::new(F::zero(), F::zero())).take(degree));

    let k = zpk.k * Float::powi(bw, degree as i32);
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Transform a lowpass prototype to a bandstop filter with center `wo` and
/// bandwidth `bw` via `s -> bw s / (s^2 + wo^2)`. Each root doubles.
pub fn lp2bs_zpk<F>(
    zpk: ZpkFormatFilter<F>,
    wo: F,
    bw: F,
) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_positive(wo, "wo")?;
    check_positive(bw, "bw")?;
    let degree = relative_degree(&zpk.z, &zpk.p)?;
    let half_bw = Complex::new(bw / F::from(2.0).unwrap(), F::zero());
    let wo2 = wo * wo;
    let one = Complex::new(F::one(), F::zero());

    let z_inv: Vec<Complex<F>> = zpk.z.iter().map(|zi| half_bw / zi).collect();
    let p_inv: Vec<Complex<F>> = zpk.p.iter().map(|pi| half_bw / pi).collect();

    let mut z = Vec::with_capacity(2 * zpk.z.len() + 2 * degree);
    for zi in &z_inv {
        let (a, b) = quadratic_split(*zi, wo2);
        z.push(a);
        z.push(b);
    }
    let mut p = Vec::with_capacity(2 * zpk.p.len());
    for pi in &p_inv {
        let (a, b) = quadratic_split(*pi, wo2);
        p.push(a);
        p.push(b);
    }

    // Degree zero pairs land on the imaginary axis at +-j wo.
    z.extend(core::iter::repeat(Complex::new(F::zero(), wo)).take(degree));
    z.extend(core::iter::repeat(Complex::new(F::zero(), -wo)).take(degree));

    let num = zpk.z.iter().fold(one, |acc, zi| acc * -*zi);
    let den = zpk.p.iter().fold(one, |acc, pi| acc * -*pi);
    let k = zpk.k * (num / den).re;
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Map an analog ZPK filter to the digital domain with the bilinear
/// transform `s = 2 fs (z - 1) / (z + 1)`.
///
/// Zeros at infinity map to `z = -1`.
pub fn bilinear_zpk<F>(zpk: ZpkFormatFilter<F>, fs: F) -> Result<ZpkFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    check_positive(fs, "fs")?;
    let degree = relative_degree(&zpk.z, &zpk.p)?;
    let fs2 = Complex::new(F::from(2.0).unwrap() * fs, F::zero());
    let one = Complex::new(F::one(), F::zero());

    let mut z: Vec<Complex<F>> = zpk.z.iter().map(|zi| (fs2 + zi) / (fs2 - zi)).collect();
    let p: Vec<Complex<F>> = zpk.p.iter().map(|pi| (fs2 + pi) / (fs2 - pi)).collect();

    z.extend(core::iter::repeat(Complex::new(-F::one(), F::zero())).take(degree));

    let num = zpk.z.iter().fold(one, |acc, zi| acc * (fs2 - zi));
    let den = zpk.p.iter().fold(one, |acc, pi| acc * (fs2 - pi));
    let k = zpk.k * (num / den).re;
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Multiply a ZPK representation out into transfer-function coefficients in
/// descending powers: `b = k * poly(z)`, `a = poly(p)`.
pub fn zpk2tf<F>(
    z: &[Complex<F>],
    p: &[Complex<F>],
    k: F,
) -> BaFormatFilter<F>
where
    F: RealField + Float + Copy,
{
    let num = polymul(
        &poly_from_roots(z),
        &[Complex::new(k, F::zero())],
    );
    let den = poly_from_roots(p);
    BaFormatFilter {
        b: num.iter().map(|c| c.re).collect(),
        a: den.iter().map(|c| c.re).collect(),
    }
}
