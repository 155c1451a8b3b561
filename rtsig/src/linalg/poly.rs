use crate::kernel::ExecInvariantViolation;
use alloc::vec::Vec;
use nalgebra::{Complex, RealField};
use num_traits::Float;

use super::companion;

/// Multiply two polynomials given as complex coefficients in descending
/// powers. Iterative convolution.
pub fn polymul<F>(a: &[Complex<F>], b: &[Complex<F>]) -> Vec<Complex<F>>
where
    F: RealField + Copy,
{
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = alloc::vec![Complex::new(F::zero(), F::zero()); a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] = out[i + j] + ai * bj;
        }
    }
    out
}

/// Expand a set of roots into monic polynomial coefficients, descending
/// powers.
pub fn poly_from_roots<F>(roots: &[Complex<F>]) -> Vec<Complex<F>>
where
    F: RealField + Copy,
{
    let mut coeffs = alloc::vec![Complex::new(F::one(), F::zero())];
    for r in roots {
        coeffs = polymul(&coeffs, &[Complex::new(F::one(), F::zero()), -*r]);
    }
    coeffs
}

/// Evaluate a polynomial (descending powers) at a complex point with
/// Horner's scheme.
pub fn polyval<F>(coeffs: &[Complex<F>], x: Complex<F>) -> Complex<F>
where
    F: RealField + Copy,
{
    let mut acc = Complex::new(F::zero(), F::zero());
    for &c in coeffs {
        acc = acc * x + c;
    }
    acc
}

/// Roots of a real-coefficient polynomial in descending powers, computed as
/// the eigenvalues of the companion matrix.
pub fn polynomial_roots<F>(coeffs: &[F]) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
where
    F: RealField + Float + Copy,
{
    // Strip leading coefficients that are numerically zero.
    let lead_tol = Float::epsilon();
    let start = coeffs
        .iter()
        .position(|c| Float::abs(*c) > lead_tol)
        .unwrap_or(coeffs.len());
    let coeffs = &coeffs[start..];
    if coeffs.len() < 2 {
        return Ok(Vec::new());
    }

    let matrix = companion(coeffs)?;
    Ok(matrix.complex_eigenvalues().iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn polymul_matches_convolution() {
        let a = [c(1.0, 0.0), c(2.0, 0.0)];
        let b = [c(1.0, 0.0), c(-3.0, 0.0), c(2.0, 0.0)];
        let p = polymul(&a, &b);
        let expected = [c(1.0, 0.0), c(-1.0, 0.0), c(-4.0, 0.0), c(4.0, 0.0)];
        for (pi, ei) in p.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(pi.re, ei.re, epsilon = 1e-14);
            assert_abs_diff_eq!(pi.im, ei.im, epsilon = 1e-14);
        }
    }

    #[test]
    fn poly_from_roots_recovers_quadratic() {
        // (x - 2)(x - 3) = x^2 - 5x + 6
        let p = poly_from_roots(&[c(2.0, 0.0), c(3.0, 0.0)]);
        assert_abs_diff_eq!(p[0].re, 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(p[1].re, -5.0, epsilon = 1e-14);
        assert_abs_diff_eq!(p[2].re, 6.0, epsilon = 1e-14);
    }

    #[test]
    fn roots_of_cubic() {
        // (x - 1)(x - 2)(x - 3)
        let mut roots: Vec<f64> = polynomial_roots(&[1.0f64, -6.0, 11.0, -6.0])
            .expect("roots should compute")
            .iter()
            .map(|z| z.re)
            .collect();
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(roots[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(roots[1], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(roots[2], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn complex_conjugate_roots() {
        // x^2 + 1 has roots ±j
        let roots = polynomial_roots(&[1.0f64, 0.0, 1.0]).expect("roots should compute");
        assert_eq!(roots.len(), 2);
        let mut ims: Vec<f64> = roots.iter().map(|z| z.im).collect();
        ims.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(ims[0], -1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(ims[1], 1.0, epsilon = 1e-10);
        for z in &roots {
            assert_abs_diff_eq!(z.re, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn polyval_horner() {
        let p = [c(2.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)];
        let y = polyval(&p, c(3.0, 0.0));
        assert_abs_diff_eq!(y.re, 17.0, epsilon = 1e-14);
    }
}
