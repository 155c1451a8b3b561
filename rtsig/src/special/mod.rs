//! Special functions needed by window design.

use num_traits::Float;

/// Modified Bessel function of the first kind, order zero.
///
/// Power-series evaluation, accurate to machine precision over the argument
/// range Kaiser windows use (|x| ≲ 30).
pub trait Bessel: Sized {
    /// Evaluate I₀(self).
    fn i0(self) -> Self;
}

impl<F> Bessel for F
where
    F: Float,
{
    fn i0(self) -> Self {
        let half = F::from(0.5).unwrap_or_else(F::one);
        let x2 = self * half;
        let mut term = F::one();
        let mut sum = F::one();
        let mut k = F::one();
        loop {
            let t = x2 / k;
            term = term * t * t;
            sum = sum + term;
            if term < sum * F::epsilon() {
                break;
            }
            k = k + F::one();
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::Bessel;
    use approx::assert_relative_eq;

    #[test]
    fn matches_reference_values() {
        // scipy.special.i0 references
        assert_relative_eq!(0.0f64.i0(), 1.0, max_relative = 1e-14);
        assert_relative_eq!(1.0f64.i0(), 1.2660658777520084, max_relative = 1e-13);
        assert_relative_eq!(5.0f64.i0(), 27.239871823604442, max_relative = 1e-13);
        assert_relative_eq!(8.0f64.i0(), 427.56411572180474, max_relative = 1e-12);
    }

    #[test]
    fn even_symmetry() {
        assert_relative_eq!((-3.5f64).i0(), 3.5f64.i0(), max_relative = 1e-15);
    }
}
