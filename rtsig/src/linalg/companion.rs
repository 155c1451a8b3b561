use crate::kernel::ConfigError;
use nalgebra::{DMatrix, Scalar};
use num_traits::{One, Zero};

use core::ops::{Div, Neg};

/// Create the companion matrix of a polynomial given in descending powers.
///
/// The first row is `-coeffs[1..] / coeffs[0]` and the subdiagonal is ones,
/// matching `scipy.linalg.companion`.
pub fn companion<T>(coeffs: &[T]) -> Result<DMatrix<T>, ConfigError>
where
    T: Scalar + One + Zero + Div<Output = T> + Neg<Output = T> + Copy + PartialEq,
{
    if coeffs.len() < 2 {
        return Err(ConfigError::InvalidArgument {
            arg: "coeffs",
            reason: "companion requires at least 2 coefficients",
        });
    }
    if coeffs[0] == T::zero() {
        return Err(ConfigError::InvalidArgument {
            arg: "coeffs",
            reason: "leading coefficient must be non-zero",
        });
    }

    let m = coeffs.len() - 1;
    let a0 = coeffs[0];
    let mut matrix = DMatrix::<T>::zeros(m, m);
    for (i, ai) in coeffs.iter().skip(1).enumerate() {
        matrix[(0, i)] = -*ai / a0;
    }
    for i in 0..m.saturating_sub(1) {
        matrix[(i + 1, i)] = T::one();
    }
    Ok(matrix)
}
