//! Contiguous vector primitives.
//!
//! These are the scalar fallbacks for the copy/convert/reduce operations the
//! filter kernels lean on. They deliberately operate on plain slices so the
//! callers decide the memory story.

use num_traits::Float;

/// Copy `src` into `dst`. Both slices must have the same length.
#[inline]
pub fn copy<T: Copy>(src: &[T], dst: &mut [T]) {
    dst.copy_from_slice(src);
}

/// Zero out `dst`.
#[inline]
pub fn zero<F: Float>(dst: &mut [F]) {
    for v in dst.iter_mut() {
        *v = F::zero();
    }
}

/// Reverse `src` into `dst`.
#[inline]
pub fn flip<T: Copy>(src: &[T], dst: &mut [T]) {
    for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
        *d = *s;
    }
}

/// Convert between float precisions element-wise, e.g. f64 → f32 or back.
#[inline]
pub fn convert<A: Float, B: Float>(src: &[A], dst: &mut [B]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = B::from(*s).unwrap_or_else(B::nan);
    }
}

/// Minimum element of a non-empty slice. NaN elements are skipped.
#[inline]
pub fn min<F: Float>(x: &[F]) -> F {
    x.iter().copied().fold(F::infinity(), F::min)
}

/// Arithmetic mean of a slice; zero for an empty slice.
#[inline]
pub fn mean<F: Float>(x: &[F]) -> F {
    if x.is_empty() {
        return F::zero();
    }
    let mut acc = F::zero();
    for &v in x {
        acc = acc + v;
    }
    acc / F::from(x.len()).unwrap_or_else(F::one)
}

/// Element-wise magnitude of a (re, im) pair of slices.
#[inline]
pub fn magnitude<F: Float>(re: &[F], im: &[F], dst: &mut [F]) {
    for ((d, &r), &i) in dst.iter_mut().zip(re.iter()).zip(im.iter()) {
        *d = r.hypot(i);
    }
}

/// Add a scalar to every element in place.
#[inline]
pub fn add_scalar<F: Float>(x: &mut [F], c: F) {
    for v in x.iter_mut() {
        *v = *v + c;
    }
}

/// Subtract a scalar from every element in place.
#[inline]
pub fn sub_scalar<F: Float>(x: &mut [F], c: F) {
    for v in x.iter_mut() {
        *v = *v - c;
    }
}

/// Multiply every element by a scalar in place.
#[inline]
pub fn mul_scalar<F: Float>(x: &mut [F], c: F) {
    for v in x.iter_mut() {
        *v = *v * c;
    }
}
