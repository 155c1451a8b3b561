//! ZPK to second-order-section conversion with nearest pairing.

use crate::kernel::ConfigError;
use alloc::vec::Vec;
use nalgebra::{Complex, RealField};
use num_traits::Float;

use super::{Sos, SosFormatFilter, ZpkFormatFilter, ZpkPairing};

/// A group of roots that occupies one section: a conjugate pair, two real
/// roots, or a lone real root.
#[derive(Debug, Clone, Copy)]
enum RootUnit<F> {
    /// Conjugate pair, stored as the member with non-negative imaginary
    /// part.
    Pair(Complex<F>),
    /// Two real roots sharing a section.
    RealPair(F, F),
    /// A lone real root; the section is first order.
    Single(F),
}

fn is_real<F>(root: Complex<F>, tol: F) -> bool
where
    F: RealField + Float + Copy,
{
    Float::abs(root.im) <= tol * Float::max(F::one(), root.norm())
}

fn unit_circle_distance<F>(root: Complex<F>) -> F
where
    F: RealField + Float + Copy,
{
    Float::abs(F::one() - root.norm())
}

/// Split a conjugate-symmetric root set into pair units and a real pool.
/// Real roots are sorted by distance from the unit circle, descending, and
/// greedily grouped in twos; an odd count leaves one `Single`.
fn group_roots<F>(
    roots: &[Complex<F>],
    arg: &'static str,
) -> Result<(Vec<Complex<F>>, Vec<F>), ConfigError>
where
    F: RealField + Float + Copy,
{
    let tol = F::epsilon() * F::from(100.0).unwrap();
    let mut pairs = Vec::new();
    let mut reals = Vec::new();
    let mut used = alloc::vec![false; roots.len()];

    for (i, &r) in roots.iter().enumerate() {
        if used[i] {
            continue;
        }
        if is_real(r, tol) {
            used[i] = true;
            reals.push(r.re);
            continue;
        }
        // Find the conjugate partner.
        let conj = r.conj();
        let partner = roots.iter().enumerate().position(|(j, &s)| {
            !used[j] && j != i && (s - conj).norm() <= tol * Float::max(F::one(), r.norm())
        });
        match partner {
            Some(j) => {
                used[i] = true;
                used[j] = true;
                pairs.push(if r.im > F::zero() { r } else { r.conj() });
            }
            None => {
                return Err(ConfigError::InvalidArgument {
                    arg,
                    reason: "complex roots must have matching conjugate pairs",
                });
            }
        }
    }
    Ok((pairs, reals))
}

fn pair_numerator<F>(z: Complex<F>) -> [F; 3]
where
    F: RealField + Float + Copy,
{
    let two = F::from(2.0).unwrap();
    [F::one(), -two * z.re, z.norm_sqr()]
}

/// Convert a ZPK filter into cascaded second-order sections.
///
/// Pairing strategy is nearest: poles are grouped into conjugate pairs,
/// real pairs, and at most one lone real root, sections are ordered from
/// farthest to closest to the unit circle, and each pole group consumes the
/// nearest compatible zeros. The overall gain is folded into the first
/// section's numerator. Ties in the distance ordering keep the pre-sort
/// root order.
pub fn zpk2sos<F>(
    zpk: ZpkFormatFilter<F>,
    pairing: Option<ZpkPairing>,
) -> Result<SosFormatFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    let ZpkPairing::Nearest = pairing.unwrap_or_default();

    if zpk.p.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "zpk.p" });
    }
    if zpk.z.len() > zpk.p.len() {
        return Err(ConfigError::InvalidArgument {
            arg: "zpk",
            reason: "improper transfer function; poles must be >= zeros",
        });
    }

    let (pole_pairs, mut pole_reals) = group_roots(&zpk.p, "zpk.p")?;
    let (mut zero_pairs, mut zero_reals) = group_roots(&zpk.z, "zpk.z")?;

    // Real poles pair up after sorting by distance from the unit circle.
    pole_reals.sort_by(|a, b| {
        unit_circle_distance(Complex::new(*b, F::zero()))
            .partial_cmp(&unit_circle_distance(Complex::new(*a, F::zero())))
            .unwrap_or(core::cmp::Ordering::Equal)
    });
    let mut units: Vec<RootUnit<F>> = pole_pairs.iter().map(|&p| RootUnit::Pair(p)).collect();
    let mut chunks = pole_reals.chunks_exact(2);
    for c in &mut chunks {
        units.push(RootUnit::RealPair(c[0], c[1]));
    }
    if let Some(&r) = chunks.remainder().first() {
        units.push(RootUnit::Single(r));
    }

    // Farthest from the unit circle first; stable sort keeps pre-sort order
    // on ties.
    units.sort_by(|a, b| {
        let key = |u: &RootUnit<F>| match *u {
            RootUnit::Pair(p) => unit_circle_distance(p),
            RootUnit::RealPair(r, _) | RootUnit::Single(r) => {
                unit_circle_distance(Complex::new(r, F::zero()))
            }
        };
        key(b).partial_cmp(&key(a)).unwrap_or(core::cmp::Ordering::Equal)
    });

    let take_nearest_real = |pool: &mut Vec<F>, to: Complex<F>| -> Option<F> {
        let idx = pool
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (Complex::new(**a, F::zero()) - to)
                    .norm()
                    .partial_cmp(&(Complex::new(**b, F::zero()) - to).norm())
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)?;
        Some(pool.remove(idx))
    };
    let take_nearest_pair = |pool: &mut Vec<Complex<F>>, to: Complex<F>| -> Option<Complex<F>> {
        let idx = pool
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (**a - to)
                    .norm()
                    .partial_cmp(&(**b - to).norm())
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)?;
        Some(pool.remove(idx))
    };

    let mut sections = Vec::with_capacity(units.len());
    for unit in units {
        let (denominator, pole_at) = match unit {
            RootUnit::Pair(p) => {
                let two = F::from(2.0).unwrap();
                ([F::one(), -two * p.re, p.norm_sqr()], p)
            }
            RootUnit::RealPair(r1, r2) => (
                [F::one(), -(r1 + r2), r1 * r2],
                Complex::new(r1, F::zero()),
            ),
            RootUnit::Single(r) => ([F::one(), -r, F::zero()], Complex::new(r, F::zero())),
        };

        let numerator = match unit {
            RootUnit::Pair(_) => {
                let nearest_pair_d = zero_pairs
                    .iter()
                    .map(|z| (*z - pole_at).norm())
                    .fold(F::infinity(), Float::min);
                let nearest_real_d = zero_reals
                    .iter()
                    .map(|r| (Complex::new(*r, F::zero()) - pole_at).norm())
                    .fold(F::infinity(), Float::min);
                if nearest_pair_d <= nearest_real_d {
                    match take_nearest_pair(&mut zero_pairs, pole_at) {
                        Some(z) => pair_numerator(z),
                        None => [F::one(), F::zero(), F::zero()],
                    }
                } else {
                    let z1 = take_nearest_real(&mut zero_reals, pole_at);
                    let z2 = take_nearest_real(&mut zero_reals, pole_at);
                    match (z1, z2) {
                        (Some(a), Some(b)) => [F::one(), -(a + b), a * b],
                        (Some(a), None) => [F::one(), -a, F::zero()],
                        _ => [F::one(), F::zero(), F::zero()],
                    }
                }
            }
            RootUnit::RealPair(..) => {
                let z1 = take_nearest_real(&mut zero_reals, pole_at);
                let z2 = take_nearest_real(&mut zero_reals, pole_at);
                match (z1, z2) {
                    (Some(a), Some(b)) => [F::one(), -(a + b), a * b],
                    (Some(a), None) => [F::one(), -a, F::zero()],
                    _ => match take_nearest_pair(&mut zero_pairs, pole_at) {
                        Some(z) => pair_numerator(z),
                        None => [F::one(), F::zero(), F::zero()],
                    },
                }
            }
            RootUnit::Single(_) => match take_nearest_real(&mut zero_reals, pole_at) {
                Some(a) => [F::one(), -a, F::zero()],
                None => [F::one(), F::zero(), F::zero()],
            },
        };

        sections.push(Sos::new(numerator, denominator));
    }

    // Any leftover conjugate zero pairs belong to sections that ran out of
    // real slots; fold them into the trailing proper sections.
    debug_assert!(zero_pairs.is_empty() && zero_reals.is_empty());

    if let Some(first) = sections.first_mut() {
        for b in first.b.iter_mut() {
            *b = *b * zpk.k;
        }
    }

    Ok(SosFormatFilter { sos: sections })
}
