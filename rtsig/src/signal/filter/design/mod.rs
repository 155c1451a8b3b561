//! Filter representations and the design functions that produce them.

use crate::kernel::ConfigError;
use alloc::vec::Vec;
use nalgebra::{Complex, RealField};
use num_traits::Float;

mod designer;
mod firwin;
mod iirdes;
mod prototypes;
mod xform;
mod zpk2sos;

pub use designer::*;
pub use firwin::*;
pub use iirdes::*;
pub use prototypes::*;
pub use xform::*;
pub use zpk2sos::*;

/// Default absolute tolerance for representation equality.
pub fn default_tolerance<F: Float>() -> F {
    F::from(1e-12).unwrap_or_else(F::epsilon)
}

/// Filter band type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterBandType {
    /// Low-pass.
    Lowpass,
    /// High-pass.
    Highpass,
    /// Band-pass.
    Bandpass,
    /// Band-stop.
    Bandstop,
}

/// IIR analog prototype family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Maximally flat passband.
    Butterworth,
    /// Equiripple passband; requires a passband ripple `rp` in dB.
    ChebyshevI,
    /// Equiripple stopband; requires a stopband ripple `rs` in dB.
    ChebyshevII,
    /// Maximally flat group delay.
    BesselThomson,
}

/// Requested output representation of an IIR design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutputType {
    /// Numerator/denominator transfer function.
    Ba,
    /// Zeros, poles, gain.
    Zpk,
    /// Cascaded second-order sections.
    Sos,
}

/// Pole/zero pairing strategy for [`zpk2sos`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZpkPairing {
    /// Pair each pole with the nearest remaining zero, ordering sections
    /// from farthest to closest to the unit circle.
    #[default]
    Nearest,
}

/// FIR design window family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirWindow<F>
where
    F: Float,
{
    /// Hamming window.
    Hamming,
    /// Hann window.
    Hann,
    /// Bartlett (triangular) window.
    Bartlett,
    /// Blackman window.
    Blackman,
    /// Kaiser window with shape parameter `beta`.
    Kaiser {
        /// Shape parameter.
        beta: F,
    },
}

/// Zeros, poles, gain representation.
///
/// Complex roots of real filters appear in conjugate pairs. Ordering is not
/// an intrinsic property: equality is permutation-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ZpkFormatFilter<F>
where
    F: RealField + Copy,
{
    /// Zeros.
    pub z: Vec<Complex<F>>,
    /// Poles.
    pub p: Vec<Complex<F>>,
    /// System gain.
    pub k: F,
}

impl<F> ZpkFormatFilter<F>
where
    F: RealField + Float + Copy,
{
    /// Assemble a ZPK filter from parts.
    pub fn new(z: Vec<Complex<F>>, p: Vec<Complex<F>>, k: F) -> Self {
        Self { z, p, k }
    }

    /// Pointwise equality under an absolute tolerance after canonical
    /// ordering of both root sets.
    pub fn approx_eq(&self, other: &Self, tol: F) -> bool {
        if self.z.len() != other.z.len() || self.p.len() != other.p.len() {
            return false;
        }
        if Float::abs(self.k - other.k) > tol {
            return false;
        }
        let close = |a: &[Complex<F>], b: &[Complex<F>]| {
            let mut a = a.to_vec();
            let mut b = b.to_vec();
            sort_roots(&mut a);
            sort_roots(&mut b);
            a.iter().zip(b.iter()).all(|(x, y)| {
                Float::abs(x.re - y.re) <= tol && Float::abs(x.im - y.im) <= tol
            })
        };
        close(&self.z, &other.z) && close(&self.p, &other.p)
    }
}

/// Sort roots by real then imaginary part. Canonical order for equality.
pub(crate) fn sort_roots<F>(roots: &mut [Complex<F>])
where
    F: RealField + Float + Copy,
{
    roots.sort_by(|a, b| {
        a.re.partial_cmp(&b.re)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.im.partial_cmp(&b.im).unwrap_or(core::cmp::Ordering::Equal))
    });
}

/// Numerator/denominator transfer-function representation.
#[derive(Debug, Clone, PartialEq)]
pub struct BaFormatFilter<F>
where
    F: Float,
{
    /// Numerator coefficients, descending powers.
    pub b: Vec<F>,
    /// Denominator coefficients, descending powers. `a[0]` is non-zero.
    pub a: Vec<F>,
}

impl<F> BaFormatFilter<F>
where
    F: Float,
{
    /// Assemble a transfer function, checking the `a[0] != 0` invariant.
    pub fn new(b: Vec<F>, a: Vec<F>) -> Result<Self, ConfigError> {
        if b.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "b" });
        }
        if a.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "a" });
        }
        if a[0] == F::zero() {
            return Err(ConfigError::InvalidArgument {
                arg: "a",
                reason: "leading denominator coefficient must be non-zero",
            });
        }
        Ok(Self { b, a })
    }

    /// Divide both coefficient sets through by `a[0]`. Returns true when the
    /// coefficients actually changed.
    pub fn normalize(&mut self) -> bool {
        let a0 = self.a[0];
        if a0 == F::one() {
            return false;
        }
        for v in self.b.iter_mut() {
            *v = *v / a0;
        }
        for v in self.a.iter_mut() {
            *v = *v / a0;
        }
        true
    }

    /// Pointwise equality under an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, tol: F) -> bool {
        self.b.len() == other.b.len()
            && self.a.len() == other.a.len()
            && self
                .b
                .iter()
                .zip(other.b.iter())
                .chain(self.a.iter().zip(other.a.iter()))
                .all(|(x, y)| (*x - *y).abs() <= tol)
    }
}

/// A single second-order section with its two delay states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sos<F>
where
    F: RealField + Copy,
{
    /// Numerator coefficients `[b0, b1, b2]`.
    pub b: [F; 3],
    /// Denominator coefficients `[a0, a1, a2]`.
    pub a: [F; 3],
    /// First delay state.
    pub zi0: F,
    /// Second delay state.
    pub zi1: F,
}

impl<F> Sos<F>
where
    F: RealField + Copy,
{
    /// Build a section with zeroed state.
    pub fn new(b: [F; 3], a: [F; 3]) -> Self {
        Self {
            b,
            a,
            zi0: F::zero(),
            zi1: F::zero(),
        }
    }

    /// Build `order` sections from a flat scipy-style `[b0 b1 b2 a0 a1 a2]*`
    /// coefficient array.
    pub fn from_scipy_dyn(order: usize, sos: Vec<F>) -> Vec<Sos<F>> {
        assert_eq!(order * 6, sos.len());
        sos.chunks_exact(6)
            .map(|c| Sos::new([c[0], c[1], c[2]], [c[3], c[4], c[5]]))
            .collect()
    }
}

/// Cascaded second-order sections.
///
/// Section order matters for numerical behavior and is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFormatFilter<F>
where
    F: RealField + Copy,
{
    /// Sections, applied first to last.
    pub sos: Vec<Sos<F>>,
}

impl<F> SosFormatFilter<F>
where
    F: RealField + Float + Copy,
{
    /// Assemble sections from flat numerator/denominator triplet arrays of
    /// length `3 * ns`, checking that every leading coefficient is non-zero.
    pub fn from_coefficients(ns: usize, bs: &[F], a_s: &[F]) -> Result<Self, ConfigError> {
        if ns < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "ns",
                reason: "at least one section is required",
            });
        }
        if bs.len() != 3 * ns {
            return Err(ConfigError::LengthMismatch {
                arg: "bs",
                expected: 3 * ns,
                got: bs.len(),
            });
        }
        if a_s.len() != 3 * ns {
            return Err(ConfigError::LengthMismatch {
                arg: "as",
                expected: 3 * ns,
                got: a_s.len(),
            });
        }
        for i in 0..ns {
            if bs[3 * i] == F::zero() {
                return Err(ConfigError::InvalidArgument {
                    arg: "bs",
                    reason: "leading numerator coefficient of a section is zero",
                });
            }
            if a_s[3 * i] == F::zero() {
                return Err(ConfigError::InvalidArgument {
                    arg: "as",
                    reason: "leading denominator coefficient of a section is zero",
                });
            }
        }
        let sos = (0..ns)
            .map(|i| {
                Sos::new(
                    [bs[3 * i], bs[3 * i + 1], bs[3 * i + 2]],
                    [a_s[3 * i], a_s[3 * i + 1], a_s[3 * i + 2]],
                )
            })
            .collect();
        Ok(Self { sos })
    }

    /// Pointwise coefficient equality under an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, tol: F) -> bool {
        self.sos.len() == other.sos.len()
            && self.sos.iter().zip(other.sos.iter()).all(|(x, y)| {
                x.b.iter()
                    .zip(y.b.iter())
                    .chain(x.a.iter().zip(y.a.iter()))
                    .all(|(p, q)| Float::abs(*p - *q) <= tol)
            })
    }

    /// Multiply the sections out into a single transfer function.
    pub fn to_ba(&self) -> BaFormatFilter<F> {
        let one = Complex::new(F::one(), F::zero());
        let mut b = alloc::vec![one];
        let mut a = alloc::vec![one];
        for s in &self.sos {
            let bsec = [
                Complex::new(s.b[0], F::zero()),
                Complex::new(s.b[1], F::zero()),
                Complex::new(s.b[2], F::zero()),
            ];
            let asec = [
                Complex::new(s.a[0], F::zero()),
                Complex::new(s.a[1], F::zero()),
                Complex::new(s.a[2], F::zero()),
            ];
            b = crate::linalg::polymul(&b, &bsec);
            a = crate::linalg::polymul(&a, &asec);
        }
        BaFormatFilter {
            b: b.iter().map(|c| c.re).collect(),
            a: a.iter().map(|c| c.re).collect(),
        }
    }
}

/// Finite impulse response taps. No runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct FirFormatFilter<F>
where
    F: Float,
{
    /// Filter taps.
    pub taps: Vec<F>,
}

impl<F> FirFormatFilter<F>
where
    F: Float,
{
    /// Wrap a non-empty tap set.
    pub fn new(taps: Vec<F>) -> Result<Self, ConfigError> {
        if taps.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "taps" });
        }
        Ok(Self { taps })
    }

    /// Group delay in samples of the symmetric filter, `(nt - 1) / 2`.
    pub fn group_delay(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Pointwise equality under an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, tol: F) -> bool {
        self.taps.len() == other.taps.len()
            && self
                .taps
                .iter()
                .zip(other.taps.iter())
                .all(|(x, y)| (*x - *y).abs() <= tol)
    }
}

/// An IIR design in the representation the caller requested.
#[derive(Debug, Clone)]
pub enum DigitalFilter<F>
where
    F: RealField + Copy + num_traits::Float,
{
    /// Zeros, poles, gain.
    Zpk(ZpkFormatFilter<F>),
    /// Transfer-function coefficients.
    Ba(BaFormatFilter<F>),
    /// Second-order sections.
    Sos(SosFormatFilter<F>),
}
