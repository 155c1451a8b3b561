//! Window-method FIR design and the Hilbert transformer pair.

use crate::kernel::{ConfigError, Write1D};
use crate::special::Bessel;
use alloc::vec::Vec;
use num_traits::Float;

use super::{FirFormatFilter, FirWindow, FilterBandType};

fn pi<F: Float>() -> F {
    F::from(core::f64::consts::PI).unwrap()
}

/// Generate a symmetric window of length `n`.
pub fn window<F>(kind: FirWindow<F>, n: usize) -> Result<Vec<F>, ConfigError>
where
    F: Float + Bessel,
{
    if n < 2 {
        return Err(ConfigError::InvalidArgument {
            arg: "n",
            reason: "window length must be greater than 1",
        });
    }
    let nm1 = F::from(n - 1).unwrap();
    let two = F::from(2.0).unwrap();
    let w = (0..n)
        .map(|k| {
            let kf = F::from(k).unwrap();
            let frac = kf / nm1;
            match kind {
                FirWindow::Hamming => {
                    F::from(0.54).unwrap()
                        - F::from(0.46).unwrap() * (two * pi::<F>() * frac).cos()
                }
                FirWindow::Hann => {
                    F::from(0.5).unwrap() * (F::one() - (two * pi::<F>() * frac).cos())
                }
                FirWindow::Bartlett => {
                    let half = nm1 / two;
                    F::one() - ((kf - half) / half).abs()
                }
                FirWindow::Blackman => {
                    // Four-term optimal coefficients.
                    F::from(0.42659071367153073).unwrap()
                        - F::from(0.49656061908856402).unwrap()
                            * (two * pi::<F>() * frac).cos()
                        + F::from(0.07684603248361426).unwrap()
                            * (two * two * pi::<F>() * frac).cos()
                        - F::from(0.00506108997935238).unwrap()
                            * (F::from(6.0).unwrap() * pi::<F>() * frac).cos()
                }
                FirWindow::Kaiser { beta } => {
                    let half = nm1 / two;
                    let t = (kf - half) / half;
                    (beta * (F::one() - t * t).max(F::zero()).sqrt()).i0() / beta.i0()
                }
            }
        })
        .collect();
    Ok(w)
}

fn sinc<F: Float>(t: F) -> F {
    if t == F::zero() {
        F::one()
    } else {
        let x = pi::<F>() * t;
        x.sin() / x
    }
}

fn check_cutoff<F: Float>(r: F) -> Result<(), ConfigError> {
    if r <= F::zero() || r >= F::one() {
        return Err(ConfigError::InvalidArgument {
            arg: "cutoff",
            reason: "normalized cutoff must lie in (0, 1)",
        });
    }
    Ok(())
}

/// Windowed-sinc FIR design.
///
/// Cutoffs are normalized so 1 is the Nyquist frequency. Highpass and
/// bandstop designs need an odd tap count; an even request is promoted by
/// one with a warning, so check the returned filter length.
///
/// The taps are scaled so the center of the first passband has unit gain:
/// DC for lowpass/bandstop, Nyquist for highpass, the band center for
/// bandpass.
pub fn firwin<F>(
    numtaps: usize,
    band: FilterBandType,
    cutoff: &[F],
    win: FirWindow<F>,
) -> Result<FirFormatFilter<F>, ConfigError>
where
    F: Float + Bessel,
{
    if numtaps < 2 {
        return Err(ConfigError::InvalidArgument {
            arg: "numtaps",
            reason: "at least 2 taps are required",
        });
    }
    let (r1, r2) = match band {
        FilterBandType::Lowpass | FilterBandType::Highpass => {
            if cutoff.len() != 1 {
                return Err(ConfigError::LengthMismatch {
                    arg: "cutoff",
                    expected: 1,
                    got: cutoff.len(),
                });
            }
            check_cutoff(cutoff[0])?;
            (cutoff[0], F::zero())
        }
        FilterBandType::Bandpass | FilterBandType::Bandstop => {
            if cutoff.len() != 2 {
                return Err(ConfigError::LengthMismatch {
                    arg: "cutoff",
                    expected: 2,
                    got: cutoff.len(),
                });
            }
            check_cutoff(cutoff[0])?;
            check_cutoff(cutoff[1])?;
            if cutoff[0] >= cutoff[1] {
                return Err(ConfigError::InvalidArgument {
                    arg: "cutoff",
                    reason: "cutoff frequencies must be strictly increasing",
                });
            }
            (cutoff[0], cutoff[1])
        }
    };

    let needs_odd = matches!(band, FilterBandType::Highpass | FilterBandType::Bandstop);
    let mut n = numtaps;
    if needs_odd && n % 2 == 0 {
        n += 1;
        log::warn!(
            "{band:?} firwin design requires an odd tap count; promoting {numtaps} to {n}"
        );
    }

    let w = window(win, n)?;
    let m = F::from(n - 1).unwrap() / F::from(2.0).unwrap();
    let lowpass = |r: F, k: usize| -> F {
        let t = F::from(k).unwrap() - m;
        r * sinc(r * t)
    };
    let delta = |k: usize| -> F {
        if F::from(k).unwrap() == m {
            F::one()
        } else {
            F::zero()
        }
    };

    let mut taps: Vec<F> = (0..n)
        .map(|k| {
            let ideal = match band {
                FilterBandType::Lowpass => lowpass(r1, k),
                FilterBandType::Highpass => delta(k) - lowpass(r1, k),
                FilterBandType::Bandpass => lowpass(r2, k) - lowpass(r1, k),
                FilterBandType::Bandstop => delta(k) - (lowpass(r2, k) - lowpass(r1, k)),
            };
            ideal * w[k]
        })
        .collect();

    // Scale so the first passband center has unit gain.
    let scale_freq = match band {
        FilterBandType::Lowpass | FilterBandType::Bandstop => F::zero(),
        FilterBandType::Highpass => F::one(),
        FilterBandType::Bandpass => (r1 + r2) / F::from(2.0).unwrap(),
    };
    let mut gain = F::zero();
    for (k, t) in taps.iter().enumerate() {
        let phase = pi::<F>() * scale_freq * (F::from(k).unwrap() - m);
        gain = gain + *t * phase.cos();
    }
    if gain != F::zero() {
        for t in taps.iter_mut() {
            *t = *t / gain;
        }
    }

    FirFormatFilter::new(taps)
}

/// [`firwin`] variant writing the taps into a caller-provided buffer.
///
/// The buffer must match the designed length exactly; remember that
/// highpass and bandstop designs may promote an even `numtaps` by one.
pub fn firwin_into<F, O>(
    numtaps: usize,
    band: FilterBandType,
    cutoff: &[F],
    win: FirWindow<F>,
    out: &mut O,
) -> Result<(), ConfigError>
where
    F: Float + Bessel,
    O: Write1D<F> + ?Sized,
{
    let fir = firwin(numtaps, band, cutoff, win)?;
    let out_slice = out.write_slice_mut()?;
    if out_slice.len() != fir.taps.len() {
        return Err(ConfigError::LengthMismatch {
            arg: "out",
            expected: fir.taps.len(),
            got: out_slice.len(),
        });
    }
    out_slice.copy_from_slice(&fir.taps);
    Ok(())
}

/// Design an FIR Hilbert transformer pair approximating the analytic
/// signal: the first filter is the real branch (a delay), the second the
/// imaginary branch (the 90 degree shifter), both Kaiser windowed.
///
/// `order + 1` taps are produced. An even order gives a type III pair (the
/// real branch is a pure delay of `order / 2` samples); an odd order gives
/// a type IV pair with a fractional-delay half-band real branch and
/// non-zero response at Nyquist.
pub fn hilbert_transformer<F>(
    order: usize,
    beta: F,
) -> Result<(FirFormatFilter<F>, FirFormatFilter<F>), ConfigError>
where
    F: Float + Bessel,
{
    if order == 0 {
        // Degenerate transformer: the analytic signal of a single tap.
        return Ok((
            FirFormatFilter::new(alloc::vec![F::one()])?,
            FirFormatFilter::new(alloc::vec![F::zero()])?,
        ));
    }
    let n = order + 1;
    let w = window(FirWindow::Kaiser { beta }, n)?;
    let m = F::from(n - 1).unwrap() / F::from(2.0).unwrap();

    let real: Vec<F> = (0..n)
        .map(|k| {
            let t = F::from(k).unwrap() - m;
            sinc(t) * w[k]
        })
        .collect();
    let imag: Vec<F> = (0..n)
        .map(|k| {
            let t = F::from(k).unwrap() - m;
            if t == F::zero() {
                F::zero()
            } else {
                let x = pi::<F>() * t;
                (F::one() - x.cos()) / x * w[k]
            }
        })
        .collect();

    Ok((FirFormatFilter::new(real)?, FirFormatFilter::new(imag)?))
}
