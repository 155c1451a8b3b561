//! General IIR design: analog prototype, band transform, bilinear
//! transform, requested output format.

use crate::kernel::ConfigError;
use alloc::vec::Vec;
use nalgebra::RealField;
use num_traits::Float;

use super::{
    besselap, bilinear_zpk, butterap, cheb1ap, cheb2ap, lp2bp_zpk, lp2bs_zpk, lp2hp_zpk,
    lp2lp_zpk, zpk2sos, zpk2tf, DigitalFilter, FilterBandType, FilterOutputType, FilterType,
    ZpkFormatFilter,
};

fn validate_wn<F>(wn: &[F], band: FilterBandType, digital: bool) -> Result<(), ConfigError>
where
    F: Float,
{
    match band {
        FilterBandType::Lowpass | FilterBandType::Highpass => {
            if wn.len() != 1 {
                return Err(ConfigError::LengthMismatch {
                    arg: "wn",
                    expected: 1,
                    got: wn.len(),
                });
            }
        }
        FilterBandType::Bandpass | FilterBandType::Bandstop => {
            if wn.len() != 2 {
                return Err(ConfigError::LengthMismatch {
                    arg: "wn",
                    expected: 2,
                    got: wn.len(),
                });
            }
            if wn[0] >= wn[1] {
                return Err(ConfigError::InvalidArgument {
                    arg: "wn",
                    reason: "wn[0] must be less than wn[1]",
                });
            }
        }
    }
    if wn.iter().any(|w| *w <= F::zero()) {
        return Err(ConfigError::InvalidArgument {
            arg: "wn",
            reason: "critical frequencies must be greater than 0",
        });
    }
    if digital && wn.iter().any(|w| *w >= F::one()) {
        return Err(ConfigError::InvalidArgument {
            arg: "wn",
            reason: "normalized digital wn must satisfy 0 < wn < 1",
        });
    }
    Ok(())
}

/// Design a digital or analog IIR filter.
///
/// Digital critical frequencies are normalized so 1 is the Nyquist
/// frequency; analog ones are in rad/s. The `ripple` parameter carries the
/// passband ripple (dB) for Chebyshev I designs and the stopband ripple
/// (dB) for Chebyshev II designs; it is ignored otherwise.
pub fn iirfilter<F>(
    order: usize,
    wn: &[F],
    ripple: Option<F>,
    band: FilterBandType,
    prototype: FilterType,
    analog: bool,
    output: FilterOutputType,
) -> Result<DigitalFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    if order < 1 {
        return Err(ConfigError::InvalidArgument {
            arg: "order",
            reason: "order must be greater than zero",
        });
    }
    validate_wn(wn, band, !analog)?;

    let proto: ZpkFormatFilter<F> = match prototype {
        FilterType::Butterworth => butterap(order)?,
        FilterType::ChebyshevI => {
            let rp = ripple.ok_or(ConfigError::InvalidArgument {
                arg: "ripple",
                reason: "rp is required for Chebyshev I designs",
            })?;
            cheb1ap(order, rp)?
        }
        FilterType::ChebyshevII => {
            let rs = ripple.ok_or(ConfigError::InvalidArgument {
                arg: "ripple",
                reason: "rs is required for Chebyshev II designs",
            })?;
            cheb2ap(order, rs)?
        }
        FilterType::BesselThomson => besselap(order).map_err(|_| {
            ConfigError::InvalidArgument {
                arg: "order",
                reason: "Bessel prototype root finding failed",
            }
        })?,
    };

    // Pre-warp the band edges for digital designs.
    let fs = F::from(2.0).unwrap();
    let warped: Vec<F> = if analog {
        wn.to_vec()
    } else {
        wn.iter()
            .map(|w| fs * F::from(2.0).unwrap() * Float::tan(F::pi() * *w / fs))
            .collect()
    };

    let transformed = match band {
        FilterBandType::Lowpass => lp2lp_zpk(proto, warped[0])?,
        FilterBandType::Highpass => lp2hp_zpk(proto, warped[0])?,
        FilterBandType::Bandpass => {
            let wo = Float::sqrt(warped[0] * warped[1]);
            let bw = warped[1] - warped[0];
            lp2bp_zpk(proto, wo, bw)?
        }
        FilterBandType::Bandstop => {
            let wo = Float::sqrt(warped[0] * warped[1]);
            let bw = warped[1] - warped[0];
            lp2bs_zpk(proto, wo, bw)?
        }
    };

    let zpk = if analog {
        transformed
    } else {
        bilinear_zpk(transformed, fs)?
    };

    Ok(match output {
        FilterOutputType::Zpk => DigitalFilter::Zpk(zpk),
        FilterOutputType::Ba => DigitalFilter::Ba(zpk2tf(&zpk.z, &zpk.p, zpk.k)),
        FilterOutputType::Sos => DigitalFilter::Sos(zpk2sos(zpk, None)?),
    })
}

/// Butterworth design shorthand over [`iirfilter`].
pub fn butter<F>(
    order: usize,
    wn: &[F],
    band: FilterBandType,
    analog: bool,
    output: FilterOutputType,
) -> Result<DigitalFilter<F>, ConfigError>
where
    F: RealField + Float + Copy,
{
    iirfilter(order, wn, None, band, FilterType::Butterworth, analog, output)
}
