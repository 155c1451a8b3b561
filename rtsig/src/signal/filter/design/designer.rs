//! A filter design cache.
//!
//! When designing many filters the designer saves previous outputs keyed by
//! the full parameter tuple. The cache is owned by one thread; it is not
//! safe for concurrent mutation. A stateless call into the free design
//! functions is equally correct, just slower when designs repeat.

use crate::kernel::ConfigError;
use alloc::vec::Vec;
use nalgebra::RealField;
use num_traits::Float;

use super::{
    firwin, iirfilter, zpk2sos, zpk2tf, BaFormatFilter, DigitalFilter, FilterBandType,
    FilterOutputType, FilterType, FirFormatFilter, FirWindow, SosFormatFilter, ZpkFormatFilter,
};

#[derive(Debug, Clone, PartialEq)]
struct IirDesignParams<F>
where
    F: Float,
{
    order: usize,
    wn: Vec<F>,
    ripple: Option<F>,
    band: FilterBandType,
    prototype: FilterType,
    digital: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FirDesignParams<F>
where
    F: Float,
{
    numtaps: usize,
    cutoff: Vec<F>,
    band: FilterBandType,
    window: FirWindow<F>,
}

/// Memoizing designer for IIR and windowed FIR filters.
#[derive(Debug, Clone, Default)]
pub struct FilterDesigner<F>
where
    F: RealField + Float + Copy,
{
    iir_cache: Vec<(IirDesignParams<F>, ZpkFormatFilter<F>)>,
    fir_cache: Vec<(FirDesignParams<F>, FirFormatFilter<F>)>,
}

impl<F> FilterDesigner<F>
where
    F: RealField + Float + Copy + crate::special::Bessel,
{
    /// Create an empty designer.
    pub fn new() -> Self {
        Self {
            iir_cache: Vec::new(),
            fir_cache: Vec::new(),
        }
    }

    /// Erase all existing filter designs.
    pub fn clear(&mut self) {
        self.iir_cache.clear();
        self.fir_cache.clear();
    }

    fn design_iir_zpk(
        &mut self,
        order: usize,
        wn: &[F],
        ripple: Option<F>,
        band: FilterBandType,
        prototype: FilterType,
        digital: bool,
    ) -> Result<ZpkFormatFilter<F>, ConfigError> {
        let params = IirDesignParams {
            order,
            wn: wn.to_vec(),
            ripple,
            band,
            prototype,
            digital,
        };
        if let Some((_, zpk)) = self.iir_cache.iter().find(|(p, _)| *p == params) {
            return Ok(zpk.clone());
        }
        let design = match iirfilter(
            order,
            wn,
            ripple,
            band,
            prototype,
            !digital,
            FilterOutputType::Zpk,
        )? {
            DigitalFilter::Zpk(zpk) => zpk,
            _ => unreachable!(),
        };
        self.iir_cache.push((params, design.clone()));
        Ok(design)
    }

    /// Design an IIR filter of the given band, returned as ZPK.
    pub fn design_iir(
        &mut self,
        order: usize,
        wn: &[F],
        ripple: Option<F>,
        band: FilterBandType,
        prototype: FilterType,
        digital: bool,
    ) -> Result<ZpkFormatFilter<F>, ConfigError> {
        self.design_iir_zpk(order, wn, ripple, band, prototype, digital)
    }

    /// Design an IIR filter and multiply it out to BA coefficients.
    pub fn design_iir_ba(
        &mut self,
        order: usize,
        wn: &[F],
        ripple: Option<F>,
        band: FilterBandType,
        prototype: FilterType,
        digital: bool,
    ) -> Result<BaFormatFilter<F>, ConfigError> {
        let zpk = self.design_iir_zpk(order, wn, ripple, band, prototype, digital)?;
        Ok(zpk2tf(&zpk.z, &zpk.p, zpk.k))
    }

    /// Design an IIR filter and pair it into second-order sections.
    pub fn design_iir_sos(
        &mut self,
        order: usize,
        wn: &[F],
        ripple: Option<F>,
        band: FilterBandType,
        prototype: FilterType,
        digital: bool,
    ) -> Result<SosFormatFilter<F>, ConfigError> {
        let zpk = self.design_iir_zpk(order, wn, ripple, band, prototype, digital)?;
        zpk2sos(zpk, None)
    }

    /// Design a windowed FIR filter. `order + 1` taps are requested; for
    /// highpass and bandstop bands an even count is promoted, so check the
    /// returned length.
    pub fn design_fir(
        &mut self,
        order: usize,
        cutoff: &[F],
        band: FilterBandType,
        window: FirWindow<F>,
    ) -> Result<FirFormatFilter<F>, ConfigError> {
        if order < 4 {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "FIR design order must be at least 4",
            });
        }
        let params = FirDesignParams {
            numtaps: order + 1,
            cutoff: cutoff.to_vec(),
            band,
            window,
        };
        if let Some((_, fir)) = self.fir_cache.iter().find(|(p, _)| *p == params) {
            return Ok(fir.clone());
        }
        let fir = firwin(order + 1, band, cutoff, window)?;
        self.fir_cache.push((params, fir.clone()));
        Ok(fir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::filter::design::default_tolerance;

    #[test]
    fn iir_designs_are_cached() {
        let mut designer = FilterDesigner::<f64>::new();
        let a = designer
            .design_iir(
                4,
                &[0.25],
                None,
                FilterBandType::Lowpass,
                FilterType::Butterworth,
                true,
            )
            .expect("design");
        assert_eq!(designer.iir_cache.len(), 1);
        let b = designer
            .design_iir(
                4,
                &[0.25],
                None,
                FilterBandType::Lowpass,
                FilterType::Butterworth,
                true,
            )
            .expect("design");
        assert_eq!(designer.iir_cache.len(), 1);
        assert!(a.approx_eq(&b, default_tolerance()));

        designer
            .design_iir(
                4,
                &[0.3],
                None,
                FilterBandType::Lowpass,
                FilterType::Butterworth,
                true,
            )
            .expect("design");
        assert_eq!(designer.iir_cache.len(), 2);
    }

    #[test]
    fn fir_designs_are_cached_and_validated() {
        let mut designer = FilterDesigner::<f64>::new();
        let err = designer
            .design_fir(3, &[0.2], FilterBandType::Lowpass, FirWindow::Hamming)
            .expect_err("short order");
        assert!(matches!(err, ConfigError::InvalidArgument { arg: "order", .. }));

        let a = designer
            .design_fir(30, &[0.2], FilterBandType::Lowpass, FirWindow::Hamming)
            .expect("design");
        let b = designer
            .design_fir(30, &[0.2], FilterBandType::Lowpass, FirWindow::Hamming)
            .expect("design");
        assert_eq!(designer.fir_cache.len(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn clear_erases_designs() {
        let mut designer = FilterDesigner::<f64>::new();
        designer
            .design_fir(30, &[0.2], FilterBandType::Lowpass, FirWindow::Hamming)
            .expect("design");
        designer.clear();
        assert!(designer.fir_cache.is_empty());
    }

    #[test]
    fn sos_and_ba_outputs_share_the_zpk_cache() {
        let mut designer = FilterDesigner::<f64>::new();
        designer
            .design_iir_ba(
                4,
                &[0.2],
                None,
                FilterBandType::Highpass,
                FilterType::Butterworth,
                true,
            )
            .expect("design");
        designer
            .design_iir_sos(
                4,
                &[0.2],
                None,
                FilterBandType::Highpass,
                FilterType::Butterworth,
                true,
            )
            .expect("design");
        assert_eq!(designer.iir_cache.len(), 1);
    }
}
