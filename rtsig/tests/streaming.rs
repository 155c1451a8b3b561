//! Packet-schedule equivalence and end-to-end filtering scenarios.
//!
//! The central contract: for every streaming filter, concatenating the
//! real-time outputs over arbitrarily chopped packets reproduces the
//! post-processing block run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rtsig::kernel::{ProcessingMode, StreamLifecycle};
use rtsig::linalg::polynomial_roots;
use rtsig::signal::filter::design::{
    butter, default_tolerance, zpk2sos, zpk2tf, DigitalFilter, FilterBandType, FilterOutputType,
    FirWindow, Sos, SosFormatFilter, ZpkFormatFilter, firwin,
};
use rtsig::signal::sfilt::{
    Downsample, DownsampleConfig, FirFilter, FirFilterConfig, IirFilter, IirFilterConfig,
    IirImplementation, MedianFilter, MedianFilterConfig, MultiRateFirFilter, MultiRateFirConfig,
    SosFilter, SosFilterConfig,
};
use rtsig::signal::traits::StreamFilter1D;

const FIXED_PACKET_SIZES: [usize; 15] = [
    1, 2, 3, 16, 64, 100, 200, 512, 1000, 1024, 1200, 2048, 4000, 4096, 5000,
];

/// Deterministic ~12k-sample synthetic seismogram: a few narrowband
/// arrivals over LCG noise, sampled at 200 Hz.
fn seismogram(n: usize) -> Vec<f64> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..n)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let noise = ((state >> 33) as f64 / (1u64 << 30) as f64) - 1.0;
            let t = i as f64 / 200.0;
            let burst = (-((t - 20.0) / 8.0).powi(2)).exp();
            3.0 * (2.0 * std::f64::consts::PI * 1.5 * t).sin()
                + 1.2 * burst * (2.0 * std::f64::consts::PI * 7.0 * t).sin()
                + 0.4 * noise
        })
        .collect()
}

fn run_schedule<I>(
    filter: &mut dyn StreamFilter1D<f64>,
    x: &[f64],
    mut sizes: I,
) -> Vec<f64>
where
    I: Iterator<Item = usize>,
{
    let mut out = Vec::with_capacity(4 * x.len());
    let mut pos = 0usize;
    while pos < x.len() {
        let len = sizes.next().expect("schedule").min(x.len() - pos);
        let mut buf = vec![0.0f64; 4 * len + 64];
        let n = filter
            .apply(&x[pos..pos + len], &mut buf)
            .expect("apply should succeed");
        out.extend_from_slice(&buf[..n]);
        pos += len;
    }
    out
}

/// Assert that every fixed and random packet schedule reproduces the
/// post-processing block run within `tol`.
fn assert_streaming_equivalence<M>(make: M, x: &[f64], tol: f64)
where
    M: Fn(ProcessingMode) -> Box<dyn StreamFilter1D<f64>>,
{
    let mut post = make(ProcessingMode::PostProcessing);
    let mut reference = vec![0.0f64; 4 * x.len() + 64];
    let n_ref = post.apply(x, &mut reference).expect("block run");
    let reference = &reference[..n_ref];

    for &size in &FIXED_PACKET_SIZES {
        let mut rt = make(ProcessingMode::RealTime);
        let streamed = run_schedule(rt.as_mut(), x, std::iter::repeat(size));
        assert_eq!(streamed.len(), n_ref, "packet size {size}");
        for (i, (s, r)) in streamed.iter().zip(reference.iter()).enumerate() {
            assert!(
                (s - r).abs() <= tol,
                "packet size {size}, sample {i}: {s} vs {r}"
            );
        }
    }

    let mut rng = StdRng::seed_from_u64(0x0515_7a7e);
    for round in 0..2 {
        let sizes: Vec<usize> = (0..x.len()).map(|_| rng.random_range(1..=50)).collect();
        let mut rt = make(ProcessingMode::RealTime);
        let streamed = run_schedule(rt.as_mut(), x, sizes.into_iter());
        assert_eq!(streamed.len(), n_ref, "random schedule {round}");
        for (i, (s, r)) in streamed.iter().zip(reference.iter()).enumerate() {
            assert!(
                (s - r).abs() <= tol,
                "random schedule {round}, sample {i}: {s} vs {r}"
            );
        }
    }
}

fn butter_ba(order: usize, wn: f64) -> (Vec<f64>, Vec<f64>) {
    match butter(order, &[wn], FilterBandType::Lowpass, false, FilterOutputType::Ba)
        .expect("design")
    {
        DigitalFilter::Ba(ba) => (ba.b, ba.a),
        _ => panic!("expected ba"),
    }
}

fn butter_sos(order: usize, w1: f64, w2: f64) -> Vec<Sos<f64>> {
    match butter(
        order,
        &[w1, w2],
        FilterBandType::Bandpass,
        false,
        FilterOutputType::Sos,
    )
    .expect("design")
    {
        DigitalFilter::Sos(sos) => sos.sos,
        _ => panic!("expected sos"),
    }
}

#[test]
fn fir_streaming_equivalence() {
    let x = seismogram(12_000);
    let taps = firwin(
        64,
        FilterBandType::Lowpass,
        &[0.17],
        FirWindow::Hamming,
    )
    .expect("design")
    .taps;
    assert_streaming_equivalence(
        move |mode| {
            let mut f = FirFilter::new();
            f.initialize(FirFilterConfig {
                taps: taps.clone(),
                mode,
            })
            .expect("initialize");
            Box::new(f)
        },
        &x,
        1e-10,
    );
}

#[test]
fn iir_streaming_equivalence_both_realizations() {
    let x = seismogram(12_000);
    let (b, a) = butter_ba(4, 0.15);
    for implementation in [IirImplementation::Df2Transposed, IirImplementation::Df2Fast] {
        let b = b.clone();
        let a = a.clone();
        assert_streaming_equivalence(
            move |mode| {
                let mut f = IirFilter::new();
                f.initialize(IirFilterConfig {
                    b: b.clone(),
                    a: a.clone(),
                    mode,
                    implementation,
                })
                .expect("initialize");
                Box::new(f)
            },
            &x,
            1e-10,
        );
    }
}

#[test]
fn sos_streaming_equivalence() {
    let x = seismogram(12_000);
    let sections = butter_sos(4, 10.0 / 100.0, 35.0 / 100.0);
    assert_streaming_equivalence(
        move |mode| {
            let mut f = SosFilter::new();
            f.initialize(SosFilterConfig {
                sos: sections.clone(),
                mode,
            })
            .expect("initialize");
            Box::new(f)
        },
        &x,
        1e-10,
    );
}

#[test]
fn median_streaming_equivalence() {
    // S4: window 11 over the reference signal with the full schedule.
    let x = seismogram(12_000);
    assert_streaming_equivalence(
        |mode| {
            let mut f = MedianFilter::new();
            f.initialize(MedianFilterConfig { window: 11, mode })
                .expect("initialize");
            Box::new(f)
        },
        &x,
        1e-10,
    );
}

#[test]
fn downsample_streaming_equivalence() {
    // S3: post equals x[0::q]; every schedule reproduces it exactly.
    let x = seismogram(12_000);
    for q in 1..=7usize {
        let mut post = Downsample::new();
        post.initialize(DownsampleConfig {
            factor: q,
            mode: ProcessingMode::PostProcessing,
        })
        .expect("initialize");
        let mut y = vec![0.0f64; x.len()];
        let n = post.apply(&x, &mut y).expect("apply");
        let expected: Vec<f64> = x.iter().copied().step_by(q).collect();
        assert_eq!(&y[..n], expected.as_slice());

        assert_streaming_equivalence(
            move |mode| {
                let mut f = Downsample::new();
                f.initialize(DownsampleConfig { factor: q, mode })
                    .expect("initialize");
                Box::new(f)
            },
            &x,
            0.0,
        );
    }
}

#[test]
fn multirate_streaming_equivalence() {
    let x = seismogram(6_000);
    let taps = firwin(
        31,
        FilterBandType::Lowpass,
        &[0.4],
        FirWindow::Hamming,
    )
    .expect("design")
    .taps;
    for (up, down) in [(2usize, 3usize), (3, 2), (1, 4), (4, 1)] {
        let taps = taps.clone();
        assert_streaming_equivalence(
            move |mode| {
                let mut f = MultiRateFirFilter::new();
                f.initialize(MultiRateFirConfig {
                    up,
                    down,
                    taps: taps.clone(),
                    mode,
                })
                .expect("initialize");
                Box::new(f)
            },
            &x,
            1e-10,
        );
    }
}

#[test]
fn f32_streaming_equivalence_with_loose_tolerance() {
    let x64 = seismogram(4_000);
    let x: Vec<f32> = x64.iter().map(|v| *v as f32).collect();
    let sections64 = butter_sos(2, 0.1, 0.35);
    let sections: Vec<Sos<f32>> = sections64
        .iter()
        .map(|s| {
            Sos::new(
                [s.b[0] as f32, s.b[1] as f32, s.b[2] as f32],
                [s.a[0] as f32, s.a[1] as f32, s.a[2] as f32],
            )
        })
        .collect();

    let mut post = SosFilter::new();
    post.initialize(SosFilterConfig {
        sos: sections.clone(),
        mode: ProcessingMode::PostProcessing,
    })
    .expect("initialize");
    let mut reference = vec![0.0f32; x.len()];
    post.apply(&x, &mut reference).expect("apply");

    for &size in &FIXED_PACKET_SIZES {
        let mut rt = SosFilter::new();
        rt.initialize(SosFilterConfig {
            sos: sections.clone(),
            mode: ProcessingMode::RealTime,
        })
        .expect("initialize");
        let mut streamed = vec![0.0f32; x.len()];
        let mut pos = 0usize;
        while pos < x.len() {
            let len = size.min(x.len() - pos);
            let n = rt
                .apply(&x[pos..pos + len], &mut streamed[pos..pos + len])
                .expect("apply");
            pos += n;
        }
        for (s, r) in streamed.iter().zip(reference.iter()) {
            assert!((s - r).abs() <= 1e-5, "packet size {size}");
        }
    }
}

#[test]
fn bandpass_keeps_an_in_band_tone() {
    use dasp_signal::{rate, Signal};

    // 25 Hz tone at 1666 Hz through a 10-50 Hz bandpass.
    let sample_hz = 1666.0;
    let mut signal = rate(sample_hz).const_hz(25.0).sine();
    let x: Vec<f64> = (0..10 * sample_hz as usize).map(|_| signal.next()).collect();

    let sections = butter_sos(4, 10.0 / 833.0, 50.0 / 833.0);
    let mut filter = SosFilter::new();
    filter
        .initialize(SosFilterConfig {
            sos: sections,
            mode: ProcessingMode::PostProcessing,
        })
        .expect("initialize");
    let mut y = vec![0.0f64; x.len()];
    filter.apply(&x, &mut y).expect("apply");

    let steady = &y[y.len() / 2..];
    let rms = (steady.iter().map(|v| v * v).sum::<f64>() / steady.len() as f64).sqrt();
    let input_rms = (0.5f64).sqrt();
    assert!(
        (rms - input_rms).abs() < 0.05 * input_rms,
        "in-band tone attenuated: rms {rms} vs {input_rms}"
    );
}

#[test]
fn reset_matches_fresh_instance() {
    // After reset_initial_conditions, the next apply reproduces a freshly
    // initialized instance on the same input.
    let x = seismogram(2_000);
    let sections = butter_sos(3, 0.05, 0.3);

    let mut veteran = SosFilter::new();
    veteran
        .initialize(SosFilterConfig {
            sos: sections.clone(),
            mode: ProcessingMode::RealTime,
        })
        .expect("initialize");
    let mut scratch = vec![0.0f64; x.len()];
    veteran.apply(&x, &mut scratch).expect("warm up");
    veteran.reset_initial_conditions().expect("reset");
    let mut after_reset = vec![0.0f64; x.len()];
    veteran.apply(&x, &mut after_reset).expect("apply");

    let mut fresh = SosFilter::new();
    fresh
        .initialize(SosFilterConfig {
            sos: sections,
            mode: ProcessingMode::RealTime,
        })
        .expect("initialize");
    let mut fresh_out = vec![0.0f64; x.len()];
    fresh.apply(&x, &mut fresh_out).expect("apply");

    assert_eq!(after_reset, fresh_out);
}

#[test]
fn zpk_ba_round_trip_recovers_roots() {
    // Chebyshev II keeps every root simple, so the companion-matrix
    // recovery is well conditioned.
    let zpk = match rtsig::signal::filter::design::iirfilter(
        5usize,
        &[0.3f64],
        Some(40.0),
        FilterBandType::Lowpass,
        rtsig::signal::filter::design::FilterType::ChebyshevII,
        false,
        FilterOutputType::Zpk,
    )
    .expect("design")
    {
        DigitalFilter::Zpk(zpk) => zpk,
        _ => panic!("expected zpk"),
    };
    let ba = zpk2tf(&zpk.z, &zpk.p, zpk.k);

    let z_back = polynomial_roots(&ba.b).expect("zero roots");
    let p_back = polynomial_roots(&ba.a).expect("pole roots");
    let recovered = ZpkFormatFilter::new(z_back, p_back, ba.b[0] / ba.a[0]);
    assert!(
        recovered.approx_eq(&zpk, 1e-8),
        "round-tripped roots diverged"
    );
}

#[test]
fn zpk_sos_ba_matches_direct_expansion() {
    let zpk = match butter(
        5usize,
        &[0.22f64],
        FilterBandType::Lowpass,
        false,
        FilterOutputType::Zpk,
    )
    .expect("design")
    {
        DigitalFilter::Zpk(zpk) => zpk,
        _ => panic!("expected zpk"),
    };
    let direct = zpk2tf(&zpk.z, &zpk.p, zpk.k);
    let sos = zpk2sos(zpk, None).expect("pairing");
    let expanded = sos.to_ba();
    assert_eq!(expanded.b.len(), direct.b.len());
    for (x, r) in expanded.b.iter().zip(direct.b.iter()) {
        assert!((x - r).abs() <= 1e-8);
    }
    for (x, r) in expanded.a.iter().zip(direct.a.iter()) {
        assert!((x - r).abs() <= 1e-8);
    }
}

#[test]
fn seven_section_impulse_response_reference() {
    // S1: literal Butterworth-derived sections and the offline reference.
    let bs: [f64; 21] = [
        6.37835424e-05, 6.37835424e-05, 0.00000000e+00,
        1.00000000e+00, -1.78848938e+00, 1.00000000e+00,
        1.00000000e+00, -1.93118487e+00, 1.00000000e+00,
        1.00000000e+00, -1.95799864e+00, 1.00000000e+00,
        1.00000000e+00, -1.96671846e+00, 1.00000000e+00,
        1.00000000e+00, -1.97011885e+00, 1.00000000e+00,
        1.00000000e+00, -1.97135784e+00, 1.00000000e+00,
    ];
    let a_s: [f64; 21] = [
        1.00000000e+00, -9.27054679e-01, 0.00000000e+00,
        1.00000000e+00, -1.87008942e+00, 8.78235919e-01,
        1.00000000e+00, -1.90342568e+00, 9.17455718e-01,
        1.00000000e+00, -1.93318668e+00, 9.52433552e-01,
        1.00000000e+00, -1.95271141e+00, 9.75295685e-01,
        1.00000000e+00, -1.96423610e+00, 9.88608056e-01,
        1.00000000e+00, -1.97157693e+00, 9.96727086e-01,
    ];
    let yref: [f64; 40] = [
        6.37835424e-05, 1.23511272e-04, 1.34263690e-04, 1.78634911e-04, 2.50312740e-04,
        3.46332848e-04, 4.66239952e-04, 6.11416691e-04, 7.84553129e-04, 9.89232232e-04,
        1.22960924e-03, 1.51016546e-03, 1.83551947e-03, 2.21028135e-03, 2.63893773e-03,
        3.12575784e-03, 3.67471270e-03, 4.28940130e-03, 4.97297977e-03, 5.72809028e-03,
        6.55678845e-03, 7.46046851e-03, 8.43978671e-03, 9.49458408e-03, 1.06238101e-02,
        1.18254496e-02, 1.30964547e-02, 1.44326848e-02, 1.58288573e-02, 1.72785101e-02,
        1.87739799e-02, 2.03063976e-02, 2.18657022e-02, 2.34406756e-02, 2.50189979e-02,
        2.65873261e-02, 2.81313940e-02, 2.96361349e-02, 3.10858256e-02, 3.24642512e-02,
    ];

    let sections = SosFormatFilter::from_coefficients(7, &bs, &a_s).expect("valid sections");
    let mut filter = SosFilter::new();
    filter
        .initialize(SosFilterConfig {
            sos: sections.sos,
            mode: ProcessingMode::PostProcessing,
        })
        .expect("initialize");

    let mut impulse = [0.0f64; 40];
    impulse[0] = 1.0;
    let mut y = [0.0f64; 40];
    filter.apply(&impulse, &mut y).expect("apply");
    for (i, (a, r)) in y.iter().zip(yref.iter()).enumerate() {
        assert!((a - r).abs() <= 1e-8, "sample {i}: {a} vs {r}");
    }
}

#[test]
fn mixed_precision_packets_widen_then_narrow() {
    // An f64 caller driving an f32-configured filter converts at the
    // boundary; the result tracks the all-f64 run at single precision.
    let x = seismogram(512);
    let (b, a) = butter_ba(2, 0.25);

    let mut f64_filter = IirFilter::new();
    f64_filter
        .initialize(IirFilterConfig {
            b: b.clone(),
            a: a.clone(),
            mode: ProcessingMode::PostProcessing,
            implementation: IirImplementation::Df2Transposed,
        })
        .expect("initialize");
    let mut reference = vec![0.0f64; x.len()];
    f64_filter.apply(&x, &mut reference).expect("apply");

    let mut f32_filter = IirFilter::new();
    f32_filter
        .initialize(IirFilterConfig {
            b: b.iter().map(|v| *v as f32).collect(),
            a: a.iter().map(|v| *v as f32).collect(),
            mode: ProcessingMode::PostProcessing,
            implementation: IirImplementation::Df2Transposed,
        })
        .expect("initialize");
    let mut x32 = vec![0.0f32; x.len()];
    rtsig_core::num_rs::convert(&x, &mut x32);
    let mut y32 = vec![0.0f32; x.len()];
    f32_filter.apply(&x32, &mut y32).expect("apply");
    let mut narrowed = vec![0.0f64; x.len()];
    rtsig_core::num_rs::convert(&y32, &mut narrowed);

    for (n, r) in narrowed.iter().zip(reference.iter()) {
        assert!((n - r).abs() <= 1e-3);
    }
}

#[test]
fn representation_equality_tolerance_defaults() {
    let zpk = match butter(
        2usize,
        &[0.4f64],
        FilterBandType::Lowpass,
        false,
        FilterOutputType::Zpk,
    )
    .expect("design")
    {
        DigitalFilter::Zpk(zpk) => zpk,
        _ => panic!("expected zpk"),
    };
    let mut nudged = zpk.clone();
    nudged.k += 1e-14;
    assert!(zpk.approx_eq(&nudged, default_tolerance()));
    nudged.k += 1e-9;
    assert!(!zpk.approx_eq(&nudged, default_tolerance()));
}
