use super::*;

fn sine(freq: f64, rate: u32, secs: f64) -> Vec<f32> {
    let n = (f64::from(rate) * secs) as usize;
    (0..n)
        .map(|i| (2.0 * PI * freq * i as f64 / f64::from(rate)).sin() as f32)
        .collect()
}

fn rms_tail(s: &[f32]) -> f64 {
    let tail = &s[s.len() / 2..];
    (tail.iter().map(|v| f64::from(*v).powi(2)).sum::<f64>() / tail.len() as f64).sqrt()
}

#[test]
fn unity_passes_input() {
    let c = BiquadCoeffs::unity();
    let mut st = BiquadState::new();
    assert_eq!(st.process(0.5, &c), 0.5);
    assert_eq!(st.process(-0.25, &c), -0.25);
}

#[test]
fn band_pass_keeps_center_and_attenuates_far_bands() {
    let rate = 48_000;
    let c = BiquadCoeffs::band_pass(rate, 1000.0, 1.0).unwrap();

    let mut center = sine(1000.0, rate, 0.5);
    filter_interleaved(&mut center, 1, &c);
    let mut low = sine(60.0, rate, 0.5);
    filter_interleaved(&mut low, 1, &c);
    let mut high = sine(12_000.0, rate, 0.5);
    filter_interleaved(&mut high, 1, &c);

    let unit = 1.0 / 2f64.sqrt();
    assert!((rms_tail(&center) - unit).abs() < 0.02);
    assert!(rms_tail(&low) < unit * 0.1);
    assert!(rms_tail(&high) < unit * 0.15);
}

#[test]
fn channels_have_independent_state() {
    let c = BiquadCoeffs::band_pass(8_000, 1000.0, 1.0).unwrap();
    let mut interleaved = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    filter_interleaved(&mut interleaved, 2, &c);
    assert!(interleaved[0] != 0.0);
    assert_eq!(interleaved[1], 0.0);
    assert_eq!(interleaved[3], 0.0);
}

#[test]
fn invalid_design_is_rejected() {
    assert!(BiquadCoeffs::band_pass(0, 1000.0, 1.0).is_err());
    assert!(BiquadCoeffs::band_pass(1_000, 1000.0, 1.0).is_err());
    assert!(BiquadCoeffs::band_pass(48_000, 1000.0, 0.0).is_err());
}
