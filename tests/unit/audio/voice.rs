use super::*;

fn sine(freq: f64, rate: u32, secs: f64) -> AudioBuffer {
    let frames = (f64::from(rate) * secs) as usize;
    let samples = (0..frames)
        .map(|i| (0.5 * (std::f64::consts::TAU * freq * i as f64 / f64::from(rate)).sin()) as f32)
        .collect();
    AudioBuffer::new(rate, 1, samples).unwrap()
}

fn ramp(frames: usize) -> AudioBuffer {
    AudioBuffer::new(
        1_000,
        1,
        (0..frames).map(|i| i as f32 / frames as f32).collect(),
    )
    .unwrap()
}

#[test]
fn none_is_identity() {
    let input = sine(440.0, 8_000, 0.1);
    let out = apply_voice_effect(&input, VoiceEffect::None).unwrap();
    assert_eq!(out, input);
}

#[test]
fn output_matches_input_shape() {
    let input = AudioBuffer::new(8_000, 2, vec![0.1; 2 * 800]).unwrap();
    for effect in [VoiceEffect::Chipmunk, VoiceEffect::Deep, VoiceEffect::Robotic] {
        let out = apply_voice_effect(&input, effect).unwrap();
        assert_eq!(out.sample_rate, input.sample_rate);
        assert_eq!(out.channels, input.channels);
        assert_eq!(out.frames(), input.frames());
    }
}

#[test]
fn chipmunk_plays_faster_and_pads_with_silence() {
    let input = ramp(300);
    let out = apply_voice_effect(&input, VoiceEffect::Chipmunk).unwrap();
    assert!((out.sample(100, 0) - input.sample(150, 0)).abs() < 1e-6);
    assert_eq!(out.sample(200, 0), 0.0);
    assert_eq!(out.sample(299, 0), 0.0);
}

#[test]
fn deep_plays_slower_and_is_truncated() {
    let input = ramp(300);
    let out = apply_voice_effect(&input, VoiceEffect::Deep).unwrap();
    assert!((out.sample(100, 0) - input.sample(70, 0)).abs() < 1e-6);
    let last = out.sample(299, 0);
    assert!(last > 0.69 && last < 0.7);
}

#[test]
fn robotic_keeps_center_and_cuts_lows() {
    let rate = 16_000;
    let center = apply_voice_effect(&sine(1_000.0, rate, 0.5), VoiceEffect::Robotic).unwrap();
    let low = apply_voice_effect(&sine(80.0, rate, 0.5), VoiceEffect::Robotic).unwrap();
    let tail = |b: &AudioBuffer| {
        let s: Vec<f32> = b.channel(0).skip(4_000).collect();
        s.iter().map(|v| v.abs()).fold(0.0f32, f32::max)
    };
    assert!((tail(&center) - 0.5).abs() < 0.02);
    assert!(tail(&low) < 0.06);
}

#[test]
fn input_is_untouched() {
    let input = ramp(100);
    let before = input.clone();
    let _ = apply_voice_effect(&input, VoiceEffect::Robotic).unwrap();
    assert_eq!(input, before);
}
