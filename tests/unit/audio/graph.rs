use super::*;

fn ramp(frames: usize, rate: u32) -> Arc<AudioBuffer> {
    let samples = (0..frames).map(|i| i as f32 / frames as f32).collect();
    Arc::new(AudioBuffer::new(rate, 1, samples).unwrap())
}

fn constant(value: f32, frames: usize, channels: u16, rate: u32) -> Arc<AudioBuffer> {
    Arc::new(AudioBuffer::new(rate, channels, vec![value; frames * usize::from(channels)]).unwrap())
}

#[test]
fn unit_rate_mono_to_stereo_copies_samples() {
    let src = ramp(100, 1_000);
    let mut g = OfflineGraph::new(2, 100, 1_000).unwrap();
    g.connect(BufferSource::new(src.clone())).unwrap();
    let out = g.render().unwrap();
    assert_eq!(out.channels, 2);
    for i in 0..100 {
        assert_eq!(out.sample(i, 0), src.sample(i, 0));
        assert_eq!(out.sample(i, 1), src.sample(i, 0));
    }
}

#[test]
fn sources_are_summed_with_gain() {
    let mut g = OfflineGraph::new(2, 10, 1_000).unwrap();
    g.connect(BufferSource::new(constant(0.25, 10, 2, 1_000)).gain(1.0)).unwrap();
    g.connect(BufferSource::new(constant(0.5, 10, 2, 1_000)).gain(0.5)).unwrap();
    let out = g.render().unwrap();
    assert!(out.samples.iter().all(|s| (*s - 0.5).abs() < 1e-6));
}

#[test]
fn zero_gain_mutes_source() {
    let mut g = OfflineGraph::new(1, 10, 1_000).unwrap();
    g.connect(BufferSource::new(constant(0.9, 10, 1, 1_000)).gain(0.0)).unwrap();
    assert!(g.render().unwrap().samples.iter().all(|s| *s == 0.0));
}

#[test]
fn start_time_delays_playback() {
    let mut g = OfflineGraph::new(1, 100, 100).unwrap();
    g.connect(BufferSource::new(constant(0.5, 100, 1, 100)).start_at(0.3)).unwrap();
    let out = g.render().unwrap();
    assert_eq!(out.sample(29, 0), 0.0);
    assert_eq!(out.sample(30, 0), 0.5);
    assert_eq!(out.sample(99, 0), 0.5);
}

#[test]
fn faster_rate_ends_early_slower_rate_stretches() {
    let src = constant(0.5, 100, 1, 100);
    let mut fast = OfflineGraph::new(1, 100, 100).unwrap();
    fast.connect(BufferSource::new(src.clone()).playback_rate(2.0)).unwrap();
    let fast = fast.render().unwrap();
    assert_eq!(fast.sample(49, 0), 0.5);
    assert_eq!(fast.sample(50, 0), 0.0);

    let mut slow = OfflineGraph::new(1, 100, 100).unwrap();
    slow.connect(BufferSource::new(ramp(100, 100)).playback_rate(0.5)).unwrap();
    let slow = slow.render().unwrap();
    assert!((slow.sample(99, 0) - 0.495).abs() < 1e-3);
}

#[test]
fn offset_and_duration_select_a_window() {
    let mut g = OfflineGraph::new(1, 100, 100).unwrap();
    g.connect(BufferSource::new(ramp(100, 100)).offset(0.5).duration(0.2)).unwrap();
    let out = g.render().unwrap();
    assert!((out.sample(0, 0) - 0.5).abs() < 1e-6);
    assert!((out.sample(19, 0) - 0.69).abs() < 1e-6);
    assert_eq!(out.sample(20, 0), 0.0);
}

#[test]
fn source_rate_is_converted() {
    let mut g = OfflineGraph::new(1, 200, 200).unwrap();
    g.connect(BufferSource::new(constant(0.5, 100, 1, 100))).unwrap();
    let out = g.render().unwrap();
    assert_eq!(out.sample(199, 0), 0.5);
}

#[test]
fn output_is_clamped() {
    let mut g = OfflineGraph::new(1, 10, 100).unwrap();
    g.connect(BufferSource::new(constant(0.8, 10, 1, 100))).unwrap();
    g.connect(BufferSource::new(constant(0.8, 10, 1, 100))).unwrap();
    assert!(g.render().unwrap().samples.iter().all(|s| *s == 1.0));
}

#[test]
fn stereo_downmix_averages() {
    let b = Arc::new(AudioBuffer::new(100, 2, vec![1.0, 0.0, 1.0, 0.0]).unwrap());
    let mut g = OfflineGraph::new(1, 2, 100).unwrap();
    g.connect(BufferSource::new(b)).unwrap();
    assert_eq!(g.render().unwrap().samples, vec![0.5, 0.5]);
}

#[test]
fn invalid_sources_are_rejected() {
    let mut g = OfflineGraph::new(1, 10, 100).unwrap();
    let src = constant(0.1, 10, 1, 100);
    assert!(g.connect(BufferSource::new(src.clone()).playback_rate(0.0)).is_err());
    assert!(g.connect(BufferSource::new(src.clone()).start_at(-1.0)).is_err());
    assert!(g.connect(BufferSource::new(src).gain(f32::NAN)).is_err());
    assert!(OfflineGraph::new(0, 10, 100).is_err());
    assert_eq!(OfflineGraph::with_duration(2, 1.5, 100).unwrap().frames, 150);
}
