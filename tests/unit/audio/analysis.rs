use std::path::{Path, PathBuf};

use super::*;
use crate::encode::output::EncodedMedia;

#[test]
fn windows_average_absolute_amplitude() {
    let samples = vec![0.5, -0.5, 1.0, -1.0, 0.25];
    let b = AudioBuffer::new(20, 1, samples).unwrap();
    let env = volume_envelope(&b, 0.1).unwrap();
    assert_eq!(env, vec![0.5, 1.0, 0.25]);
}

#[test]
fn only_channel_zero_is_measured() {
    let b = AudioBuffer::new(10, 2, vec![0.2, 1.0, -0.4, 1.0]).unwrap();
    let env = volume_envelope(&b, 0.2).unwrap();
    assert_eq!(env.len(), 1);
    assert!((env[0] - 0.3).abs() < 1e-6);
}

#[test]
fn empty_buffer_has_empty_envelope() {
    let b = AudioBuffer::silent(44_100, 1, 0).unwrap();
    assert!(volume_envelope(&b, 0.1).unwrap().is_empty());
}

#[test]
fn degenerate_windows_are_rejected() {
    let b = AudioBuffer::silent(5, 1, 10).unwrap();
    assert!(volume_envelope(&b, 0.0).is_err());
    assert!(volume_envelope(&b, 0.1).is_err());
}

struct ToneCodec;

impl MediaCodec for ToneCodec {
    fn decode_audio(&self, _: &EncodedMedia, _: u32, _: u16) -> ReelResult<AudioBuffer> {
        Err(ReelError::media_decode("unused"))
    }

    fn decode_audio_file(&self, path: &Path, rate: u32, channels: u16) -> ReelResult<AudioBuffer> {
        if path != Path::new("tone.wav") {
            return Err(ReelError::media_decode("no such file"));
        }
        let frames = rate as usize;
        AudioBuffer::new(rate, channels, vec![0.25; frames * usize::from(channels)])
    }

    fn media_duration(&self, _: &EncodedMedia) -> ReelResult<f64> {
        Ok(0.0)
    }

    fn mux_audio(&self, v: &EncodedMedia, _: &AudioBuffer) -> ReelResult<EncodedMedia> {
        Ok(v.clone())
    }
}

struct Passthrough;

impl AssetResolver for Passthrough {
    fn local_path(&self, url: &str) -> ReelResult<PathBuf> {
        Ok(PathBuf::from(url))
    }
}

#[test]
fn analyze_audio_uses_tenth_second_windows() {
    let env = analyze_audio(&Passthrough, &ToneCodec, "tone.wav").unwrap();
    assert_eq!(env.len(), 10);
    assert!(env.iter().all(|v| (*v - 0.25).abs() < 1e-6));
}

#[test]
fn analyze_audio_propagates_decode_errors() {
    let err = analyze_audio(&Passthrough, &ToneCodec, "missing.wav").unwrap_err();
    assert!(matches!(err, ReelError::MediaDecode(_)));
}

/// Stereo file with a full-scale left channel and a silent right channel.
struct LeftOnlyCodec {
    requested: std::sync::Mutex<Vec<u16>>,
}

impl MediaCodec for LeftOnlyCodec {
    fn decode_audio(&self, _: &EncodedMedia, _: u32, _: u16) -> ReelResult<AudioBuffer> {
        Err(ReelError::media_decode("unused"))
    }

    fn decode_audio_file(&self, _: &Path, rate: u32, channels: u16) -> ReelResult<AudioBuffer> {
        self.requested.lock().unwrap().push(channels);
        let frames = rate as usize;
        let samples = match channels {
            1 => vec![0.5; frames],
            _ => (0..frames)
                .flat_map(|_| {
                    let mut frame = vec![0.0; usize::from(channels)];
                    frame[0] = 1.0;
                    frame
                })
                .collect(),
        };
        AudioBuffer::new(rate, channels, samples)
    }

    fn media_duration(&self, _: &EncodedMedia) -> ReelResult<f64> {
        Ok(0.0)
    }

    fn mux_audio(&self, v: &EncodedMedia, _: &AudioBuffer) -> ReelResult<EncodedMedia> {
        Ok(v.clone())
    }
}

#[test]
fn analyze_audio_measures_the_first_channel_without_downmix() {
    let codec = LeftOnlyCodec {
        requested: std::sync::Mutex::new(Vec::new()),
    };
    let env = analyze_audio(&Passthrough, &codec, "stereo.wav").unwrap();
    assert_eq!(*codec.requested.lock().unwrap(), vec![ANALYSIS_CHANNELS]);
    assert_eq!(env.len(), 10);
    assert!(env.iter().all(|v| (*v - 1.0).abs() < 1e-6));
}
