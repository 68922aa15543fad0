//! Coarse loudness envelopes for waveform display.

use crate::assets::resolve::AssetResolver;
use crate::audio::buffer::AudioBuffer;
use crate::audio::codec::MediaCodec;
use crate::foundation::error::{ReelError, ReelResult};

/// Window length used by [`analyze_audio`].
pub const ANALYSIS_WINDOW_SECS: f64 = 0.1;
/// Sample rate used when decoding for analysis.
pub const ANALYSIS_SAMPLE_RATE: u32 = 44_100;
/// Channels requested when decoding for analysis; only channel 0 is measured.
pub const ANALYSIS_CHANNELS: u16 = 2;

/// Mean absolute amplitude of channel 0 over consecutive windows of `window_sec`.
///
/// The final window may be shorter than the others. An empty buffer yields an empty envelope.
pub fn volume_envelope(buffer: &AudioBuffer, window_sec: f64) -> ReelResult<Vec<f32>> {
    if !(window_sec.is_finite() && window_sec > 0.0) {
        return Err(ReelError::validation("analysis window must be > 0"));
    }
    let window = (f64::from(buffer.sample_rate) * window_sec).floor() as usize;
    if window == 0 {
        return Err(ReelError::validation(format!(
            "analysis window of {window_sec}s is shorter than one sample at {} Hz",
            buffer.sample_rate
        )));
    }

    let channel: Vec<f32> = buffer.channel(0).collect();
    Ok(channel
        .chunks(window)
        .map(|w| w.iter().map(|s| s.abs()).sum::<f32>() / w.len() as f32)
        .collect())
}

/// Decode the audio at `url` and return its 0.1 s volume envelope.
#[tracing::instrument(skip(resolver, codec))]
pub fn analyze_audio(
    resolver: &dyn AssetResolver,
    codec: &dyn MediaCodec,
    url: &str,
) -> ReelResult<Vec<f32>> {
    let path = resolver.local_path(url)?;
    let buffer = codec.decode_audio_file(&path, ANALYSIS_SAMPLE_RATE, ANALYSIS_CHANNELS)?;
    let envelope = volume_envelope(&buffer, ANALYSIS_WINDOW_SECS)?;
    tracing::debug!(windows = envelope.len(), "audio analyzed");
    Ok(envelope)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/analysis.rs"]
mod tests;
