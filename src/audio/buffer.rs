use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};

/// Interleaved `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// `frames * channels` samples, frame-major.
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    /// Buffer over `samples`; the length must be a whole number of frames.
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> ReelResult<Self> {
        if sample_rate == 0 {
            return Err(ReelError::validation("audio sample_rate must be > 0"));
        }
        if channels == 0 {
            return Err(ReelError::validation("audio channels must be > 0"));
        }
        if !samples.len().is_multiple_of(usize::from(channels)) {
            return Err(ReelError::validation(format!(
                "audio sample count {} is not a multiple of {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    /// Buffer of `frames` zero frames.
    pub fn silent(sample_rate: u32, channels: u16, frames: usize) -> ReelResult<Self> {
        let len = frames
            .checked_mul(usize::from(channels))
            .ok_or_else(|| ReelError::validation("audio buffer size overflow"))?;
        Self::new(sample_rate, channels, vec![0.0; len])
    }

    /// Parse little-endian `f32` PCM as produced by `ffmpeg -f f32le`.
    pub fn from_f32le_bytes(sample_rate: u32, channels: u16, bytes: &[u8]) -> ReelResult<Self> {
        if !bytes.len().is_multiple_of(4) {
            return Err(ReelError::media_decode(
                "decoded audio byte length is not aligned to f32 samples",
            ));
        }
        let mut samples: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        // Drop a trailing partial frame rather than rejecting the stream.
        let whole = samples.len() - samples.len() % usize::from(channels.max(1));
        samples.truncate(whole);
        Self::new(sample_rate, channels, samples)
    }

    /// Samples as raw little-endian `f32le` bytes, the layout ffmpeg reads.
    pub fn to_f32le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Write the samples as raw `f32le` for an encoder input.
    pub fn write_f32le(&self, path: &Path) -> ReelResult<()> {
        std::fs::write(path, self.to_f32le_bytes()).map_err(|e| {
            ReelError::encode(format!(
                "failed to write pcm to '{}': {e}",
                path.display()
            ))
        })
    }

    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// True when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `frame` on `channel`; zero outside the buffer.
    pub fn sample(&self, frame: usize, channel: u16) -> f32 {
        if channel >= self.channels {
            return 0.0;
        }
        self.samples
            .get(frame * usize::from(self.channels) + usize::from(channel))
            .copied()
            .unwrap_or(0.0)
    }

    /// Samples of one channel in frame order.
    pub fn channel(&self, channel: u16) -> impl Iterator<Item = f32> + '_ {
        let stride = usize::from(self.channels);
        let offset = usize::from(channel.min(self.channels.saturating_sub(1)));
        self.samples.iter().skip(offset).step_by(stride).copied()
    }

    /// Mean absolute amplitude over every sample.
    pub fn mean_abs(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|s| f64::from(s.abs())).sum();
        (sum / self.samples.len() as f64) as f32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/buffer.rs"]
mod tests;
