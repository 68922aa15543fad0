//! Non-realtime audio graph: buffer sources with gain and an optional band-pass, summed into a
//! fixed-length destination.

use std::sync::Arc;

use crate::audio::biquad::{BiquadCoeffs, filter_interleaved};
use crate::audio::buffer::AudioBuffer;
use crate::foundation::error::{ReelError, ReelResult};

/// Band-pass Q used when a source is routed through a filter.
pub const DEFAULT_FILTER_Q: f64 = 1.0;

/// One scheduled buffer playback.
#[derive(Clone, Debug)]
pub struct BufferSource {
    buffer: Arc<AudioBuffer>,
    playback_rate: f64,
    start_sec: f64,
    offset_sec: f64,
    duration_sec: Option<f64>,
    gain: f32,
    band_pass_hz: Option<f64>,
}

impl BufferSource {
    /// Source playing all of `buffer` from time zero at unity gain and rate.
    pub fn new(buffer: Arc<AudioBuffer>) -> Self {
        Self {
            buffer,
            playback_rate: 1.0,
            start_sec: 0.0,
            offset_sec: 0.0,
            duration_sec: None,
            gain: 1.0,
            band_pass_hz: None,
        }
    }

    /// Resampling factor; pitch and duration shift together.
    pub fn playback_rate(mut self, rate: f64) -> Self {
        self.playback_rate = rate;
        self
    }

    /// Destination time at which playback begins.
    pub fn start_at(mut self, secs: f64) -> Self {
        self.start_sec = secs;
        self
    }

    /// Position in the buffer at which playback begins.
    pub fn offset(mut self, secs: f64) -> Self {
        self.offset_sec = secs;
        self
    }

    /// Amount of buffer time to play.
    pub fn duration(mut self, secs: f64) -> Self {
        self.duration_sec = Some(secs);
        self
    }

    /// Linear gain applied to every sample.
    pub fn gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Route the source through a band-pass centered at `center_hz`.
    pub fn band_pass(mut self, center_hz: f64) -> Self {
        self.band_pass_hz = Some(center_hz);
        self
    }

    fn validate(&self) -> ReelResult<()> {
        if !(self.playback_rate.is_finite() && self.playback_rate > 0.0) {
            return Err(ReelError::validation("playback rate must be > 0"));
        }
        if !(self.start_sec.is_finite() && self.start_sec >= 0.0) {
            return Err(ReelError::validation("source start must be >= 0"));
        }
        if !(self.offset_sec.is_finite() && self.offset_sec >= 0.0) {
            return Err(ReelError::validation("source offset must be >= 0"));
        }
        if let Some(d) = self.duration_sec
            && !(d.is_finite() && d >= 0.0)
        {
            return Err(ReelError::validation("source duration must be >= 0"));
        }
        if !self.gain.is_finite() {
            return Err(ReelError::validation("source gain must be finite"));
        }
        Ok(())
    }
}

/// Offline destination of `frames` frames at `sample_rate` with `channels` channels.
#[derive(Debug)]
pub struct OfflineGraph {
    sample_rate: u32,
    channels: u16,
    frames: usize,
    sources: Vec<BufferSource>,
}

impl OfflineGraph {
    /// Empty graph of exactly `frames` frames.
    pub fn new(channels: u16, frames: usize, sample_rate: u32) -> ReelResult<Self> {
        if sample_rate == 0 || channels == 0 {
            return Err(ReelError::validation(
                "offline graph needs a non-zero sample rate and channel count",
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
            frames,
            sources: Vec::new(),
        })
    }

    /// Graph whose length covers `secs` seconds.
    pub fn with_duration(channels: u16, secs: f64, sample_rate: u32) -> ReelResult<Self> {
        if !(secs.is_finite() && secs >= 0.0) {
            return Err(ReelError::validation("graph duration must be >= 0"));
        }
        let frames = (secs * f64::from(sample_rate)).round() as usize;
        Self::new(channels, frames, sample_rate)
    }

    /// Add a source; it is summed into the destination on render.
    pub fn connect(&mut self, source: BufferSource) -> ReelResult<()> {
        source.validate()?;
        self.sources.push(source);
        Ok(())
    }

    /// Render every source and sum them into the destination.
    pub fn render(self) -> ReelResult<AudioBuffer> {
        let out_ch = usize::from(self.channels);
        let mut out = vec![0.0f32; self.frames * out_ch];
        for src in &self.sources {
            let mut track = self.render_source(src);
            if let Some(hz) = src.band_pass_hz {
                let coeffs = BiquadCoeffs::band_pass(self.sample_rate, hz, DEFAULT_FILTER_Q)?;
                filter_interleaved(&mut track, self.channels, &coeffs);
            }
            for (o, t) in out.iter_mut().zip(&track) {
                *o += *t * src.gain;
            }
        }
        for s in &mut out {
            *s = s.clamp(-1.0, 1.0);
        }
        AudioBuffer::new(self.sample_rate, self.channels, out)
    }

    fn render_source(&self, src: &BufferSource) -> Vec<f32> {
        let out_ch = usize::from(self.channels);
        let mut track = vec![0.0f32; self.frames * out_ch];
        let buf = src.buffer.as_ref();
        let src_frames = buf.frames();
        if src_frames == 0 {
            return track;
        }

        let out_rate = f64::from(self.sample_rate);
        let in_rate = f64::from(buf.sample_rate);
        let step = src.playback_rate * in_rate / out_rate;
        let start_frame = (src.start_sec * out_rate).round() as usize;
        let begin = src.offset_sec * in_rate;
        let end = match src.duration_sec {
            Some(d) => (begin + d * in_rate).min(src_frames as f64),
            None => src_frames as f64,
        };

        for i in start_frame..self.frames {
            let pos = begin + (i - start_frame) as f64 * step;
            if pos >= end {
                break;
            }
            let i0 = pos.floor() as usize;
            let frac = (pos - pos.floor()) as f32;
            let i1 = (i0 + 1).min(src_frames - 1);
            let frame = &mut track[i * out_ch..(i + 1) * out_ch];
            for (ch, o) in frame.iter_mut().enumerate() {
                let a = mapped_sample(buf, i0, ch, out_ch);
                let b = mapped_sample(buf, i1, ch, out_ch);
                *o = a + (b - a) * frac;
            }
        }
        track
    }
}

/// Sample for output channel `ch`, up-mixing mono and down-mixing to mono by averaging.
fn mapped_sample(buf: &AudioBuffer, frame: usize, ch: usize, out_ch: usize) -> f32 {
    let in_ch = usize::from(buf.channels);
    if in_ch == out_ch {
        return buf.sample(frame, ch as u16);
    }
    if in_ch == 1 {
        return buf.sample(frame, 0);
    }
    if out_ch == 1 {
        let sum: f32 = (0..buf.channels).map(|c| buf.sample(frame, c)).sum();
        return sum / in_ch as f32;
    }
    if ch < in_ch {
        buf.sample(frame, ch as u16)
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/graph.rs"]
mod tests;
