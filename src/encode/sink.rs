use std::path::PathBuf;

use crate::encode::output::EncodedMedia;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::FrameRGBA;

/// Mime type reported by sinks that keep raw frames instead of encoding them.
pub const RAW_FRAMES_MIME: &str = "video/x-raw";

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Raw PCM track to encode alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Interleaved `f32le` PCM file input.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Raw PCM file.
    pub path: PathBuf,
    /// Frames per second of the PCM.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

/// Consumer of composed frames.
///
/// `push_frame` is called with strictly increasing indices; sinks reject anything else.
pub trait FrameSink: Send {
    /// Start a stream; called once before any frame.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Consume frame `idx`.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Finalize the stream and return the encoded result.
    fn end(&mut self) -> ReelResult<EncodedMedia>;
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration received by `begin`, if called.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames received so far, in order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// True once `end` has run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("in-memory sink not started"))?;
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(ReelError::encode(format!(
                "out-of-order frame {} after {}",
                idx.0, last.0
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<EncodedMedia> {
        if self.cfg.is_none() {
            return Err(ReelError::encode("in-memory sink not started"));
        }
        self.finished = true;
        Ok(EncodedMedia::new(Vec::new(), RAW_FRAMES_MIME))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
