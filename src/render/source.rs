//! Frame sources feeding the compositor.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::assets::decode::{PreparedImage, decode_any_image};
use crate::assets::media::{self, VideoSourceInfo};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::PaintImage;

/// Frames decoded per ffmpeg call.
pub const DEFAULT_PREFETCH_FRAMES: u32 = 16;
/// Frames kept in the LRU.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Supplies the picture shown at a given source time.
pub trait FrameSource: Send {
    /// Source picture size in pixels.
    fn size(&self) -> (u32, u32);

    /// Picture at `source_time` seconds. Times past the end yield the last picture.
    fn frame_at(&mut self, source_time: f64) -> ReelResult<PaintImage>;

    /// Playable length in seconds, when known. Rendering stops once it is reached.
    fn duration(&self) -> Option<f64> {
        None
    }
}

/// A single picture shown at every time.
#[derive(Clone, Debug)]
pub struct StillSource {
    image: PaintImage,
}

impl StillSource {
    /// Source showing `image`.
    pub fn new(image: &PreparedImage) -> ReelResult<Self> {
        Ok(Self {
            image: PaintImage::from_prepared(image)?,
        })
    }

    /// Decode an encoded raster or SVG picture.
    pub fn from_bytes(bytes: &[u8], target_edge_px: u32) -> ReelResult<Self> {
        Self::new(&decode_any_image(bytes, target_edge_px)?)
    }
}

impl FrameSource for StillSource {
    fn size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    fn frame_at(&mut self, _source_time: f64) -> ReelResult<PaintImage> {
        Ok(self.image.clone())
    }
}

/// Decodes video frames with `ffmpeg` in batches, keeping an LRU of recent frames keyed by source
/// frame index.
pub struct FfmpegVideoSource {
    info: Arc<VideoSourceInfo>,
    frame_cache: HashMap<u64, PaintImage>,
    lru: VecDeque<u64>,
    capacity: usize,
    prefetch_frames: u32,
    timeout: Duration,
    last_frame: Option<PaintImage>,
}

impl FfmpegVideoSource {
    /// Source for a video whose stream info is already known.
    pub fn new(info: VideoSourceInfo, timeout: Duration) -> Self {
        Self {
            info: Arc::new(info),
            frame_cache: HashMap::new(),
            lru: VecDeque::new(),
            capacity: DEFAULT_CACHE_CAPACITY,
            prefetch_frames: DEFAULT_PREFETCH_FRAMES,
            timeout,
            last_frame: None,
        }
    }

    /// Probe `path` and open it.
    pub fn open(path: &std::path::Path, timeout: Duration) -> ReelResult<Self> {
        Ok(Self::new(media::probe_video(path, timeout)?, timeout))
    }

    /// Decode `frames` per batch; the cache grows to hold two batches.
    pub fn with_prefetch_frames(mut self, frames: u32) -> Self {
        self.prefetch_frames = frames.max(1);
        self.capacity = self.capacity.max(frames as usize * 2);
        self
    }

    /// Stream info of the video.
    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }

    fn key_for_time(&self, source_time: f64) -> u64 {
        let fps = self.info.source_fps();
        if !(fps.is_finite() && fps > 0.0) {
            return 0;
        }
        (source_time.max(0.0) * fps + 1e-6).floor() as u64
    }

    fn prefetch_for_key(&mut self, key: u64) -> ReelResult<()> {
        let fps = self.info.source_fps().max(f64::MIN_POSITIVE);
        let batch = u64::from(self.prefetch_frames);
        let start_key = key / batch * batch;
        let frames = media::decode_video_frames_rgba8(
            &self.info,
            start_key as f64 / fps,
            self.prefetch_frames,
            self.timeout,
        )?;
        tracing::trace!(start_key, decoded = frames.len(), "video batch decoded");

        for (offset, rgba) in frames.into_iter().enumerate() {
            let k = start_key + offset as u64;
            if self.frame_cache.contains_key(&k) {
                self.touch(k);
                continue;
            }
            let prepared = PreparedImage::from_straight_rgba8(self.info.width, self.info.height, rgba)?;
            let image = PaintImage::from_prepared(&prepared)?;
            self.insert_frame(k, image);
        }
        Ok(())
    }

    fn insert_frame(&mut self, key: u64, image: PaintImage) {
        self.frame_cache.insert(key, image);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.frame_cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    fn nearest_cached_at_or_before(&self, key: u64) -> Option<PaintImage> {
        self.frame_cache
            .iter()
            .filter(|(k, _)| **k <= key)
            .max_by_key(|(k, _)| **k)
            .map(|(_, img)| img.clone())
    }
}

impl FrameSource for FfmpegVideoSource {
    fn size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn duration(&self) -> Option<f64> {
        Some(self.info.duration_sec).filter(|d| d.is_finite() && *d > 0.0)
    }

    fn frame_at(&mut self, source_time: f64) -> ReelResult<PaintImage> {
        let key = self.key_for_time(source_time);
        if !self.frame_cache.contains_key(&key) {
            self.prefetch_for_key(key)?;
        }
        let image = match self.frame_cache.get(&key).cloned() {
            Some(img) => {
                self.touch(key);
                img
            }
            None => self
                .nearest_cached_at_or_before(key)
                .or_else(|| self.last_frame.clone())
                .ok_or_else(|| {
                    ReelError::media_decode(format!(
                        "no video frame decodable at {source_time:.3}s in '{}'",
                        self.info.source_path.display()
                    ))
                })?,
        };
        self.last_frame = Some(image.clone());
        Ok(image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/source.rs"]
mod tests;
