//! Audio decode and mux seam between the mixer and the media backend.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::assets::media;
use crate::audio::buffer::AudioBuffer;
use crate::encode::output::EncodedMedia;
use crate::foundation::error::{ReelError, ReelResult};

/// Decodes audio out of media and muxes audio tracks into encoded video.
pub trait MediaCodec: Send + Sync {
    /// Decode the audio of in-memory media. Media without an audio stream yields an empty buffer.
    fn decode_audio(
        &self,
        media: &EncodedMedia,
        sample_rate: u32,
        channels: u16,
    ) -> ReelResult<AudioBuffer>;

    /// Decode the audio of a local file.
    fn decode_audio_file(
        &self,
        path: &Path,
        sample_rate: u32,
        channels: u16,
    ) -> ReelResult<AudioBuffer>;

    /// Container duration in seconds.
    fn media_duration(&self, media: &EncodedMedia) -> ReelResult<f64>;

    /// Replace the audio track of `video` with `audio`, keeping the video stream as is.
    fn mux_audio(&self, video: &EncodedMedia, audio: &AudioBuffer) -> ReelResult<EncodedMedia>;
}

/// [`MediaCodec`] backed by the system `ffmpeg`/`ffprobe` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegCodec {
    timeout: Duration,
}

impl FfmpegCodec {
    /// Codec whose ffmpeg calls are killed after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for FfmpegCodec {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}

fn spill(media: &EncodedMedia) -> ReelResult<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("reelkit-")
        .suffix(media.extension())
        .tempfile()
        .map_err(|e| ReelError::media_decode(format!("create temp media file: {e}")))?;
    file.write_all(&media.bytes)
        .and_then(|()| file.flush())
        .map_err(|e| ReelError::media_decode(format!("write temp media file: {e}")))?;
    Ok(file)
}

impl MediaCodec for FfmpegCodec {
    fn decode_audio(
        &self,
        media: &EncodedMedia,
        sample_rate: u32,
        channels: u16,
    ) -> ReelResult<AudioBuffer> {
        let file = spill(media)?;
        self.decode_audio_file(file.path(), sample_rate, channels)
    }

    fn decode_audio_file(
        &self,
        path: &Path,
        sample_rate: u32,
        channels: u16,
    ) -> ReelResult<AudioBuffer> {
        media::decode_audio_f32(path, sample_rate, channels, self.timeout)
    }

    fn media_duration(&self, media: &EncodedMedia) -> ReelResult<f64> {
        let file = spill(media)?;
        Ok(media::probe_media(file.path(), self.timeout)?.duration_sec)
    }

    fn mux_audio(&self, video: &EncodedMedia, audio: &AudioBuffer) -> ReelResult<EncodedMedia> {
        let input = spill(video)?;
        let dir = tempfile::tempdir()
            .map_err(|e| ReelError::encode(format!("create mux temp dir: {e}")))?;
        let pcm = dir.path().join("mix.f32le");
        audio.write_f32le(&pcm)?;
        let out = dir.path().join("muxed.webm");
        media::mux_audio_into_webm(
            input.path(),
            &pcm,
            audio.sample_rate,
            audio.channels,
            &out,
            self.timeout,
        )?;
        let bytes = std::fs::read(&out)
            .map_err(|e| ReelError::encode(format!("read muxed output: {e}")))?;
        Ok(EncodedMedia::webm(bytes))
    }
}
