//! WebM encoding through the system `ffmpeg`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::output::EncodedMedia;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// VP8 encoder name.
pub const VIDEO_CODEC: &str = "libvpx";
/// Opus encoder name.
pub const AUDIO_CODEC: &str = "libopus";

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// WebM file written by ffmpeg.
    pub out_path: PathBuf,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,
    /// Background used to flatten alpha, straight RGBA8.
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options flattening onto opaque black.
    pub fn new(out_path: impl Into<PathBuf>, video_bitrate: u32) -> Self {
        Self {
            out_path: out_path.into(),
            video_bitrate,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Streams raw frames into `ffmpeg` producing VP8/Opus WebM.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Sink that spawns ffmpeg on [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn spawn(&mut self, cfg: &SinkConfig) -> ReelResult<()> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let bitrate = self.opts.video_bitrate.to_string();
        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(ReelError::validation(
                    "audio sample_rate and channels must be non-zero",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-c:a", AUDIO_CODEC, "-shortest"]);
        } else {
            cmd.arg("-an");
        }
        cmd.args([
            "-c:v",
            VIDEO_CODEC,
            "-b:v",
            &bitrate,
            "-pix_fmt",
            "yuv420p",
            "-auto-alt-ref",
            "0",
            "-f",
            "webm",
        ])
        .arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::encoding_unsupported(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if !cfg!(feature = "media-ffmpeg") {
            return Err(ReelError::encoding_unsupported(
                "webm encoding requires the 'media-ffmpeg' feature",
            ));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (yuv420p output)",
            ));
        }
        if !has_encoder(VIDEO_CODEC) {
            return Err(ReelError::encoding_unsupported(format!(
                "ffmpeg with the {VIDEO_CODEC} encoder was not found on PATH"
            )));
        }
        ensure_parent_dir(&self.opts.out_path)?;

        self.spawn(&cfg)?;
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::encode(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn end(&mut self) -> ReelResult<EncodedMedia> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        self.cfg = None;

        let bytes = std::fs::read(&self.opts.out_path).map_err(|e| {
            ReelError::encode(format!(
                "failed to read encoded output '{}': {e}",
                self.opts.out_path.display()
            ))
        })?;
        tracing::debug!(bytes = bytes.len(), frames = self.last_idx.map_or(0, |i| i.0 + 1), "webm finalized");
        Ok(EncodedMedia::webm(bytes))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Return `true` when `ffmpeg` is on `PATH` and lists `encoder`.
pub fn has_encoder(encoder: &str) -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map(|out| {
            out.status.success()
                && String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .any(|l| l.split_whitespace().nth(1) == Some(encoder))
        })
        .unwrap_or(false)
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    let [bg_r, bg_g, bg_b, _] = bg_rgba.map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
