//! Video/audio IO through the system `ffprobe` and `ffmpeg` binaries.
//!
//! Every external call runs under a time budget: the child is killed and reaped when it overruns,
//! and its pipes are drained on background threads so a chatty decoder never blocks.

use std::path::{Path, PathBuf};
#[cfg(feature = "media-ffmpeg")]
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use crate::audio::buffer::AudioBuffer;
use crate::foundation::error::{ReelError, ReelResult};

#[cfg(not(feature = "media-ffmpeg"))]
const FEATURE_DISABLED: &str = "video/audio media require the 'media-ffmpeg' feature";

/// Stream layout of a probed media file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaProbe {
    /// Inspected file.
    pub source_path: PathBuf,
    /// Container duration in seconds, `0.0` when unknown.
    pub duration_sec: f64,
    /// First video stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// Whether the file carries an audio stream.
    pub has_audio: bool,
}

/// Geometry and rate of a video stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoStreamInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate numerator.
    pub fps_num: u32,
    /// Frame rate denominator.
    pub fps_den: u32,
}

/// A decodable video source.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Video file on disk.
    pub source_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate numerator.
    pub fps_num: u32,
    /// Frame rate denominator.
    pub fps_den: u32,
    /// Duration in seconds, `0.0` when the container does not say.
    pub duration_sec: f64,
    /// Whether the file carries an audio stream.
    pub has_audio: bool,
}

impl VideoSourceInfo {
    /// Source frame rate, `0.0` for a zero denominator.
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Bytes in one decoded RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Probe a video file; fails with `MediaDecode` when it has no video stream.
pub fn probe_video(source_path: &Path, timeout: Duration) -> ReelResult<VideoSourceInfo> {
    let probe = probe_media(source_path, timeout)?;
    let video = probe.video.ok_or_else(|| {
        ReelError::media_decode(format!(
            "no video stream found in '{}'",
            source_path.display()
        ))
    })?;
    Ok(VideoSourceInfo {
        source_path: probe.source_path,
        width: video.width,
        height: video.height,
        fps_num: video.fps_num,
        fps_den: video.fps_den,
        duration_sec: probe.duration_sec,
        has_audio: probe.has_audio,
    })
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_media(source_path: &Path, timeout: Duration) -> ReelResult<MediaProbe> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(source_path);
    let out = run_with_timeout(&mut cmd, timeout, "ffprobe")?;
    if !out.status.success() {
        return Err(ReelError::media_decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::media_decode(format!("ffprobe json parse failed: {e}")))?;

    let video = match parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    {
        Some(s) => {
            let width = s
                .width
                .ok_or_else(|| ReelError::media_decode("missing video width from ffprobe"))?;
            let height = s
                .height
                .ok_or_else(|| ReelError::media_decode("missing video height from ffprobe"))?;
            let (fps_num, fps_den) = parse_ff_ratio(s.r_frame_rate.as_deref().unwrap_or("0/1"))
                .filter(|(n, _)| *n > 0)
                .ok_or_else(|| ReelError::media_decode("invalid video r_frame_rate"))?;
            Some(VideoStreamInfo {
                width,
                height,
                fps_num,
                fps_den,
            })
        }
        None => None,
    };

    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or_else(|| parsed.streams.iter().find_map(|s| s.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaProbe {
        source_path: source_path.to_path_buf(),
        duration_sec,
        video,
        has_audio,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_media(_source_path: &Path, _timeout: Duration) -> ReelResult<MediaProbe> {
    Err(ReelError::media_decode(FEATURE_DISABLED))
}

/// Decode up to `frame_count` consecutive source frames starting at `start_time_sec`.
///
/// Frames are straight RGBA8 at the source resolution. Fewer frames are returned near the end
/// of the stream.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_video_frames_rgba8(
    source: &VideoSourceInfo,
    start_time_sec: f64,
    frame_count: u32,
    timeout: Duration,
) -> ReelResult<Vec<Vec<u8>>> {
    if frame_count == 0 {
        return Ok(Vec::new());
    }
    let expected_len = source.frame_len();
    if expected_len == 0 {
        return Err(ReelError::media_decode(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }

    let mut cmd = Command::new("ffmpeg");
    cmd.args([
        "-v",
        "error",
        "-ss",
        &format!("{:.6}", start_time_sec.max(0.0)),
    ])
    .arg("-i")
    .arg(&source.source_path)
    .args([
        "-frames:v",
        &frame_count.to_string(),
        "-an",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "pipe:1",
    ]);
    let out = run_with_timeout(&mut cmd, timeout, "ffmpeg video decode")?;
    if !out.status.success() {
        return Err(ReelError::media_decode(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(expected_len) {
        return Err(ReelError::media_decode(format!(
            "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
            out.stdout.len()
        )));
    }

    Ok(out
        .stdout
        .chunks_exact(expected_len)
        .take(frame_count as usize)
        .map(<[u8]>::to_vec)
        .collect())
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video_frames_rgba8(
    _source: &VideoSourceInfo,
    _start_time_sec: f64,
    _frame_count: u32,
    _timeout: Duration,
) -> ReelResult<Vec<Vec<u8>>> {
    Err(ReelError::media_decode(FEATURE_DISABLED))
}

/// Decode the first audio stream of `path` as interleaved `f32` at the given rate and layout.
///
/// A file without an audio stream decodes to an empty buffer.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio_f32(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    timeout: Duration,
) -> ReelResult<AudioBuffer> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ]);
    let out = run_with_timeout(&mut cmd, timeout, "ffmpeg audio decode")?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("does not contain any stream")
        {
            return AudioBuffer::new(sample_rate, channels, Vec::new());
        }
        return Err(ReelError::media_decode(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    AudioBuffer::from_f32le_bytes(sample_rate, channels, &out.stdout)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio_f32(
    _path: &Path,
    _sample_rate: u32,
    _channels: u16,
    _timeout: Duration,
) -> ReelResult<AudioBuffer> {
    Err(ReelError::media_decode(FEATURE_DISABLED))
}

/// Replace the audio of `video_path` with raw `f32le` PCM, copying the video stream.
#[cfg(feature = "media-ffmpeg")]
pub fn mux_audio_into_webm(
    video_path: &Path,
    pcm_path: &Path,
    sample_rate: u32,
    channels: u16,
    out_path: &Path,
    timeout: Duration,
) -> ReelResult<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-v", "error", "-i"])
        .arg(video_path)
        .args([
            "-f",
            "f32le",
            "-ar",
            &sample_rate.to_string(),
            "-ac",
            &channels.to_string(),
            "-i",
        ])
        .arg(pcm_path)
        .args([
            "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", "libopus", "-shortest", "-f",
            "webm",
        ])
        .arg(out_path);
    let out = run_with_timeout(&mut cmd, timeout, "ffmpeg audio mux")?;
    if !out.status.success() {
        return Err(ReelError::encode(format!(
            "ffmpeg audio mux failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn mux_audio_into_webm(
    _video_path: &Path,
    _pcm_path: &Path,
    _sample_rate: u32,
    _channels: u16,
    _out_path: &Path,
    _timeout: Duration,
) -> ReelResult<()> {
    Err(ReelError::encoding_unsupported(FEATURE_DISABLED))
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run `cmd` to completion, killing it once `timeout` elapses.
#[cfg(feature = "media-ffmpeg")]
pub(crate) fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
    what: &str,
) -> ReelResult<Output> {
    use std::io::Read;
    use std::time::Instant;

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| {
        ReelError::media_decode(format!(
            "failed to spawn {what} (is ffmpeg installed and on PATH?): {e}"
        ))
    })?;

    let drain = |pipe: Option<Box<dyn Read + Send>>| {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            if let Some(mut p) = pipe {
                p.read_to_end(&mut bytes)?;
            }
            Ok::<_, std::io::Error>(bytes)
        })
    };
    let stdout_drain = drain(
        child
            .stdout
            .take()
            .map(|p| Box::new(p) as Box<dyn Read + Send>),
    );
    let stderr_drain = drain(
        child
            .stderr
            .take()
            .map(|p| Box::new(p) as Box<dyn Read + Send>),
    );

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_drain.join();
                    let _ = stderr_drain.join();
                    tracing::warn!(what, timeout_s = timeout.as_secs_f64(), "killed overrunning child");
                    return Err(ReelError::timeout(format!(
                        "{what} exceeded {:.1}s",
                        timeout.as_secs_f64()
                    )));
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReelError::media_decode(format!("failed to wait for {what}: {e}")));
            }
        }
    };

    let join = |h: std::thread::JoinHandle<std::io::Result<Vec<u8>>>| {
        h.join()
            .map_err(|_| ReelError::media_decode(format!("{what} pipe drain thread panicked")))?
            .map_err(|e| ReelError::media_decode(format!("{what} pipe read failed: {e}")))
    };
    let stdout = join(stdout_drain)?;
    let stderr = join(stderr_drain)?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

#[cfg(feature = "media-ffmpeg")]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
