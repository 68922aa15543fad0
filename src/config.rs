//! Render configuration.
//!
//! Every field has a default matching the short-video output profile (1080x1920 portrait WebM at
//! 30 fps), so an empty JSON object is a valid configuration. A few fields can be overridden from
//! the environment with [`RenderConfig::with_env_overrides`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Font file used for captions and text cards.
pub const ENV_FONT: &str = "REELKIT_FONT";
/// Decode/mux timeout in seconds.
pub const ENV_DECODE_TIMEOUT_SECS: &str = "REELKIT_DECODE_TIMEOUT_SECS";

/// How a source frame is mapped onto its destination rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFit {
    /// Stretch to the destination, ignoring aspect ratio.
    #[default]
    Fill,
    /// Scale to fit inside the destination (letterbox).
    Contain,
    /// Scale to cover the destination (crop).
    Cover,
}

/// Caption drawing style shared by every caption.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionStyle {
    /// Drop shadow color, straight RGBA8.
    pub shadow_rgba: [u8; 4],
    /// Drop shadow blur in pixels (canvas `shadowBlur` semantics).
    pub shadow_blur_px: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            shadow_rgba: [0, 0, 0, 204],
            shadow_blur_px: 4.0,
        }
    }
}

/// Layout of the text-mode card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextCardStyle {
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Distance between consecutive line centers.
    pub line_height_px: f32,
    /// Total horizontal margin; lines never exceed `canvas.width - margin_px`.
    pub margin_px: f32,
    /// Background color, straight RGBA8.
    pub background_rgba: [u8; 4],
    /// Text color, straight RGBA8.
    pub text_rgba: [u8; 4],
}

impl Default for TextCardStyle {
    fn default() -> Self {
        Self {
            font_size_px: 64.0,
            line_height_px: 80.0,
            margin_px: 100.0,
            background_rgba: [0, 0, 0, 255],
            text_rgba: [255, 255, 255, 255],
        }
    }
}

/// Parameters of a compose run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output surface size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: u32,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,
    /// Mapping of source frames onto the canvas.
    pub source_fit: SourceFit,
    /// Sticker edge length at scale 1.
    pub sticker_base_px: f64,
    /// Caption styling.
    pub caption: CaptionStyle,
    /// Text card styling.
    pub text_card: TextCardStyle,
    /// Font file for captions and text cards. `None` uses a bold sans-serif system font.
    pub font_path: Option<PathBuf>,
    /// Chroma key color for green-screen substitution.
    pub chroma_key_rgb: [u8; 3],
    /// Sample rate of the offline audio graph.
    pub mix_sample_rate: u32,
    /// Fixed gain applied to the voiceover track.
    pub voiceover_gain: f32,
    /// Upper bound for a single decode or mux call.
    pub decode_timeout_secs: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::PORTRAIT_1080,
            fps: 30,
            video_bitrate: 5_000_000,
            source_fit: SourceFit::Fill,
            sticker_base_px: 64.0,
            caption: CaptionStyle::default(),
            text_card: TextCardStyle::default(),
            font_path: None,
            chroma_key_rgb: [0, 255, 0],
            mix_sample_rate: 48_000,
            voiceover_gain: 0.8,
            decode_timeout_secs: 120.0,
        }
    }
}

impl RenderConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ReelError::serde(format!("invalid config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `REELKIT_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(font) = std::env::var_os(ENV_FONT).filter(|v| !v.is_empty()) {
            self.font_path = Some(PathBuf::from(font));
        }
        if let Some(secs) = std::env::var(ENV_DECODE_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            self.decode_timeout_secs = secs;
        }
        self
    }

    /// Validate value ranges.
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.ensure_drawable()?;
        Fps::new(self.fps, 1)?;
        if !(self.sticker_base_px.is_finite() && self.sticker_base_px > 0.0) {
            return Err(ReelError::validation("sticker_base_px must be > 0"));
        }
        if !(self.caption.shadow_blur_px.is_finite() && self.caption.shadow_blur_px >= 0.0) {
            return Err(ReelError::validation("caption shadow_blur_px must be >= 0"));
        }
        let card = &self.text_card;
        if !(card.font_size_px.is_finite() && card.font_size_px > 0.0) {
            return Err(ReelError::validation("text_card font_size_px must be > 0"));
        }
        if !(card.line_height_px.is_finite() && card.line_height_px > 0.0) {
            return Err(ReelError::validation("text_card line_height_px must be > 0"));
        }
        if !(card.margin_px.is_finite()
            && card.margin_px >= 0.0
            && card.margin_px < self.canvas.width as f32)
        {
            return Err(ReelError::validation(
                "text_card margin_px must be in [0, canvas.width)",
            ));
        }
        if self.mix_sample_rate == 0 {
            return Err(ReelError::validation("mix_sample_rate must be > 0"));
        }
        if !(self.voiceover_gain.is_finite() && self.voiceover_gain >= 0.0) {
            return Err(ReelError::validation("voiceover_gain must be >= 0"));
        }
        if !(self.decode_timeout_secs.is_finite() && self.decode_timeout_secs > 0.0) {
            return Err(ReelError::validation("decode_timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Output frame rate as a rational.
    pub fn output_fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Decode/mux time budget.
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.decode_timeout_secs)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
