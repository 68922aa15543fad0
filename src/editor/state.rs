use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};

/// Speed multipliers offered by the speed tool.
pub const SPEED_PRESETS: [f64; 6] = [0.5, 0.75, 1.0, 1.5, 2.0, 3.0];

/// Per-pixel color filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// No filter.
    #[default]
    None,
    /// Grayscale: each channel becomes the RGB average.
    Bw,
    /// Sepia tone matrix, clamped at 255.
    Sepia,
    /// Contrast stretch by 1.5 around mid-gray.
    Contrast,
    /// Warm channel gains (1.1, 0.95, 0.85).
    Vintage,
    /// Cool channel gains (0.9, 1.0, 1.1).
    Cool,
}

/// Whole-frame effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// No effect.
    #[default]
    None,
    /// Gaussian blur.
    Blur,
    /// Black radial darkening toward the edges.
    Vignette,
    /// Random pixels replaced by noise.
    Glitch,
    /// Blocky nearest-neighbour downscale and upscale.
    Pixelate,
    /// Slight contrast and brightness boost.
    Sharpen,
}

/// Transform applied to the voiceover before mixing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEffect {
    /// Voiceover as recorded.
    #[default]
    None,
    /// Faster playback, higher pitch.
    Chipmunk,
    /// Slower playback, lower pitch.
    Deep,
    /// Narrow band-pass around 1 kHz.
    Robotic,
}

/// Side of the canvas the new recording occupies in a duet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuetPosition {
    /// Recording on the left half.
    #[default]
    Left,
    /// Recording on the right half.
    Right,
}

/// Kind of source handed to the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationMode {
    /// A recorded or uploaded clip.
    Video,
    /// A single still image.
    Photo,
    /// A generated text card.
    Text,
}

impl CreationMode {
    /// `true` for modes that produce a single still image.
    pub fn is_still(self) -> bool {
        matches!(self, Self::Photo | Self::Text)
    }
}

/// Kept time range of the source, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    /// Start in seconds.
    pub start: f64,
    /// End in seconds, after `start` for a usable window.
    pub end: f64,
}

impl TrimWindow {
    /// Length in seconds, never negative.
    pub fn duration(self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Position in percent of the frame (0..=100 on each axis).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal percent, 0 at the left edge.
    pub x: f64,
    /// Vertical percent, 0 at the top edge.
    pub y: f64,
}

impl Position {
    /// Middle of the frame.
    pub const CENTER: Position = Position { x: 50.0, y: 50.0 };

    /// Map the percent position to pixel coordinates.
    pub fn to_pixels(self, width: u32, height: u32) -> (f64, f64) {
        (
            self.x / 100.0 * f64::from(width),
            self.y / 100.0 * f64::from(height),
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Text overlay. `color` is a CSS-style hex color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Single line of text.
    pub text: String,
    /// Center of the text.
    pub position: Position,
    /// Font size in pixels.
    pub size: f32,
    /// Fill color, `#rgb` or `#rrggbb`.
    pub color: String,
}

impl Caption {
    /// Caption as the captions tool adds it: centered, 32 px, white.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: Position::CENTER,
            size: 32.0,
            color: "#ffffff".to_owned(),
        }
    }
}

/// Image overlay, `scale` multiplies the base sticker size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    /// Image location, resolved through the asset resolver.
    pub url: String,
    /// Center of the sticker.
    pub position: Position,
    /// Multiplier of the base sticker size.
    pub scale: f64,
}

impl Sticker {
    /// Sticker at the center at its base size.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            position: Position::CENTER,
            scale: 1.0,
        }
    }
}

/// Chroma key against green, with a replacement background image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreenScreen {
    /// Background image location.
    pub background_url: String,
    /// Normalized RGB distance below which a pixel is replaced.
    pub threshold: f64,
}

impl GreenScreen {
    /// Threshold used when none is chosen.
    pub const DEFAULT_THRESHOLD: f64 = 0.4;

    /// Green screen with the default threshold.
    pub fn new(background_url: impl Into<String>) -> Self {
        Self {
            background_url: background_url.into(),
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

/// A kept span of source time in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start in seconds.
    pub start: f64,
    /// End in seconds.
    pub end: f64,
}

/// Background music mixed under the original audio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSettings {
    /// Music file location.
    pub url: String,
    /// Seconds into the output at which the music starts.
    pub start_offset: f64,
    /// Gain of the source audio, `0.0..=1.0`.
    pub original_volume: f32,
    /// Gain of the music, `0.0..=1.0`.
    pub music_volume: f32,
}

impl MusicSettings {
    /// Music track as the sound tool adds it: starts at 0, original at full volume, music at half.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            start_offset: 0.0,
            original_volume: 1.0,
            music_volume: 0.5,
        }
    }
}

/// Recorded voiceover mixed over the video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoiceoverSettings {
    /// Voiceover file location.
    pub url: String,
    /// Effect applied before mixing.
    pub effect: VoiceEffect,
}

/// Side-by-side layout with another video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuetLayout {
    /// Identifier of the partner video.
    pub source_video_id: String,
    /// Side of the new recording.
    pub position: DuetPosition,
}

/// Every edit applied to one source media item.
///
/// Tools never patch a snapshot in place: each `with_*` call consumes the current state and
/// returns the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorState {
    /// Kept range of the source.
    pub trim: TrimWindow,
    /// Playback speed multiplier, `> 0`.
    pub speed: f64,
    /// Selected filters; at most one is active.
    pub filters: Vec<Filter>,
    /// Selected effects; at most one is active.
    pub effects: Vec<Effect>,
    /// Chroma key settings.
    pub green_screen: Option<GreenScreen>,
    /// Captions in draw order, later ones on top.
    pub captions: Vec<Caption>,
    /// Stickers in draw order, drawn above captions.
    pub stickers: Vec<Sticker>,
    /// Kept spans chosen by auto-cut; empty keeps the whole trim.
    pub auto_cut_segments: Vec<Segment>,
    /// Background music.
    pub music: Option<MusicSettings>,
    /// Voiceover track.
    pub voiceover: Option<VoiceoverSettings>,
    /// Duet layout.
    pub duet_layout: Option<DuetLayout>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// State at the start of an editing session: empty trim, normal speed, no edits.
    pub fn new() -> Self {
        Self {
            trim: TrimWindow::default(),
            speed: 1.0,
            filters: Vec::new(),
            effects: Vec::new(),
            green_screen: None,
            captions: Vec::new(),
            stickers: Vec::new(),
            auto_cut_segments: Vec::new(),
            music: None,
            voiceover: None,
            duet_layout: None,
        }
    }

    /// Correct the trim window once the source duration is known.
    pub fn with_source_duration(mut self, duration: f64) -> Self {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.trim = TrimWindow {
            start: 0.0,
            end: duration,
        };
        self
    }

    /// Set the trim window, clamped into `[0, duration]`.
    pub fn with_trim(mut self, start: f64, end: f64, duration: f64) -> Self {
        let duration = duration.max(0.0);
        let start = start.clamp(0.0, duration);
        let end = end.clamp(start, duration);
        self.trim = TrimWindow { start, end };
        self
    }

    /// Set the playback speed; rejects non-finite and non-positive values.
    pub fn with_speed(mut self, speed: f64) -> ReelResult<Self> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ReelError::validation(format!(
                "speed must be positive, got {speed}"
            )));
        }
        self.speed = speed;
        Ok(self)
    }

    /// Toggle a filter. Selecting the active filter clears it, any other replaces it.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters = toggle_single(&self.filters, filter);
        self
    }

    /// Toggle an effect with the same single-select rule as filters.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects = toggle_single(&self.effects, effect);
        self
    }

    /// Enable or clear the green screen.
    pub fn with_green_screen(mut self, green_screen: Option<GreenScreen>) -> Self {
        self.green_screen = green_screen;
        self
    }

    /// Append a caption on top of existing ones. Blank text is ignored.
    pub fn with_caption(mut self, caption: Caption) -> Self {
        if !caption.text.trim().is_empty() {
            self.captions.push(caption);
        }
        self
    }

    /// Remove the caption at `index`; out of range is a no-op.
    pub fn without_caption(mut self, index: usize) -> Self {
        if index < self.captions.len() {
            self.captions.remove(index);
        }
        self
    }

    /// Append a sticker on top of existing ones.
    pub fn with_sticker(mut self, sticker: Sticker) -> Self {
        self.stickers.push(sticker);
        self
    }

    /// Remove the sticker at `index`; out of range is a no-op.
    pub fn without_sticker(mut self, index: usize) -> Self {
        if index < self.stickers.len() {
            self.stickers.remove(index);
        }
        self
    }

    /// Replace the auto-cut segments.
    pub fn with_auto_cut_segments(mut self, segments: Vec<Segment>) -> Self {
        self.auto_cut_segments = segments;
        self
    }

    /// Set or clear the music track.
    pub fn with_music(mut self, music: Option<MusicSettings>) -> Self {
        self.music = music;
        self
    }

    /// Set or clear the voiceover.
    pub fn with_voiceover(mut self, voiceover: Option<VoiceoverSettings>) -> Self {
        self.voiceover = voiceover;
        self
    }

    /// Change the voiceover effect. No-op without a voiceover.
    pub fn with_voice_effect(mut self, effect: VoiceEffect) -> Self {
        if let Some(v) = self.voiceover.as_mut() {
            v.effect = effect;
        }
        self
    }

    /// Set or clear the duet layout.
    pub fn with_duet_layout(mut self, layout: Option<DuetLayout>) -> Self {
        self.duet_layout = layout;
        self
    }

    /// The filter to run, if any.
    pub fn active_filter(&self) -> Option<Filter> {
        self.filters.first().copied().filter(|f| *f != Filter::None)
    }

    /// The effect to run, if any.
    pub fn active_effect(&self) -> Option<Effect> {
        self.effects.first().copied().filter(|e| *e != Effect::None)
    }

    /// `true` when the rendered video must go through the audio mixer.
    pub fn needs_audio_mix(&self) -> bool {
        self.music.is_some() || self.voiceover.is_some()
    }

    /// Check every value the compositor relies on.
    pub fn validate_for_render(&self, mode: CreationMode) -> ReelResult<()> {
        if mode == CreationMode::Video {
            let TrimWindow { start, end } = self.trim;
            if !(start.is_finite() && end.is_finite() && start >= 0.0) {
                return Err(ReelError::validation(format!(
                    "trim window must be finite and non-negative, got [{start}, {end}]"
                )));
            }
            if end <= start {
                return Err(ReelError::validation(format!(
                    "trim end must be after start, got [{start}, {end}]"
                )));
            }
            if !(self.speed.is_finite() && self.speed > 0.0) {
                return Err(ReelError::validation(format!(
                    "speed must be positive, got {}",
                    self.speed
                )));
            }
            for seg in &self.auto_cut_segments {
                if !(seg.start.is_finite() && seg.end.is_finite() && seg.end > seg.start) {
                    return Err(ReelError::validation(format!(
                        "auto-cut segment [{}, {}] is empty",
                        seg.start, seg.end
                    )));
                }
            }
        }
        for (i, c) in self.captions.iter().enumerate() {
            if !(c.size.is_finite() && c.size > 0.0) {
                return Err(ReelError::validation(format!(
                    "caption {i} size must be > 0"
                )));
            }
        }
        for (i, s) in self.stickers.iter().enumerate() {
            if !(s.scale.is_finite() && s.scale > 0.0) {
                return Err(ReelError::validation(format!(
                    "sticker {i} scale must be > 0"
                )));
            }
        }
        if let Some(gs) = &self.green_screen
            && !(0.0..=1.0).contains(&gs.threshold)
        {
            return Err(ReelError::validation(format!(
                "green screen threshold must be in [0, 1], got {}",
                gs.threshold
            )));
        }
        if let Some(m) = &self.music {
            let unit = 0.0..=1.0;
            if !unit.contains(&m.original_volume) || !unit.contains(&m.music_volume) {
                return Err(ReelError::validation("music volumes must be in [0, 1]"));
            }
            if !(m.start_offset.is_finite() && m.start_offset >= 0.0) {
                return Err(ReelError::validation("music startOffset must be >= 0"));
            }
        }
        Ok(())
    }
}

fn toggle_single<T: Copy + PartialEq>(current: &[T], item: T) -> Vec<T> {
    if current.contains(&item) {
        current.iter().copied().filter(|x| *x != item).collect()
    } else {
        vec![item]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/state.rs"]
mod tests;
