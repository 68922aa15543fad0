//! Frame compositor.
//!
//! Every output frame is built in a fixed order: clear to black, draw the source (or the duet
//! halves), chroma key, filters, effects, then the caption and sticker overlay. Video frames are
//! streamed into a [`FrameSink`] in strictly increasing order; photo and text sources produce a
//! single PNG.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::decode::{PreparedImage, decode_any_image};
use crate::assets::resolve::AssetResolver;
use crate::audio::buffer::AudioBuffer;
use crate::audio::codec::MediaCodec;
use crate::audio::graph::{BufferSource, OfflineGraph};
use crate::audio::mixer::{AudioMixer, MIX_CHANNELS, MixOutcome};
use crate::config::{RenderConfig, SourceFit};
use crate::editor::state::{
    CreationMode, DuetPosition, EditorState, Effect, Filter, TrimWindow,
};
use crate::effects::chroma_key::apply_chroma_key;
use crate::effects::filters::apply_filters;
use crate::effects::fx::apply_effects;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::output::{EncodedMedia, OutputFile};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::encode::still::encode_png;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Canvas, FrameIndex, Rect, Rgba8Premul};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::overlay::OverlayLayer;
use crate::render::source::{FfmpegVideoSource, FrameSource, StillSource};
use crate::render::surface::{FrameRGBA, PaintImage, Surface, fit_rect};
use crate::render::text::{TextLayoutEngine, render_text_card_with};
use crate::render::timeline::SourceTimeline;

/// The media item being edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    /// File on disk.
    pub path: PathBuf,
    /// Mime type of the file.
    pub mime: String,
}

impl MediaSource {
    /// Source at `path` with an explicit mime type.
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }

    /// Source with a mime type guessed from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            _ => "video/webm",
        };
        Self::new(path, mime)
    }
}

/// What happened to the audio of a render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioStep {
    /// No mixing requested, or the output is a still.
    Skipped,
    /// Music or voiceover was mixed and muxed in.
    Mixed,
    /// Mixing failed; the output keeps the original audio.
    Degraded(String),
}

/// Result of [`Compositor::compose`].
#[derive(Debug)]
pub struct RenderOutput {
    /// The named output file.
    pub file: OutputFile,
    /// Number of frames emitted; 1 for a still.
    pub frames: u64,
    /// Outcome of the audio step.
    pub audio: AudioStep,
}

/// Per-render state shared by every frame.
struct FramePlan {
    overlay: OverlayLayer,
    chroma: Option<(Surface, f64)>,
    duet: Option<DuetPosition>,
    filters: Vec<Filter>,
    effects: Vec<Effect>,
}

/// Renders an [`EditorState`] over a source into an output file.
///
/// One compositor can run several renders in turn; each render prepares its overlay and
/// background once and reuses them for every frame.
pub struct Compositor {
    config: RenderConfig,
    resolver: Arc<dyn AssetResolver>,
    codec: Arc<dyn MediaCodec>,
    cancel: CancelToken,
    rng: StdRng,
    duet_partner: Option<Box<dyn FrameSource>>,
    text_engine: Option<TextLayoutEngine>,
}

impl Compositor {
    /// Compositor for `config`, reading assets through `resolver` and audio through `codec`.
    ///
    /// Fails when the config is invalid or a configured `font_path` cannot be loaded.
    pub fn new(
        config: RenderConfig,
        resolver: Arc<dyn AssetResolver>,
        codec: Arc<dyn MediaCodec>,
    ) -> ReelResult<Self> {
        config.validate()?;
        let text_engine = TextLayoutEngine::from_config(&config)?;
        Ok(Self {
            config,
            resolver,
            codec,
            cancel: CancelToken::new(),
            rng: StdRng::from_os_rng(),
            duet_partner: None,
            text_engine,
        })
    }

    /// Seed the effect RNG for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Use `token` to cancel renders from another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Source shown in the other half when the state carries a duet layout.
    pub fn with_duet_partner(mut self, partner: Box<dyn FrameSource>) -> Self {
        self.duet_partner = Some(partner);
        self
    }

    /// Handle that cancels the running render between frames.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Render settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `source` with every edit of `state` into an output file.
    #[tracing::instrument(skip(self, state), fields(path = %source.path.display()))]
    pub fn compose(
        &mut self,
        source: &MediaSource,
        state: &EditorState,
        kind: CreationMode,
    ) -> ReelResult<RenderOutput> {
        self.config.canvas.ensure_drawable()?;
        if kind.is_still() {
            let bytes = std::fs::read(&source.path).map_err(|e| {
                ReelError::media_decode(format!(
                    "failed to read source '{}': {e}",
                    source.path.display()
                ))
            })?;
            let mut still = StillSource::from_bytes(&bytes, self.max_edge())?;
            return self.compose_still(&mut still, state, kind);
        }

        let timeout = self.config.decode_timeout();
        let mut frames = FfmpegVideoSource::open(&source.path, timeout)?;
        let audio = if frames.info().has_audio {
            let buffer = self.codec.decode_audio_file(
                &source.path,
                self.config.mix_sample_rate,
                MIX_CHANNELS,
            )?;
            (!buffer.is_empty()).then_some(buffer)
        } else {
            None
        };
        let out_dir = tempfile::tempdir()
            .map_err(|e| ReelError::encode(format!("create render temp dir: {e}")))?;
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
            out_dir.path().join("render.webm"),
            self.config.video_bitrate,
        ));
        self.compose_video(&mut frames, audio, state, &mut sink)
    }

    /// Render a single picture to PNG.
    pub fn compose_still(
        &mut self,
        source: &mut dyn FrameSource,
        state: &EditorState,
        kind: CreationMode,
    ) -> ReelResult<RenderOutput> {
        let mut surface = Surface::new(self.config.canvas)?;
        state.validate_for_render(kind)?;
        let plan = self.prepare(state)?;
        self.cancel.check()?;
        self.draw_frame(&mut surface, source, &plan, 0.0, 0.0)?;
        let media = encode_png(&surface)?;
        tracing::debug!(bytes = media.bytes.len(), ?kind, "still encoded");
        Ok(RenderOutput {
            file: OutputFile::for_mode(kind, media),
            frames: 1,
            audio: AudioStep::Skipped,
        })
    }

    /// Render the trimmed, sped-up timeline of `source` into `sink`, then mix music and
    /// voiceover.
    pub fn compose_video(
        &mut self,
        source: &mut dyn FrameSource,
        source_audio: Option<AudioBuffer>,
        state: &EditorState,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<RenderOutput> {
        let mut surface = Surface::new(self.config.canvas)?;
        state.validate_for_render(CreationMode::Video)?;
        let fps = self.config.output_fps()?;
        let trim = clamp_trim_to_source(state.trim, source.duration())?;
        let timeline = SourceTimeline::new(trim, &state.auto_cut_segments, state.speed, fps)?;
        tracing::debug!(
            frames = timeline.frame_count(),
            spans = timeline.spans().len(),
            speed = state.speed,
            "timeline built"
        );
        let plan = self.prepare(state)?;
        self.cancel.check()?;

        let scratch = tempfile::tempdir()
            .map_err(|e| ReelError::encode(format!("create audio temp dir: {e}")))?;
        let audio = match source_audio {
            Some(buffer) => Some(self.write_timeline_audio(&timeline, buffer, scratch.path())?),
            None => None,
        };

        let canvas = surface.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            audio,
        })?;
        let mut frame = FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba8_len()?],
            premultiplied: true,
        };
        for tick in timeline.ticks() {
            self.cancel.check()?;
            let output_time = fps.frames_to_secs(tick.index);
            self.draw_frame(&mut surface, source, &plan, tick.source_time, output_time)?;
            frame.data.copy_from_slice(surface.pixels());
            sink.push_frame(FrameIndex(tick.index), &frame)?;
        }
        let media = sink.end()?;
        tracing::debug!(bytes = media.bytes.len(), "video encoded");

        let (media, audio) = self.finish_audio(media, state);
        Ok(RenderOutput {
            file: OutputFile::for_mode(CreationMode::Video, media),
            frames: timeline.frame_count(),
            audio,
        })
    }

    /// Compose one frame of `source` at `source_time` without encoding it.
    pub fn render_frame(
        &mut self,
        source: &mut dyn FrameSource,
        state: &EditorState,
        source_time: f64,
    ) -> ReelResult<Surface> {
        let mut surface = Surface::new(self.config.canvas)?;
        let plan = self.prepare(state)?;
        self.draw_frame(&mut surface, source, &plan, source_time, 0.0)?;
        Ok(surface)
    }

    /// Text-mode source: the configured text card as a still picture.
    pub fn text_card_source(&mut self, text: &str) -> ReelResult<StillSource> {
        let engine = self.text_engine.as_mut().ok_or_else(|| {
            ReelError::validation(
                "text cards need a font: none is installed, set font_path or REELKIT_FONT",
            )
        })?;
        let card = render_text_card_with(text, &self.config, engine)?;
        let (w, h) = (card.width(), card.height());
        StillSource::new(&PreparedImage::from_premul_rgba8(w, h, card.into_pixels())?)
    }

    fn max_edge(&self) -> u32 {
        self.config.canvas.width.max(self.config.canvas.height)
    }

    fn prepare(&mut self, state: &EditorState) -> ReelResult<FramePlan> {
        let overlay = OverlayLayer::prepare(
            state,
            self.config.canvas,
            &self.config,
            self.resolver.as_ref(),
            self.text_engine.as_mut(),
        )?;

        let chroma = match &state.green_screen {
            Some(gs) => match self.load_background(&gs.background_url) {
                Ok(bg) => Some((bg, gs.threshold)),
                Err(e) => {
                    tracing::warn!(url = %gs.background_url, error = %e, "green screen background unavailable, skipping chroma key");
                    None
                }
            },
            None => None,
        };

        let duet = match (&state.duet_layout, &self.duet_partner) {
            (Some(layout), Some(_)) => Some(layout.position),
            (Some(layout), None) => {
                tracing::debug!(partner = %layout.source_video_id, "duet layout without partner source, ignoring");
                None
            }
            (None, _) => None,
        };

        Ok(FramePlan {
            overlay,
            chroma,
            duet,
            filters: state.filters.clone(),
            effects: state.effects.clone(),
        })
    }

    fn load_background(&self, url: &str) -> ReelResult<Surface> {
        let bytes = self.resolver.read(url)?;
        let picture = PaintImage::from_prepared(&decode_any_image(&bytes, self.max_edge())?)?;
        let mut bg = Surface::new(self.config.canvas)?;
        bg.clear(Rgba8Premul::black());
        bg.draw_image(&picture, self.config.canvas.rect(), None)?;
        Ok(bg)
    }

    fn draw_frame(
        &mut self,
        surface: &mut Surface,
        source: &mut dyn FrameSource,
        plan: &FramePlan,
        source_time: f64,
        output_time: f64,
    ) -> ReelResult<()> {
        let canvas = surface.canvas();
        surface.clear(Rgba8Premul::black());

        let picture = source.frame_at(source_time)?;
        match (plan.duet, self.duet_partner.as_mut()) {
            (Some(position), Some(partner)) => {
                let (own, other) = duet_halves(canvas, position);
                surface.draw_image(
                    &picture,
                    fit_rect(picture.width(), picture.height(), own, SourceFit::Cover),
                    Some(own),
                )?;
                let partner_picture = partner.frame_at(output_time)?;
                surface.draw_image(
                    &partner_picture,
                    fit_rect(
                        partner_picture.width(),
                        partner_picture.height(),
                        other,
                        SourceFit::Cover,
                    ),
                    Some(other),
                )?;
            }
            _ => {
                let full = canvas.rect();
                surface.draw_image(
                    &picture,
                    fit_rect(
                        picture.width(),
                        picture.height(),
                        full,
                        self.config.source_fit,
                    ),
                    Some(full),
                )?;
            }
        }

        if let Some((bg, threshold)) = &plan.chroma {
            apply_chroma_key(
                surface.pixels_mut(),
                bg.pixels(),
                self.config.chroma_key_rgb,
                *threshold,
            )?;
        }
        apply_filters(surface.pixels_mut(), &plan.filters)?;
        apply_effects(surface, &plan.effects, &mut self.rng)?;
        plan.overlay.apply(surface)
    }

    /// Resample the source audio along the timeline into a raw PCM file for the sink.
    fn write_timeline_audio(
        &self,
        timeline: &SourceTimeline,
        audio: AudioBuffer,
        dir: &Path,
    ) -> ReelResult<AudioInputConfig> {
        let rate = self.config.mix_sample_rate;
        let mut graph = OfflineGraph::with_duration(MIX_CHANNELS, timeline.output_duration(), rate)?;
        let source = Arc::new(audio);
        for (span, start) in timeline.spans().iter().zip(timeline.span_output_starts()) {
            graph.connect(
                BufferSource::new(source.clone())
                    .offset(span.start)
                    .duration(span.len())
                    .playback_rate(timeline.speed())
                    .start_at(start),
            )?;
        }
        let track = graph.render()?;
        let path = dir.join("source-audio.f32le");
        track.write_f32le(&path)?;
        Ok(AudioInputConfig {
            path,
            sample_rate: rate,
            channels: MIX_CHANNELS,
        })
    }

    fn finish_audio(&self, media: EncodedMedia, state: &EditorState) -> (EncodedMedia, AudioStep) {
        if !state.needs_audio_mix() {
            return (media, AudioStep::Skipped);
        }
        let mixer = AudioMixer::new(self.codec.clone(), self.resolver.clone())
            .with_sample_rate(self.config.mix_sample_rate)
            .with_voiceover_gain(self.config.voiceover_gain);
        match mixer.mix(media, state) {
            MixOutcome::Mixed(mixed) => (mixed, AudioStep::Mixed),
            MixOutcome::Degraded { original, reason } => {
                (original, AudioStep::Degraded(reason.to_string()))
            }
        }
    }
}

/// Trim window cut at the end of the source, so no frame samples past it.
pub(crate) fn clamp_trim_to_source(
    trim: TrimWindow,
    source_duration: Option<f64>,
) -> ReelResult<TrimWindow> {
    let Some(duration) = source_duration else {
        return Ok(trim);
    };
    if trim.start >= duration {
        return Err(ReelError::validation(format!(
            "trim start {}s is past the end of the {duration}s source",
            trim.start
        )));
    }
    Ok(TrimWindow {
        start: trim.start,
        end: trim.end.min(duration),
    })
}

/// `(recording, partner)` halves of the canvas for a duet with the recording on `position`.
pub fn duet_halves(canvas: Canvas, position: DuetPosition) -> (Rect, Rect) {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let mid = (w / 2.0).round();
    let left = Rect::new(0.0, 0.0, mid, h);
    let right = Rect::new(mid, 0.0, w, h);
    match position {
        DuetPosition::Left => (left, right),
        DuetPosition::Right => (right, left),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
