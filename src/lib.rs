//! reelkit renders short vertical videos from a source clip and a snapshot of edits.
//!
//! The pipeline is CPU-only:
//!
//! - Build an [`EditorState`] (trim, speed, filters, effects, captions, stickers, audio tracks)
//! - Create a [`Compositor`] from a [`RenderConfig`]
//! - [`Compositor::compose`] streams frames into an ffmpeg-backed [`FrameSink`], then hands the
//!   result to the [`AudioMixer`] when music or a voiceover is attached
//!
//! Photo and text sources produce a single PNG instead.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod audio;
pub mod config;
pub(crate) mod editor;
pub(crate) mod effects;
/// Encoding sinks and output artifacts.
pub mod encode;
/// Frame composition.
pub mod render;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::color::parse_css_color;
pub use crate::assets::decode::{PreparedImage, decode_any_image};
pub use crate::assets::media::{VideoSourceInfo, is_ffmpeg_on_path, probe_video};
pub use crate::assets::resolve::{AssetResolver, FsResolver};
pub use crate::config::{CaptionStyle, RenderConfig, SourceFit, TextCardStyle};
pub use crate::editor::autocut::{
    DEFAULT_THRESHOLD as AUTO_CUT_THRESHOLD, apply_auto_cut, auto_cut_segments,
};
pub use crate::editor::state::{
    Caption, CreationMode, DuetLayout, DuetPosition, EditorState, Effect, Filter, GreenScreen,
    MusicSettings, Position, SPEED_PRESETS, Segment, Sticker, TrimWindow, VoiceEffect,
    VoiceoverSettings,
};

pub use crate::audio::analysis::{analyze_audio, volume_envelope};
pub use crate::audio::buffer::AudioBuffer;
pub use crate::audio::codec::{FfmpegCodec, MediaCodec};
pub use crate::audio::graph::{BufferSource, OfflineGraph};
pub use crate::audio::mixer::{AudioMixer, MixOutcome, MixTracks, mix_tracks};
pub use crate::audio::voice::apply_voice_effect;
pub use crate::effects::chroma_key::apply_chroma_key;
pub use crate::effects::filters::{apply_filter, apply_filters};
pub use crate::effects::fx::{apply_effect, apply_effects};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, has_encoder};
pub use crate::encode::output::{EncodedMedia, OutputFile};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::still::encode_png;
pub use crate::render::compositor::{AudioStep, Compositor, MediaSource, RenderOutput};
pub use crate::render::source::{FfmpegVideoSource, FrameSource, StillSource};
pub use crate::render::surface::{FrameRGBA, PaintImage, Surface};
pub use crate::render::text::{TextLayoutEngine, render_text_card};
pub use crate::render::timeline::SourceTimeline;
