//! Final audio track assembly: original audio, background music and a processed voiceover are
//! summed in an offline graph and muxed back into the rendered video.
//!
//! Mixing is best-effort. Any failure keeps the rendered video with its original audio and
//! reports the reason through [`MixOutcome::Degraded`].

use std::sync::Arc;

use crate::assets::resolve::AssetResolver;
use crate::audio::buffer::AudioBuffer;
use crate::audio::codec::MediaCodec;
use crate::audio::graph::{BufferSource, OfflineGraph};
use crate::audio::voice::apply_voice_effect;
use crate::editor::state::{EditorState, MusicSettings, VoiceEffect};
use crate::encode::output::EncodedMedia;
use crate::foundation::error::{ReelError, ReelResult};

/// Channel count of the mixed track.
pub const MIX_CHANNELS: u16 = 2;
/// Sample rate of the mixed track unless overridden.
pub const DEFAULT_MIX_SAMPLE_RATE: u32 = 48_000;
/// Gain of the voiceover track.
pub const DEFAULT_VOICEOVER_GAIN: f32 = 0.8;

/// Result of [`AudioMixer::mix`].
#[derive(Debug)]
pub enum MixOutcome {
    /// The video with the mixed track muxed in.
    Mixed(EncodedMedia),
    /// Mixing failed; `original` is the rendered video untouched.
    Degraded {
        /// The render as it was before mixing.
        original: EncodedMedia,
        /// Why mixing failed.
        reason: ReelError,
    },
}

impl MixOutcome {
    /// The media to keep: the mixed file, or the original on degrade.
    pub fn into_media(self) -> EncodedMedia {
        match self {
            Self::Mixed(m) => m,
            Self::Degraded { original, .. } => original,
        }
    }

    /// True when mixing failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Decoded tracks entering the mix graph.
#[derive(Clone, Debug)]
pub struct MixTracks {
    /// Audio of the rendered video.
    pub original: AudioBuffer,
    /// Music track and its volumes.
    pub music: Option<(AudioBuffer, MusicSettings)>,
    /// Voiceover track and the effect it goes through.
    pub voiceover: Option<(AudioBuffer, VoiceEffect)>,
}

/// Mixes music and a voiceover into a rendered video and muxes the result.
///
/// Failures never lose the render: they come back as [`MixOutcome::Degraded`].
pub struct AudioMixer {
    codec: Arc<dyn MediaCodec>,
    resolver: Arc<dyn AssetResolver>,
    sample_rate: u32,
    voiceover_gain: f32,
}

impl AudioMixer {
    /// Mixer decoding with `codec` and locating track URLs with `resolver`.
    pub fn new(codec: Arc<dyn MediaCodec>, resolver: Arc<dyn AssetResolver>) -> Self {
        Self {
            codec,
            resolver,
            sample_rate: DEFAULT_MIX_SAMPLE_RATE,
            voiceover_gain: DEFAULT_VOICEOVER_GAIN,
        }
    }

    /// Override the mix sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Override the voiceover gain.
    pub fn with_voiceover_gain(mut self, gain: f32) -> Self {
        self.voiceover_gain = gain;
        self
    }

    /// Mix the music and voiceover of `state` into `rendered`. Never fails.
    #[tracing::instrument(skip(self, rendered, state), fields(bytes = rendered.bytes.len()))]
    pub fn mix(&self, rendered: EncodedMedia, state: &EditorState) -> MixOutcome {
        match self.try_mix(&rendered, state) {
            Ok(media) => MixOutcome::Mixed(media),
            Err(e) => {
                let reason = ReelError::audio_mix_degraded(e.to_string());
                tracing::warn!(%reason, "audio mix failed, keeping original audio");
                MixOutcome::Degraded {
                    original: rendered,
                    reason,
                }
            }
        }
    }

    fn try_mix(&self, rendered: &EncodedMedia, state: &EditorState) -> ReelResult<EncodedMedia> {
        let mut original = self
            .codec
            .decode_audio(rendered, self.sample_rate, MIX_CHANNELS)?;
        if original.is_empty() {
            let secs = self.codec.media_duration(rendered)?;
            let frames = (secs * f64::from(self.sample_rate)).round() as usize;
            original = AudioBuffer::silent(self.sample_rate, MIX_CHANNELS, frames)?;
        }
        tracing::debug!(duration_s = original.duration_secs(), "decoded rendered audio");

        let music = match &state.music {
            Some(settings) => Some((self.decode_asset(&settings.url)?, settings.clone())),
            None => None,
        };
        let voiceover = match &state.voiceover {
            Some(v) => Some((self.decode_asset(&v.url)?, v.effect)),
            None => None,
        };

        let mixed = mix_tracks(
            MixTracks {
                original,
                music,
                voiceover,
            },
            self.sample_rate,
            self.voiceover_gain,
        )?;
        self.codec.mux_audio(rendered, &mixed)
    }

    fn decode_asset(&self, url: &str) -> ReelResult<AudioBuffer> {
        let path = self.resolver.local_path(url)?;
        self.codec
            .decode_audio_file(&path, self.sample_rate, MIX_CHANNELS)
    }
}

/// Sum `tracks` into a stereo buffer as long as the original track.
pub fn mix_tracks(
    tracks: MixTracks,
    sample_rate: u32,
    voiceover_gain: f32,
) -> ReelResult<AudioBuffer> {
    let duration = tracks.original.duration_secs();
    let mut graph = OfflineGraph::with_duration(MIX_CHANNELS, duration, sample_rate)?;

    let original_gain = tracks
        .music
        .as_ref()
        .map_or(1.0, |(_, settings)| settings.original_volume);
    graph.connect(BufferSource::new(Arc::new(tracks.original)).gain(original_gain))?;

    if let Some((buffer, settings)) = tracks.music {
        graph.connect(
            BufferSource::new(Arc::new(buffer))
                .gain(settings.music_volume)
                .start_at(settings.start_offset),
        )?;
    }

    if let Some((buffer, effect)) = tracks.voiceover {
        let processed = apply_voice_effect(&buffer, effect)?;
        graph.connect(BufferSource::new(Arc::new(processed)).gain(voiceover_gain))?;
    }

    graph.render()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mixer.rs"]
mod tests;
