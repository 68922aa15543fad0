//! Voice effects applied to a voiceover before mixing.

use std::sync::Arc;

use crate::audio::buffer::AudioBuffer;
use crate::audio::graph::{BufferSource, OfflineGraph};
use crate::editor::state::VoiceEffect;
use crate::foundation::error::ReelResult;

/// Playback rate of the chipmunk effect.
pub const CHIPMUNK_RATE: f64 = 1.5;
/// Playback rate of the deep effect.
pub const DEEP_RATE: f64 = 0.7;
/// Band-pass center of the robotic effect.
pub const ROBOTIC_CENTER_HZ: f64 = 1000.0;

/// Render `buffer` through the graph for `effect`.
///
/// The output has the input's channel count, length and sample rate. `VoiceEffect::None` returns a
/// copy without building a graph.
pub fn apply_voice_effect(buffer: &AudioBuffer, effect: VoiceEffect) -> ReelResult<AudioBuffer> {
    if effect == VoiceEffect::None {
        return Ok(buffer.clone());
    }

    let mut graph = OfflineGraph::new(buffer.channels, buffer.frames(), buffer.sample_rate)?;
    let source = BufferSource::new(Arc::new(buffer.clone()));
    let source = match effect {
        VoiceEffect::Chipmunk => source.playback_rate(CHIPMUNK_RATE),
        VoiceEffect::Deep => source.playback_rate(DEEP_RATE),
        VoiceEffect::Robotic => source.band_pass(ROBOTIC_CENTER_HZ),
        VoiceEffect::None => source,
    };
    graph.connect(source)?;
    let out = graph.render()?;
    tracing::debug!(?effect, frames = out.frames(), "voice effect rendered");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/voice.rs"]
mod tests;
