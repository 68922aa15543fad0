//! Randomized segment selection behind the auto-cut tool.
//!
//! This is not scene detection: the source is split into 2 s strides, the first 1.5 s of each
//! stride is a candidate, and each candidate is kept when a uniform draw exceeds the
//! sensitivity threshold.

use rand::Rng;

use crate::editor::state::{EditorState, Segment};
use crate::foundation::error::{ReelError, ReelResult};

/// Sensitivity the tool starts with.
pub const DEFAULT_THRESHOLD: f64 = 0.3;
/// Distance between candidate segment starts, seconds.
pub const STRIDE_SECS: f64 = 2.0;
/// Length of each candidate segment, seconds.
pub const KEEP_SECS: f64 = 1.5;

/// Pick the segments to keep for a source of `duration` seconds.
///
/// Higher `threshold` keeps fewer segments; `0` keeps every candidate and `1` none.
pub fn auto_cut_segments<R: Rng + ?Sized>(
    duration: f64,
    threshold: f64,
    rng: &mut R,
) -> ReelResult<Vec<Segment>> {
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(ReelError::validation(format!(
            "auto-cut duration must be >= 0, got {duration}"
        )));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ReelError::validation(format!(
            "auto-cut threshold must be in [0, 1], got {threshold}"
        )));
    }

    let count = (duration / STRIDE_SECS).floor() as u64;
    let mut out = Vec::new();
    for i in 0..count {
        let start = i as f64 * STRIDE_SECS;
        let end = (start + KEEP_SECS).min(duration);
        if rng.random::<f64>() > threshold {
            out.push(Segment { start, end });
        }
    }
    tracing::debug!(
        candidates = count,
        kept = out.len(),
        threshold,
        "auto-cut segments selected"
    );
    Ok(out)
}

/// Run auto-cut and return the next editor snapshot.
pub fn apply_auto_cut<R: Rng + ?Sized>(
    state: EditorState,
    duration: f64,
    threshold: f64,
    rng: &mut R,
) -> ReelResult<EditorState> {
    let segments = auto_cut_segments(duration, threshold, rng)?;
    Ok(state.with_auto_cut_segments(segments))
}

#[cfg(test)]
#[path = "../../tests/unit/editor/autocut.rs"]
mod tests;
