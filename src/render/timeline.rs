//! Mapping from output frames to source time.

use crate::editor::state::{Segment, TrimWindow};
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};

const FRAME_EPSILON: f64 = 1e-9;

/// A contiguous range of source time that is rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    /// Source start, seconds.
    pub start: f64,
    /// Source end, seconds.
    pub end: f64,
}

impl Span {
    /// Length in seconds.
    pub fn len(self) -> f64 {
        self.end - self.start
    }

    /// True when the span covers no time.
    pub fn is_empty(self) -> bool {
        self.len() <= 0.0
    }
}

/// One output frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Output frame index, strictly increasing from 0.
    pub index: u64,
    /// Source time to sample, seconds.
    pub source_time: f64,
}

/// Source spans rendered in order at a playback speed.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceTimeline {
    spans: Vec<Span>,
    frames: Vec<u64>,
    speed: f64,
    fps: Fps,
}

impl SourceTimeline {
    /// Trim window intersected with the auto-cut segments (all of the trim when there are none).
    pub fn new(trim: TrimWindow, segments: &[Segment], speed: f64, fps: Fps) -> ReelResult<Self> {
        if !(trim.start.is_finite() && trim.end.is_finite() && trim.start >= 0.0) {
            return Err(ReelError::validation("trim bounds must be finite and >= 0"));
        }
        if trim.end <= trim.start {
            return Err(ReelError::validation(format!(
                "trim end ({}) must be after trim start ({})",
                trim.end, trim.start
            )));
        }
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ReelError::validation(format!(
                "speed must be > 0, got {speed}"
            )));
        }

        let whole = Span {
            start: trim.start,
            end: trim.end,
        };
        let spans = if segments.is_empty() {
            vec![whole]
        } else {
            let mut spans: Vec<Span> = segments
                .iter()
                .map(|s| Span {
                    start: s.start.max(trim.start),
                    end: s.end.min(trim.end),
                })
                .filter(|s| !s.is_empty())
                .collect();
            spans.sort_by(|a, b| a.start.total_cmp(&b.start));
            // Overlapping segments would replay source time.
            let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
            for span in spans {
                match merged.last_mut() {
                    Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                    _ => merged.push(span),
                }
            }
            let spans = merged;
            if spans.is_empty() {
                return Err(ReelError::validation(
                    "auto-cut segments do not overlap the trim window",
                ));
            }
            spans
        };

        let per_frame = speed / fps.as_f64();
        let frames = spans
            .iter()
            .map(|s| (s.len() / per_frame - FRAME_EPSILON).ceil().max(0.0) as u64)
            .collect();
        Ok(Self {
            spans,
            frames,
            speed,
            fps,
        })
    }

    /// Spans in render order, merged where they overlap.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Playback speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Total output frames.
    pub fn frame_count(&self) -> u64 {
        self.frames.iter().sum()
    }

    /// Length of the rendered output, seconds.
    pub fn output_duration(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count())
    }

    /// Output time at which each span begins, seconds.
    pub fn span_output_starts(&self) -> Vec<f64> {
        let mut acc = 0u64;
        self.frames
            .iter()
            .map(|n| {
                let at = self.fps.frames_to_secs(acc);
                acc += n;
                at
            })
            .collect()
    }

    /// Every output frame in order.
    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        let per_frame = self.speed / self.fps.as_f64();
        let mut index = 0u64;
        self.spans
            .iter()
            .zip(self.frames.iter())
            .flat_map(move |(span, &n)| {
                let span = *span;
                (0..n).map(move |k| (span, k))
            })
            .map(move |(span, k)| {
                let tick = Tick {
                    index,
                    source_time: (span.start + k as f64 * per_frame).min(span.end),
                };
                index += 1;
                tick
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/timeline.rs"]
mod tests;
