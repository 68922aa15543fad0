//! Second-order IIR sections (RBJ audio-EQ cookbook).

use std::f64::consts::PI;

use crate::foundation::error::{ReelError, ReelResult};

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Pass-through coefficients.
    pub fn unity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Constant 0 dB peak band-pass centered at `center_hz`.
    pub fn band_pass(sample_rate: u32, center_hz: f64, q: f64) -> ReelResult<Self> {
        if sample_rate == 0 {
            return Err(ReelError::validation("biquad sample_rate must be > 0"));
        }
        let nyquist = f64::from(sample_rate) / 2.0;
        if !(center_hz.is_finite() && center_hz > 0.0 && center_hz < nyquist) {
            return Err(ReelError::validation(format!(
                "band-pass center {center_hz} Hz must be in (0, {nyquist})"
            )));
        }
        if !(q.is_finite() && q > 0.0) {
            return Err(ReelError::validation("biquad Q must be > 0"));
        }

        let w0 = 2.0 * PI * center_hz / f64::from(sample_rate);
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;
        Ok(Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * w0.cos() / a0,
            a2: (1.0 - alpha) / a0,
        })
    }
}

/// Per-channel delay line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, input: f64, c: &BiquadCoeffs) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// Filter interleaved samples in place, one state per channel.
pub fn filter_interleaved(samples: &mut [f32], channels: u16, coeffs: &BiquadCoeffs) {
    let channels = usize::from(channels.max(1));
    let mut states = vec![BiquadState::new(); channels];
    for frame in samples.chunks_mut(channels) {
        for (s, state) in frame.iter_mut().zip(states.iter_mut()) {
            *s = state.process(f64::from(*s), coeffs) as f32;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/biquad.rs"]
mod tests;
