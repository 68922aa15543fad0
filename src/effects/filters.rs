//! Per-pixel color filters.
//!
//! Kernels operate on straight color values and store results the way a clamped byte array does
//! (clamp, then round to nearest). Alpha is never touched.

use rayon::prelude::*;

use crate::editor::state::Filter;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::map_straight;

const CONTRAST_FACTOR: f32 = 1.5;
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];
const VINTAGE_GAIN: [f32; 3] = [1.1, 0.95, 0.85];
const COOL_GAIN: [f32; 3] = [0.9, 1.0, 1.1];

/// Apply a filter list in order.
///
/// An empty list, or a list containing [`Filter::None`], leaves the buffer untouched.
pub fn apply_filters(pixels: &mut [u8], filters: &[Filter]) -> ReelResult<()> {
    if filters.is_empty() || filters.contains(&Filter::None) {
        return Ok(());
    }
    for &f in filters {
        apply_filter(pixels, f)?;
    }
    Ok(())
}

/// Apply one filter to a premultiplied RGBA8 buffer in place.
pub fn apply_filter(pixels: &mut [u8], filter: Filter) -> ReelResult<()> {
    if !pixels.len().is_multiple_of(4) {
        return Err(ReelError::validation(format!(
            "filter buffer length {} is not a multiple of 4",
            pixels.len()
        )));
    }
    let kernel: fn([f32; 3]) -> [f32; 3] = match filter {
        Filter::None => return Ok(()),
        Filter::Bw => bw,
        Filter::Sepia => sepia,
        Filter::Contrast => contrast,
        Filter::Vintage => |c| gain(c, VINTAGE_GAIN),
        Filter::Cool => |c| gain(c, COOL_GAIN),
    };
    pixels
        .par_chunks_exact_mut(4)
        .for_each(|px| map_straight(px, kernel));
    Ok(())
}

fn bw([r, g, b]: [f32; 3]) -> [f32; 3] {
    let avg = (r + g + b) / 3.0;
    [avg, avg, avg]
}

fn sepia(c: [f32; 3]) -> [f32; 3] {
    let row = |m: [f32; 3]| (c[0] * m[0] + c[1] * m[1] + c[2] * m[2]).min(255.0);
    [row(SEPIA[0]), row(SEPIA[1]), row(SEPIA[2])]
}

fn contrast(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| CONTRAST_FACTOR * (v - 128.0) + 128.0)
}

fn gain(c: [f32; 3], k: [f32; 3]) -> [f32; 3] {
    [c[0] * k[0], c[1] * k[1], c[2] * k[2]]
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filters.rs"]
mod tests;
