//! Green-screen substitution.

use rayon::prelude::*;

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::unpremultiply_px;

/// Distance between two colors scaled to `[0, 1]` (black to white is 1).
pub fn normalized_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let sq: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    sq.sqrt() / (255.0 * 3f64.sqrt())
}

/// Replace pixels of `frame` close to `key_rgb` with the matching pixel of `background`.
///
/// A pixel is keyed out when its normalized distance to the key is below `threshold`; fully
/// transparent pixels are left alone. Both buffers are premultiplied RGBA8 of equal size.
pub fn apply_chroma_key(
    frame: &mut [u8],
    background: &[u8],
    key_rgb: [u8; 3],
    threshold: f64,
) -> ReelResult<()> {
    if frame.len() != background.len() || !frame.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "chroma key expects equal-length rgba8 buffers",
        ));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ReelError::validation(format!(
            "chroma key threshold must be in [0, 1], got {threshold}"
        )));
    }
    frame
        .par_chunks_exact_mut(4)
        .zip(background.par_chunks_exact(4))
        .for_each(|(px, bg)| {
            if px[3] == 0 {
                return;
            }
            let [r, g, b, _] = unpremultiply_px([px[0], px[1], px[2], px[3]]);
            if normalized_distance([r, g, b], key_rgb) < threshold {
                px.copy_from_slice(bg);
            }
        });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chroma_key.rs"]
mod tests;
