use std::io::Cursor;

use crate::encode::output::{EncodedMedia, PNG_MIME};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::unpremultiply_px;
use crate::render::surface::Surface;

/// Encode a surface as a straight-alpha PNG.
pub fn encode_png(surface: &Surface) -> ReelResult<EncodedMedia> {
    let mut straight = Vec::with_capacity(surface.pixels().len());
    for px in surface.pixels().chunks_exact(4) {
        straight.extend_from_slice(&unpremultiply_px([px[0], px[1], px[2], px[3]]));
    }
    let img = image::RgbaImage::from_raw(surface.width(), surface.height(), straight)
        .ok_or_else(|| ReelError::encode("png buffer does not match surface size"))?;

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ReelError::encode(format!("png encode failed: {e}")))?;
    Ok(EncodedMedia::new(bytes, PNG_MIME))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
