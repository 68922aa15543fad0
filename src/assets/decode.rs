use std::sync::Arc;

use anyhow::Context;

use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::foundation::error::{ReelError, ReelResult};

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap straight-alpha RGBA8 bytes, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> ReelResult<Self> {
        check_len(width, height, rgba.len())?;
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Wrap bytes that are already premultiplied.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> ReelResult<Self> {
        check_len(width, height, rgba.len())?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Single-color image.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> ReelResult<Self> {
        let len = pixel_len(width, height)?;
        Self::from_premul_rgba8(width, height, premul.repeat(len / 4))
    }
}

fn pixel_len(width: u32, height: u32) -> ReelResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ReelError::validation("image byte size overflows usize"))
}

fn check_len(width: u32, height: u32, len: usize) -> ReelResult<()> {
    if width == 0 || height == 0 {
        return Err(ReelError::media_decode(format!(
            "image must be non-empty, got {width}x{height}"
        )));
    }
    let expected = pixel_len(width, height)?;
    if len != expected {
        return Err(ReelError::media_decode(format!(
            "image byte length mismatch: got {len}, expected {expected}"
        )));
    }
    Ok(())
}

/// Decode a raster image (PNG, JPEG, WebP, GIF, ...).
pub fn decode_image(bytes: &[u8]) -> ReelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| ReelError::media_decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PreparedImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> ReelResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(|e| ReelError::media_decode(format!("{e:#}")))
}

/// Decode a sticker or background, rasterizing SVG so its longer edge is `target_edge_px`.
pub fn decode_any_image(bytes: &[u8], target_edge_px: u32) -> ReelResult<PreparedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        let (w, h) = svg_raster_size(&tree, target_edge_px)?;
        let rgba = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        return PreparedImage::from_premul_rgba8(w, h, rgba);
    }
    decode_image(bytes)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
