use crate::foundation::error::{ReelError, ReelResult};

// Caps pathological allocations from hostile viewBoxes.
const MAX_DIM: u32 = 16_384;

/// Raster size for drawing `tree` with its longer edge at `target_edge_px`.
pub fn svg_raster_size(tree: &usvg::Tree, target_edge_px: u32) -> ReelResult<(u32, u32)> {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(ReelError::media_decode("svg has invalid width/height"));
    }
    let target = target_edge_px.clamp(1, MAX_DIM) as f32;
    let scale = target / w.max(h);
    let rw = ((w * scale).ceil() as u32).clamp(1, MAX_DIM);
    let rh = ((h * scale).ceil() as u32).clamp(1, MAX_DIM);
    Ok((rw, rh))
}

/// Rasterize an SVG tree stretched to `width`x`height`.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> ReelResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ReelError::media_decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
