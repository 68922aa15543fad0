//! Output drawing surface.
//!
//! A [`Surface`] owns premultiplied RGBA8 pixels. Vector and image draws are rasterized by
//! `vello_cpu` into a transparent layer and composited over the surface, so kernels and draws can
//! be freely interleaved on the same buffer.

use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::config::SourceFit;
use crate::effects::composite::over_in_place;
use crate::foundation::core::{Affine, Canvas, Rect, Rgba8Premul};
use crate::foundation::error::{ReelError, ReelResult};

/// A rendered frame as handed to encoders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 rows, top to bottom.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied by alpha.
    pub premultiplied: bool,
}

/// Premultiplied RGBA8 pixel buffer the compositor draws into.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface for `canvas`.
    pub fn new(canvas: Canvas) -> ReelResult<Self> {
        canvas.ensure_drawable()?;
        let len = canvas.rgba8_len()?;
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; len],
        })
    }

    /// Wrap existing premultiplied pixels; the length must be `width * height * 4`.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        let canvas = Canvas { width, height };
        canvas.ensure_drawable()?;
        if data.len() != canvas.rgba8_len()? {
            return Err(ReelError::validation(format!(
                "surface buffer is {} bytes, expected {}x{}x4",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Size as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Mutable premultiplied RGBA8 bytes.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take the pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.data
    }

    /// Copy into a premultiplied [`FrameRGBA`].
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Composite a same-sized premultiplied layer over the surface.
    pub fn composite(&mut self, layer: &[u8], opacity: f32) -> ReelResult<()> {
        over_in_place(&mut self.data, layer, opacity)
    }

    /// Record draws into a transparent layer and composite it over the surface.
    pub fn paint_layer<F>(&mut self, draw: F) -> ReelResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> ReelResult<()>,
    {
        let (w, h) = self.dims_u16()?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        draw(&mut ctx)?;
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        self.composite(pixmap.data_as_u8_slice(), 1.0)
    }

    /// Draw `image` scaled into `dst`, optionally restricted to `clip`.
    pub fn draw_image(
        &mut self,
        image: &PaintImage,
        dst: Rect,
        clip: Option<Rect>,
    ) -> ReelResult<()> {
        let Some(local) = image.local_rect(dst, clip) else {
            return Ok(());
        };
        let transform = image.transform_into(dst);
        self.paint_layer(|ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(image.paint.clone());
            ctx.fill_rect(&rect_to_cpu(local));
            Ok(())
        })
    }

    /// Fill `rect` with a straight-alpha color.
    pub fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) -> ReelResult<()> {
        self.paint_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                rgba[0], rgba[1], rgba[2], rgba[3],
            ));
            ctx.fill_rect(&rect_to_cpu(rect));
            Ok(())
        })
    }

    fn dims_u16(&self) -> ReelResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| ReelError::canvas_unavailable("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| ReelError::canvas_unavailable("surface height exceeds u16"))?;
        Ok((w, h))
    }
}

/// An image ready to be used as a `vello_cpu` paint.
#[derive(Clone, Debug)]
pub struct PaintImage {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl PaintImage {
    /// Paint over a decoded image.
    pub fn from_prepared(img: &PreparedImage) -> ReelResult<Self> {
        let pixmap = premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: img.width,
            height: img.height,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    fn transform_into(&self, dst: Rect) -> Affine {
        let sx = dst.width() / f64::from(self.width);
        let sy = dst.height() / f64::from(self.height);
        Affine::translate((dst.x0, dst.y0)) * Affine::scale_non_uniform(sx, sy)
    }

    /// Portion of the image, in image pixels, that lands inside `dst ∩ clip`.
    fn local_rect(&self, dst: Rect, clip: Option<Rect>) -> Option<Rect> {
        if dst.width() <= 0.0 || dst.height() <= 0.0 {
            return None;
        }
        let visible = match clip {
            Some(c) => dst.intersect(c),
            None => dst,
        };
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            return None;
        }
        let sx = f64::from(self.width) / dst.width();
        let sy = f64::from(self.height) / dst.height();
        Some(Rect::new(
            (visible.x0 - dst.x0) * sx,
            (visible.y0 - dst.y0) * sy,
            (visible.x1 - dst.x0) * sx,
            (visible.y1 - dst.y0) * sy,
        ))
    }
}

/// Destination of a `src_w`x`src_h` image mapped into `dst` under `fit`.
pub fn fit_rect(src_w: u32, src_h: u32, dst: Rect, fit: SourceFit) -> Rect {
    if src_w == 0 || src_h == 0 || matches!(fit, SourceFit::Fill) {
        return dst;
    }
    let sx = dst.width() / f64::from(src_w);
    let sy = dst.height() / f64::from(src_h);
    let scale = match fit {
        SourceFit::Contain => sx.min(sy),
        _ => sx.max(sy),
    };
    let w = f64::from(src_w) * scale;
    let h = f64::from(src_h) * scale;
    let x0 = dst.x0 + (dst.width() - w) / 2.0;
    let y0 = dst.y0 + (dst.height() - h) / 2.0;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::validation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ReelError::validation("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
