//! Whole-frame effects applied after filters.

use rand::Rng;
use rayon::prelude::*;

use crate::editor::state::Effect;
use crate::effects::blur::blur_in_place;
use crate::foundation::error::ReelResult;
use crate::foundation::math::{map_straight, mul_div255_u8};
use crate::render::surface::Surface;

/// Gaussian sigma of the blur effect.
pub const BLUR_SIGMA_PX: f32 = 4.0;
/// Opacity of the vignette at and beyond its outer radius.
pub const VIGNETTE_MAX_ALPHA: f32 = 0.6;
/// Outer radius as a fraction of the surface width.
pub const VIGNETTE_RADIUS_DIVISOR: f32 = 1.5;
/// Chance that a pixel is replaced by noise.
pub const GLITCH_PROBABILITY: f64 = 0.02;
/// Linear downscale factor of the pixelate effect.
pub const PIXELATE_FACTOR: u32 = 10;
/// Contrast gain of the sharpen effect.
pub const SHARPEN_CONTRAST: f32 = 1.2;
/// Brightness gain of the sharpen effect.
pub const SHARPEN_BRIGHTNESS: f32 = 1.05;

/// Apply an effect list in order; empty or containing [`Effect::None`] is the identity.
pub fn apply_effects<R: Rng + ?Sized>(
    surface: &mut Surface,
    effects: &[Effect],
    rng: &mut R,
) -> ReelResult<()> {
    if effects.is_empty() || effects.contains(&Effect::None) {
        return Ok(());
    }
    for &e in effects {
        apply_effect(surface, e, rng)?;
    }
    Ok(())
}

/// Apply one effect in place. Glitch noise is drawn from `rng`.
pub fn apply_effect<R: Rng + ?Sized>(
    surface: &mut Surface,
    effect: Effect,
    rng: &mut R,
) -> ReelResult<()> {
    let (w, h) = (surface.width(), surface.height());
    match effect {
        Effect::None => Ok(()),
        Effect::Blur => blur_in_place(surface.pixels_mut(), w, h, BLUR_SIGMA_PX),
        Effect::Vignette => {
            vignette(surface.pixels_mut(), w, h);
            Ok(())
        }
        Effect::Glitch => {
            glitch(surface.pixels_mut(), rng);
            Ok(())
        }
        Effect::Pixelate => {
            pixelate(surface.pixels_mut(), w, h);
            Ok(())
        }
        Effect::Sharpen => {
            surface
                .pixels_mut()
                .par_chunks_exact_mut(4)
                .for_each(|px| map_straight(px, sharpen));
            Ok(())
        }
    }
}

/// Black radial gradient, transparent at the center and [`VIGNETTE_MAX_ALPHA`] from the outer
/// radius on, composited over the frame.
fn vignette(pixels: &mut [u8], width: u32, height: u32) {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let outer = (width as f32 / VIGNETTE_RADIUS_DIVISOR).max(f32::EPSILON);
    pixels
        .par_chunks_exact_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f32 + 0.5 - cy;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let dx = x as f32 + 0.5 - cx;
                let t = ((dx * dx + dy * dy).sqrt() / outer).min(1.0);
                let sa = ((VIGNETTE_MAX_ALPHA * t * 255.0).round() as u16).min(255);
                if sa == 0 {
                    continue;
                }
                let inv = 255 - sa;
                for c in px.iter_mut().take(3) {
                    *c = mul_div255_u8(u16::from(*c), inv);
                }
                px[3] = (sa as u8).saturating_add(mul_div255_u8(u16::from(px[3]), inv));
            }
        });
}

fn glitch<R: Rng + ?Sized>(pixels: &mut [u8], rng: &mut R) {
    let cutoff = 1.0 - GLITCH_PROBABILITY;
    for px in pixels.chunks_exact_mut(4) {
        if rng.random::<f64>() <= cutoff {
            continue;
        }
        let a = u16::from(px[3]);
        for c in px.iter_mut().take(3) {
            let v: u8 = rng.random();
            *c = mul_div255_u8(u16::from(v), a);
        }
    }
}

/// Nearest-neighbour downscale to 1/[`PIXELATE_FACTOR`] followed by a nearest upscale.
fn pixelate(pixels: &mut [u8], width: u32, height: u32) {
    let (w, h) = (width as usize, height as usize);
    let sw = (w / PIXELATE_FACTOR as usize).max(1);
    let sh = (h / PIXELATE_FACTOR as usize).max(1);
    let src_x: Vec<usize> = (0..sw).map(|i| ((2 * i + 1) * w / (2 * sw)).min(w - 1)).collect();
    let src_y: Vec<usize> = (0..sh).map(|j| ((2 * j + 1) * h / (2 * sh)).min(h - 1)).collect();

    let src = pixels.to_vec();
    pixels
        .par_chunks_exact_mut(w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = src_y[y * sh / h];
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let sx = src_x[x * sw / w];
                let i = (sy * w + sx) * 4;
                px.copy_from_slice(&src[i..i + 4]);
            }
        });
}

fn sharpen(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| {
        let contrasted = ((v - 127.5) * SHARPEN_CONTRAST + 127.5).clamp(0.0, 255.0);
        contrasted * SHARPEN_BRIGHTNESS
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/fx.rs"]
mod tests;
