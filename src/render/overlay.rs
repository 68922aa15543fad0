//! Caption and sticker overlay.
//!
//! Captions and stickers do not change between frames, so they are rasterized once per render
//! into a transparent layer which is composited over every frame.

use crate::assets::decode::decode_any_image;
use crate::assets::resolve::AssetResolver;
use crate::config::RenderConfig;
use crate::editor::state::{EditorState, Sticker};
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::{PaintImage, Surface};
use crate::render::text::{TextLayoutEngine, draw_caption};

#[derive(Clone, Debug, Default)]
pub struct OverlayLayer {
    layer: Option<Surface>,
}

impl OverlayLayer {
    /// Rasterize the captions (in order) and then the stickers (in order) of `state`.
    pub fn prepare(
        state: &EditorState,
        canvas: Canvas,
        config: &RenderConfig,
        resolver: &dyn AssetResolver,
        engine: Option<&mut TextLayoutEngine>,
    ) -> ReelResult<Self> {
        let captions: Vec<_> = state
            .captions
            .iter()
            .filter(|c| !c.text.trim().is_empty())
            .collect();
        if captions.is_empty() && state.stickers.is_empty() {
            return Ok(Self::default());
        }

        let mut layer = Surface::new(canvas)?;
        if !captions.is_empty() {
            let engine = engine.ok_or_else(|| {
                ReelError::validation(
                    "captions need a font: none is installed, set font_path or REELKIT_FONT",
                )
            })?;
            for caption in &captions {
                draw_caption(&mut layer, engine, caption, &config.caption)?;
            }
        }
        for sticker in &state.stickers {
            draw_sticker(&mut layer, sticker, config.sticker_base_px, resolver)?;
        }
        tracing::debug!(
            captions = captions.len(),
            stickers = state.stickers.len(),
            "overlay prepared"
        );
        Ok(Self { layer: Some(layer) })
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_none()
    }

    pub fn apply(&self, surface: &mut Surface) -> ReelResult<()> {
        match &self.layer {
            Some(layer) => surface.composite(layer.pixels(), 1.0),
            None => Ok(()),
        }
    }
}

/// Square a sticker occupies: `base_px * scale` on a side, centered on its position.
pub fn sticker_rect(sticker: &Sticker, canvas: Canvas, base_px: f64) -> Rect {
    let (cx, cy) = sticker.position.to_pixels(canvas.width, canvas.height);
    let half = base_px * sticker.scale / 2.0;
    Rect::new(cx - half, cy - half, cx + half, cy + half)
}

fn draw_sticker(
    layer: &mut Surface,
    sticker: &Sticker,
    base_px: f64,
    resolver: &dyn AssetResolver,
) -> ReelResult<()> {
    let dst = sticker_rect(sticker, layer.canvas(), base_px);
    if dst.width() <= 0.0 {
        return Ok(());
    }
    let bytes = resolver.read(&sticker.url)?;
    let image = decode_any_image(&bytes, dst.width().ceil() as u32)?;
    layer.draw_image(&PaintImage::from_prepared(&image)?, dst, None)
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
