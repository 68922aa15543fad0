//! Text shaping and drawing for captions and text cards.
//!
//! Shaping goes through `parley` with a single registered font; glyphs are rasterized by
//! `vello_cpu`. Lines are laid out without wrapping and positioned by their visual center
//! (canvas `textAlign = center`, `textBaseline = middle`).

use std::borrow::Cow;
use std::path::Path;

use crate::assets::color::parse_css_color;
use crate::config::{CaptionStyle, RenderConfig};
use crate::editor::state::Caption;
use crate::effects::blur::blur_in_place;
use crate::foundation::core::{Affine, Canvas, Rgba8Premul};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::{Surface, affine_to_cpu};

/// Width of a single unwrapped line of text.
pub trait TextMeasure {
    /// Advance width in pixels.
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<f32>;
}

/// Every character advances by `em_ratio * size_px`.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvance {
    /// Advance per character as a fraction of the font size.
    pub em_ratio: f32,
}

impl TextMeasure for FixedAdvance {
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<f32> {
        Ok(text.chars().count() as f32 * size_px * self.em_ratio)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Bold single-font text engine.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("family_name", &self.family_name)
            .finish_non_exhaustive()
    }
}

/// Families tried, in order, when no font file is configured.
const SYSTEM_FAMILIES: [&str; 5] = [
    "Inter",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
];

impl TextLayoutEngine {
    /// Engine for the first face in `font_bytes`.
    pub fn from_font_bytes(font_bytes: Vec<u8>) -> ReelResult<Self> {
        Self::from_face(font_bytes, 0, None)
    }

    fn from_face(font_bytes: Vec<u8>, index: u32, family: Option<&str>) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let names: Vec<String> = families
            .iter()
            .filter_map(|(id, _)| font_ctx.collection.family_name(*id).map(str::to_string))
            .collect();
        if families.is_empty() {
            return Err(ReelError::validation(
                "no font families registered from font bytes",
            ));
        }
        let family_name = family
            .and_then(|want| names.iter().find(|n| n.eq_ignore_ascii_case(want)))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?;

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes),
                index,
            ),
        })
    }

    /// Engine for the first face of the font file at `path`.
    pub fn from_font_file(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_font_bytes(bytes)
    }

    /// Bold sans-serif face from the installed system fonts, if there is one.
    pub fn system_default() -> Option<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        let mut families: Vec<usvg::fontdb::Family<'_>> = SYSTEM_FAMILIES
            .iter()
            .map(|&name| usvg::fontdb::Family::Name(name))
            .collect();
        families.push(usvg::fontdb::Family::SansSerif);

        let id = db.query(&usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::BOLD,
            ..Default::default()
        })?;
        let family = db
            .face(id)
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone());
        let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        match Self::from_face(bytes, index, family.as_deref()) {
            Ok(engine) => {
                tracing::debug!(family = engine.family_name(), "using system font");
                Some(engine)
            }
            Err(error) => {
                tracing::warn!(%error, "system font could not be loaded");
                None
            }
        }
    }

    /// Engine for the configured font, falling back to a system font.
    ///
    /// `None` only when no font is configured and none is installed.
    pub fn from_config(config: &RenderConfig) -> ReelResult<Option<Self>> {
        match config.font_path.as_deref() {
            Some(path) => Self::from_font_file(path).map(Some),
            None => Ok(Self::system_default()),
        }
    }

    /// Family name the layouts request.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Draw one line centered on `center` in straight-alpha `rgba`.
    pub fn draw_centered(
        &mut self,
        surface: &mut Surface,
        text: &str,
        size_px: f32,
        rgba: [u8; 4],
        center: (f64, f64),
    ) -> ReelResult<()> {
        let layout = self.layout_line(text, size_px, rgba.into())?;
        let Some(first) = layout.lines().next() else {
            return Ok(());
        };
        let m = first.metrics();
        let middle = m.baseline - (m.ascent - m.descent) / 2.0;
        let origin = (
            center.0 - f64::from(layout.width()) / 2.0,
            center.1 - f64::from(middle),
        );

        let font = self.font.clone();
        surface.paint_layer(|ctx| {
            ctx.set_transform(affine_to_cpu(Affine::translate(origin)));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            Ok(())
        })
    }
}

impl TextMeasure for TextLayoutEngine {
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<f32> {
        Ok(self
            .layout_line(text, size_px, TextBrushRgba8::default())?
            .width())
    }
}

/// Greedy word wrap: a word moves to a new line when appending it would exceed `max_width`.
///
/// Newlines always break. A single word wider than `max_width` keeps a line of its own.
pub fn wrap_words(
    text: &str,
    max_width: f32,
    size_px: f32,
    measure: &mut dyn TextMeasure,
) -> ReelResult<Vec<String>> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure.measure(&candidate, size_px)? > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// A wrapped text-card line and the y coordinate of its vertical middle.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCardLine {
    /// Line text.
    pub text: String,
    /// Vertical middle of the line in pixels.
    pub center_y: f32,
}

/// Wrap `text` and place the lines on a `line_height_px` grid starting at
/// `(height - lines * line_height) / 2`.
pub fn text_card_layout(
    text: &str,
    canvas: Canvas,
    config: &RenderConfig,
    measure: &mut dyn TextMeasure,
) -> ReelResult<Vec<TextCardLine>> {
    let card = &config.text_card;
    let max_width = canvas.width as f32 - card.margin_px;
    let lines = wrap_words(text, max_width, card.font_size_px, measure)?;
    let start_y = (canvas.height as f32 - lines.len() as f32 * card.line_height_px) / 2.0;
    Ok(lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextCardLine {
            text,
            center_y: start_y + i as f32 * card.line_height_px,
        })
        .collect())
}

/// Render the text-mode source: wrapped, centered lines on a solid background.
#[tracing::instrument(skip(text, config, engine), fields(chars = text.chars().count()))]
pub fn render_text_card_with(
    text: &str,
    config: &RenderConfig,
    engine: &mut TextLayoutEngine,
) -> ReelResult<Surface> {
    let canvas = config.canvas;
    let card = &config.text_card;
    let mut surface = Surface::new(canvas)?;
    let [r, g, b, a] = card.background_rgba;
    surface.clear(Rgba8Premul::from_straight_rgba(r, g, b, a));

    let lines = text_card_layout(text, canvas, config, engine)?;
    let center_x = f64::from(canvas.width) / 2.0;
    for line in &lines {
        engine.draw_centered(
            &mut surface,
            &line.text,
            card.font_size_px,
            card.text_rgba,
            (center_x, f64::from(line.center_y)),
        )?;
    }
    tracing::debug!(lines = lines.len(), "text card rendered");
    Ok(surface)
}

/// [`render_text_card_with`] using the configured font.
pub fn render_text_card(text: &str, config: &RenderConfig) -> ReelResult<Surface> {
    let mut engine = TextLayoutEngine::from_config(config)?.ok_or_else(|| {
        ReelError::validation(
            "text cards need a font: none is installed, set font_path or REELKIT_FONT",
        )
    })?;
    render_text_card_with(text, config, &mut engine)
}

/// Draw a caption with its drop shadow.
pub fn draw_caption(
    surface: &mut Surface,
    engine: &mut TextLayoutEngine,
    caption: &Caption,
    style: &CaptionStyle,
) -> ReelResult<()> {
    let color = parse_css_color(&caption.color)?;
    let center = caption
        .position
        .to_pixels(surface.width(), surface.height());

    if style.shadow_rgba[3] > 0 {
        let mut shadow = Surface::new(surface.canvas())?;
        engine.draw_centered(
            &mut shadow,
            &caption.text,
            caption.size,
            style.shadow_rgba,
            center,
        )?;
        let (w, h) = (shadow.width(), shadow.height());
        blur_in_place(shadow.pixels_mut(), w, h, style.shadow_blur_px / 2.0)?;
        surface.composite(shadow.pixels(), 1.0)?;
    }
    engine.draw_centered(surface, &caption.text, caption.size, color, center)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
