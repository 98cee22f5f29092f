//! Single-line text layout and drawing onto the overlay layer.

use vello_cpu::kurbo::{Affine, Rect};

use crate::{
    builtin_font,
    config::Rgb8,
    fonts::FontHandle,
    foundation::error::{StripError, StripResult},
};

/// Brush carried through parley styles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgb8> for TextBrush {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// Owns the parley contexts for one composition.
pub struct TextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPainter {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    fn layout(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        family: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> StripResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StripError::render("text size must be finite and > 0"));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        // Collections register several families; prefer the one resolved for this handle.
        let names: Vec<String> = families
            .iter()
            .filter_map(|(id, _)| self.font_ctx.collection.family_name(*id).map(str::to_string))
            .collect();
        let family_name = names
            .iter()
            .find(|name| name.as_str() == family)
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| StripError::render("no font families registered from font bytes"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Draw `text` with its bounding box centered on `(cx, cy)`.
    ///
    /// Leaves the context transform at identity. Outline fonts that fail to
    /// shape are drawn with the built-in face instead.
    pub fn draw_centered(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        font: &FontHandle,
        color: Rgb8,
        center: (f32, f32),
    ) {
        if text.is_empty() {
            return;
        }
        if let FontHandle::Outline {
            font_bytes,
            face_index,
            family,
            size_px,
            ..
        } = font
        {
            match self.layout(text, font_bytes, family, *size_px, color.into()) {
                Ok(layout) => {
                    let data = vello_cpu::peniko::FontData::new(
                        vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
                        *face_index,
                    );
                    draw_layout(ctx, &layout, &data, center);
                    return;
                }
                Err(err) => tracing::warn!(%err, text, "outline layout failed, using built-in face"),
            }
        }
        draw_builtin(ctx, text, font.size_px(), color, center);
    }
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrush>,
    font: &vello_cpu::peniko::FontData,
    (cx, cy): (f32, f32),
) {
    let x0 = f64::from(cx - layout.width() / 2.0);
    let y0 = f64::from(cy - layout.height() / 2.0);
    ctx.set_transform(Affine::translate((x0, y0)));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            // Positions are relative to the layout origin, baseline included.
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(Affine::IDENTITY);
}

fn draw_builtin(
    ctx: &mut vello_cpu::RenderContext,
    text: &str,
    size_px: f32,
    color: Rgb8,
    (cx, cy): (f32, f32),
) {
    let (w, h) = builtin_font::measure(text, size_px);
    let x0 = f64::from(cx - w / 2.0);
    let y0 = f64::from(cy - h / 2.0);

    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, 255,
    ));
    builtin_font::for_each_dot(text, size_px, |x, y, side| {
        let (x, y, side) = (x0 + f64::from(x), y0 + f64::from(y), f64::from(side));
        ctx.fill_rect(&Rect::new(x, y, x + side, y + side));
    });
}
