use std::rc::Rc;

use ab_glyph::{Font as _, FontRef, GlyphId, Outline, OutlineCurve};
use cosmic_text::{fontdb, Buffer, FontSystem, Metrics, Shaping};
use rustc_hash::FxHashMap;

use super::{read_glyph, Glyph, GlyphOutline, GlyphPoint, PositionedGlyph, TextContext, TextShaper};
use crate::error::{Error, Result};
use crate::geometry::{Size, Vector};
use crate::style::{Font, TextAlignment};

/// Text shaper backed by cosmic-text, with glyph outlines read through ab_glyph.
///
/// Outlines are cached per face and glyph so repeated characters are only
/// parsed once.
pub struct CosmicTextShaper {
    font_system: FontSystem,
    outlines: FxHashMap<(fontdb::ID, u16), (Rc<GlyphOutline>, f32)>,
}

impl CosmicTextShaper {
    /// Shaper over the system font collection.
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            outlines: FxHashMap::default(),
        }
    }

    /// Register an additional font file held in memory.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
    }

    fn layout(
        &mut self,
        text: &str,
        font: &Font,
        max_width: Option<f32>,
        max_height: Option<f32>,
        alignment: TextAlignment,
    ) -> Buffer {
        let metrics = Metrics::new(font.size, font.line_height());
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        buffer.set_size(&mut self.font_system, max_width, max_height);
        buffer.set_text(
            &mut self.font_system,
            text,
            &font.to_attrs(),
            Shaping::Advanced,
            Some(alignment.to_cosmic()),
        );
        buffer.shape_until_scroll(&mut self.font_system, true);
        buffer
    }

    fn outline(&mut self, face: fontdb::ID, glyph_id: u16) -> Option<(Rc<GlyphOutline>, f32)> {
        if let Some(cached) = self.outlines.get(&(face, glyph_id)) {
            return Some(cached.clone());
        }

        let (glyph, units_per_em) = self
            .font_system
            .db()
            .with_face_data(face, |data, index| {
                let font = FontRef::try_from_slice_and_index(data, index).ok()?;
                let units_per_em = font.units_per_em()?;
                let glyph = font
                    .outline(GlyphId(glyph_id))
                    .map(|o| outline_to_glyph(&o))
                    .unwrap_or_default();
                Some((glyph, units_per_em))
            })
            .flatten()?;

        let entry = (Rc::new(read_glyph(&glyph)), units_per_em);
        self.outlines.insert((face, glyph_id), entry.clone());
        Some(entry)
    }
}

impl Default for CosmicTextShaper {
    fn default() -> Self {
        Self::new()
    }
}

fn bound(value: f32) -> Option<f32> {
    (value > 0.0).then_some(value)
}

impl TextShaper for CosmicTextShaper {
    fn create_text_context(
        &mut self,
        text: &str,
        font: &Font,
        max_width: f32,
        max_height: f32,
        alignment: TextAlignment,
    ) -> Result<Box<dyn TextContext>> {
        let buffer = self.layout(text, font, bound(max_width), bound(max_height), alignment);

        let mut placed = Vec::new();
        let mut size = Size::zero();
        for run in buffer.layout_runs() {
            size.width = size.width.max(run.line_w);
            size.height += run.line_height;
            for glyph in run.glyphs {
                placed.push((
                    glyph.font_id,
                    glyph.glyph_id,
                    glyph.x + glyph.font_size * glyph.x_offset,
                    run.line_y + glyph.y - glyph.font_size * glyph.y_offset,
                    glyph.font_size,
                ));
            }
        }

        let mut glyphs = Vec::with_capacity(placed.len());
        for (face, glyph_id, x, baseline, font_size) in placed {
            let Some((outline, units_per_em)) = self.outline(face, glyph_id) else {
                return Err(Error::TextShaping(format!(
                    "no outline data for glyph {glyph_id} of face {face:?}"
                )));
            };
            if outline.is_empty() {
                continue;
            }
            glyphs.push(PositionedGlyph {
                outline,
                offset: Vector::new(x, baseline),
                scale: font_size / units_per_em,
            });
        }

        log::trace!("shaped {:?} into {} glyphs", text, glyphs.len());
        Ok(Box::new(CosmicTextContext {
            text: text.to_string(),
            size,
            glyphs,
        }))
    }

    fn measure(&mut self, text: &str, font: &Font) -> Result<Size> {
        let buffer = self.layout(text, font, None, None, TextAlignment::Leading);

        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }

        // Ensure minimum height for empty text
        if height == 0.0 {
            height = font.line_height();
        }

        Ok(Size::new(width, height))
    }
}

struct CosmicTextContext {
    text: String,
    size: Size,
    glyphs: Vec<PositionedGlyph>,
}

impl TextContext for CosmicTextContext {
    fn text(&self) -> &str {
        &self.text
    }

    fn size(&self) -> Size {
        self.size
    }

    fn glyphs(&self) -> &[PositionedGlyph] {
        &self.glyphs
    }
}

/// Rebuild on/off-curve contours from an ab_glyph outline.
///
/// A curve whose start differs from the previous curve's end opens a new
/// contour. Cubic curves are approximated by a single quadratic.
fn outline_to_glyph(outline: &Outline) -> Glyph {
    let mut glyph = Glyph::default();
    let mut last_end: Option<ab_glyph::Point> = None;

    for curve in &outline.curves {
        let (start, control, end) = match *curve {
            OutlineCurve::Line(p0, p1) => (p0, None, p1),
            OutlineCurve::Quad(p0, p1, p2) => (p0, Some(p1), p2),
            OutlineCurve::Cubic(p0, p1, p2, p3) => (p0, Some(cubic_to_quad_control(p0, p1, p2, p3)), p3),
        };

        if last_end.is_some_and(|e| e != start) && !glyph.points.is_empty() {
            glyph.end_points.push((glyph.points.len() - 1) as u16);
        }
        glyph.points.push(GlyphPoint::on(start.x, start.y));
        if let Some(c) = control {
            glyph.points.push(GlyphPoint::off(c.x, c.y));
        }
        last_end = Some(end);
    }
    if !glyph.points.is_empty() {
        glyph.end_points.push((glyph.points.len() - 1) as u16);
    }
    glyph
}

fn cubic_to_quad_control(
    p0: ab_glyph::Point,
    p1: ab_glyph::Point,
    p2: ab_glyph::Point,
    p3: ab_glyph::Point,
) -> ab_glyph::Point {
    ab_glyph::point(
        (3.0 * (p1.x + p2.x) - (p0.x + p3.x)) / 4.0,
        (3.0 * (p1.y + p2.y) - (p0.y + p3.y)) / 4.0,
    )
}
