//! Text shaping seam and glyph tessellation.
//!
//! The core never shapes text itself. A [`TextShaper`] turns a string and a
//! [`Font`] into a [`TextContext`] holding positioned glyph outlines, and the
//! [`TextMesh`] walks those outlines to produce fill and curve triangles.

mod cosmic;
mod glyph_loader;
mod text_mesh;

#[cfg(test)]
pub(crate) mod testing;

use std::rc::Rc;

pub use cosmic::CosmicTextShaper;
pub use glyph_loader::{read_glyph, Glyph, GlyphOutline, GlyphPoint};
pub use text_mesh::TextMesh;

use crate::error::Result;
use crate::geometry::{Point, Size, Vector};
use crate::style::{Font, TextAlignment};

/// A glyph outline placed on the text box.
#[derive(Debug, Clone)]
pub struct PositionedGlyph {
    /// Outline in font units, Y pointing down.
    pub outline: Rc<GlyphOutline>,
    /// Pen position of the glyph origin relative to the text box, baseline included.
    pub offset: Vector,
    /// Font units to pixels.
    pub scale: f32,
}

impl PositionedGlyph {
    /// Map a point of the outline into text box coordinates anchored at `origin`.
    pub fn transform(&self, origin: Point, p: Point) -> Point {
        Point::new(
            origin.x + self.offset.x + p.x * self.scale,
            origin.y + self.offset.y + p.y * self.scale,
        )
    }
}

/// Shaped text handed out by a [`TextShaper`].
///
/// Platform resources held by the context are released when it is dropped.
pub trait TextContext {
    fn text(&self) -> &str;

    /// Size of the laid out text.
    fn size(&self) -> Size;

    fn glyphs(&self) -> &[PositionedGlyph];
}

/// Platform text-shaping collaborator.
pub trait TextShaper {
    /// Shape `text` into a box of at most `max_width` x `max_height` pixels.
    /// A non-positive bound leaves that dimension unconstrained.
    fn create_text_context(
        &mut self,
        text: &str,
        font: &Font,
        max_width: f32,
        max_height: f32,
        alignment: TextAlignment,
    ) -> Result<Box<dyn TextContext>>;

    /// Natural size of `text` without wrapping.
    fn measure(&mut self, text: &str, font: &Font) -> Result<Size>;
}

/// Shaped text positioned at an origin, ready to be drawn.
#[derive(Clone)]
pub struct GlyphRun {
    pub origin: Point,
    pub text: Rc<dyn TextContext>,
}

impl GlyphRun {
    pub fn new(origin: Point, text: Rc<dyn TextContext>) -> Self {
        Self { origin, text }
    }

    /// Shape `text` with `font` and place it at `origin`.
    pub fn shape(
        shaper: &mut dyn TextShaper,
        origin: Point,
        text: &str,
        font: &Font,
        alignment: TextAlignment,
    ) -> Result<Self> {
        let context = shaper.create_text_context(text, font, 0.0, 0.0, alignment)?;
        Ok(Self::new(origin, Rc::from(context)))
    }
}

impl std::fmt::Debug for GlyphRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRun")
            .field("origin", &self.origin)
            .field("text", &self.text.text())
            .finish()
    }
}
