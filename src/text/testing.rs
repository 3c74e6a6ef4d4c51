//! In-memory text shaping used by unit tests.

use std::cell::Cell;
use std::rc::Rc;

use super::{read_glyph, Glyph, GlyphOutline, GlyphPoint, PositionedGlyph, TextContext, TextShaper};
use crate::error::Result;
use crate::geometry::{Size, Vector};
use crate::style::{Font, TextAlignment};

/// Lays every character out as a square glyph of side `size` with one curved top edge.
pub struct FakeTextContext {
    text: String,
    size: Size,
    glyphs: Vec<PositionedGlyph>,
    dropped: Option<Rc<Cell<usize>>>,
}

impl FakeTextContext {
    pub fn boxes(text: &str, size: f32) -> Self {
        let outline = Rc::new(square_outline(size));
        let glyphs = (0..text.chars().count())
            .map(|i| PositionedGlyph {
                outline: outline.clone(),
                offset: Vector::new(i as f32 * size, size),
                scale: 1.0,
            })
            .collect::<Vec<_>>();
        Self {
            text: text.to_string(),
            size: Size::new(glyphs.len() as f32 * size, size),
            glyphs,
            dropped: None,
        }
    }
}

fn square_outline(size: f32) -> GlyphOutline {
    read_glyph(&Glyph {
        points: vec![
            GlyphPoint::on(0.0, 0.0),
            GlyphPoint::on(0.0, size),
            GlyphPoint::off(size / 2.0, size * 1.5),
            GlyphPoint::on(size, size),
            GlyphPoint::on(size, 0.0),
        ],
        end_points: vec![4],
    })
}

impl Drop for FakeTextContext {
    fn drop(&mut self) {
        if let Some(dropped) = &self.dropped {
            dropped.set(dropped.get() + 1);
        }
    }
}

impl TextContext for FakeTextContext {
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

/// Shaper that counts created and released contexts.
#[derive(Default)]
pub struct CountingShaper {
    pub created: usize,
    pub measured: usize,
    pub dropped: Rc<Cell<usize>>,
}

impl CountingShaper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn released(&self) -> usize {
        self.dropped.get()
    }
}

impl TextShaper for CountingShaper {
    fn create_text_context(
        &mut self,
        text: &str,
        font: &Font,
        _max_width: f32,
        _max_height: f32,
        _alignment: TextAlignment,
    ) -> Result<Box<dyn TextContext>> {
        self.created += 1;
        let mut context = FakeTextContext::boxes(text, font.size);
        context.dropped = Some(self.dropped.clone());
        Ok(Box::new(context))
    }

    fn measure(&mut self, text: &str, font: &Font) -> Result<Size> {
        self.measured += 1;
        Ok(Size::new(text.chars().count() as f32 * font.size * 0.5, font.size))
    }
}
