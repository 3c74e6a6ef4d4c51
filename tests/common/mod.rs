#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use plume::geometry::{Size, Vector};
use plume::mesh::TextureId;
use plume::platform::Texture;
use plume::style::{Font, TextAlignment};
use plume::text::{
    read_glyph, Glyph, GlyphOutline, GlyphPoint, PositionedGlyph, TextContext, TextShaper,
};
use plume::Result;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Square glyph with a bulging top edge, `size` pixels wide.
fn block_outline(size: f32) -> GlyphOutline {
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

pub struct BlockText {
    text: String,
    size: Size,
    glyphs: Vec<PositionedGlyph>,
    live: Rc<Cell<usize>>,
}

impl TextContext for BlockText {
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

impl Drop for BlockText {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

/// Lays text out as one block per non-space character, half the font size wide.
#[derive(Default)]
pub struct BlockShaper {
    pub shaped: usize,
    pub live: Rc<Cell<usize>>,
}

impl BlockShaper {
    pub fn live_contexts(&self) -> usize {
        self.live.get()
    }
}

impl TextShaper for BlockShaper {
    fn create_text_context(
        &mut self,
        text: &str,
        font: &Font,
        _max_width: f32,
        _max_height: f32,
        _alignment: TextAlignment,
    ) -> Result<Box<dyn TextContext>> {
        self.shaped += 1;
        self.live.set(self.live.get() + 1);
        let advance = font.size * 0.5;
        let outline = Rc::new(block_outline(advance));
        let glyphs = text
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| PositionedGlyph {
                outline: outline.clone(),
                offset: Vector::new(i as f32 * advance, font.size),
                scale: 1.0,
            })
            .collect();
        Ok(Box::new(BlockText {
            text: text.to_string(),
            size: Size::new(text.chars().count() as f32 * advance, font.size),
            glyphs,
            live: self.live.clone(),
        }))
    }

    fn measure(&mut self, text: &str, font: &Font) -> Result<Size> {
        Ok(Size::new(text.chars().count() as f32 * font.size * 0.5, font.size))
    }
}

#[derive(Debug)]
pub struct StubTexture {
    pub id: u32,
    pub size: Size,
}

impl Texture for StubTexture {
    fn id(&self) -> TextureId {
        TextureId(self.id)
    }

    fn size(&self) -> Size {
        self.size
    }
}
