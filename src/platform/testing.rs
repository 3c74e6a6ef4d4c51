use std::rc::Rc;

use super::{Cursor, GlTexture, PlatformContext, Texture, TextureData, WindowType};
use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::mesh::TextureId;
use crate::renderer::testing::{FakeGl, FakeWindow};
use crate::text::testing::CountingShaper;
use crate::text::TextShaper;

/// A texture that exists only as an id and a size.
#[derive(Debug)]
pub struct FakeTexture {
    id: TextureId,
    size: Size,
}

impl FakeTexture {
    pub fn new(id: u32, width: u32, height: u32) -> Self {
        Self {
            id: TextureId(id),
            size: Size::new(width as f32, height as f32),
        }
    }
}

impl Texture for FakeTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn size(&self) -> Size {
        self.size
    }
}

/// Platform backed by the fake GL context and the counting shaper.
pub struct FakePlatform {
    pub gl: FakeGl,
    pub shaper: CountingShaper,
    pub cursor: Cursor,
    pub windows: Vec<(Point, Size, WindowType)>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            gl: FakeGl::new(),
            shaper: CountingShaper::new(),
            cursor: Cursor::default(),
            windows: Vec::new(),
        }
    }
}

impl PlatformContext for FakePlatform {
    type Window = FakeWindow;

    fn create_window(
        &mut self,
        position: Point,
        size: Size,
        window_type: WindowType,
    ) -> Result<FakeWindow> {
        self.windows.push((position, size, window_type));
        Ok(FakeWindow::with_handle())
    }

    fn create_texture(&mut self, data: &TextureData) -> Result<Rc<dyn Texture>> {
        Ok(Rc::new(GlTexture::upload(&self.gl, data)?))
    }

    fn change_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn text_shaper(&mut self) -> &mut dyn TextShaper {
        &mut self.shaper
    }
}
