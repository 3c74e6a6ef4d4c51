//! Platform collaborators: windows, cursors, textures and text shaping.
//!
//! These are consumed at initialization time; nothing here is on the
//! per-frame hot path except the [`Texture`] handles the meshes reference.

mod texture;

#[cfg(test)]
pub(crate) mod testing;

use std::rc::Rc;

use raw_window_handle::HasWindowHandle;

pub use texture::{GlTexture, TextureData};

use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::mesh::TextureId;
use crate::renderer::GlApi;
use crate::text::TextShaper;

/// A texture living on the GPU, referenced by meshes through its id.
///
/// Meshes and content only borrow textures; the owner releases them.
pub trait Texture: std::fmt::Debug {
    fn id(&self) -> TextureId;

    /// Size in pixels.
    fn size(&self) -> Size;
}

/// Kinds of native windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// A regular decorated top-level window.
    #[default]
    Regular,
    /// A borderless tool window without a taskbar entry.
    ToolBox,
}

/// Standard cursor icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// The default arrow cursor.
    #[default]
    Default,
    /// Text selection cursor (I-beam).
    Text,
    /// Pointer/hand cursor for clickable elements.
    Pointer,
    Crosshair,
    Move,
    NotAllowed,
    /// Resize cursors for window edges.
    ResizeHorizontal,
    ResizeVertical,
    ResizeNorthEastSouthWest,
    ResizeNorthWestSouthEast,
    Wait,
}

/// A native window the renderer can draw into.
pub trait Window: HasWindowHandle {
    fn position(&self) -> Point;

    /// Client area size in pixels.
    fn size(&self) -> Size;
}

/// Creates GL contexts bound to native windows.
pub trait GlContextProvider {
    type Gl: GlApi;

    /// Create a context for `window` and make it current on this thread.
    fn create_context(&mut self, window: &dyn Window) -> Result<Self::Gl>;
}

/// Window system services used by the core.
pub trait PlatformContext {
    type Window: Window;

    fn create_window(
        &mut self,
        position: Point,
        size: Size,
        window_type: WindowType,
    ) -> Result<Self::Window>;

    /// Upload decoded pixels and return a shareable handle.
    fn create_texture(&mut self, data: &TextureData) -> Result<Rc<dyn Texture>>;

    fn change_cursor(&mut self, cursor: Cursor);

    fn text_shaper(&mut self) -> &mut dyn TextShaper;
}
