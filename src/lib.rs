//! Rendering and layout core for an immediate-mode GUI.
//!
//! Visuals live in a [`VisualTree`](visual::VisualTree). Each frame the tree
//! is laid out, every dirty visual regenerates its [`Mesh`](mesh::Mesh), the
//! meshes are batched into a [`DrawList`](mesh::DrawList) and the
//! [`Renderer`](renderer::Renderer) draws that list with OpenGL.

pub mod content;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod mesh;
pub mod platform;
pub mod render_stats;
pub mod renderer;
pub mod style;
pub mod text;
pub mod visual;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::content::{Content, ContentCache};
    pub use crate::drawing::{
        Brush, DrawingContext, Geometry, ImageGeometry, PathCommand, PathGeometry, Pen,
        TextGeometry,
    };
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Point, Rect, Size, Thickness, Vector};
    pub use crate::layout::{LayoutKind, LayoutOption};
    pub use crate::mesh::{DrawList, Mesh, MeshBuffer, TextureId};
    pub use crate::platform::{Cursor, PlatformContext, Texture, TextureData, Window, WindowType};
    pub use crate::render_stats::FrameStats;
    pub use crate::renderer::{Renderer, RendererConfig};
    pub use crate::style::{Alignment, Color, Font, Style, TextAlignment};
    pub use crate::text::{CosmicTextShaper, TextShaper};
    pub use crate::visual::{NodeId, RenderContext, Visual, VisualTree};
}
