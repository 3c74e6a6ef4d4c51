//! CPU-side vertex, index and command buffers.
//!
//! Visuals tessellate their content into a [`VisualMesh`]. Once per frame the
//! [`MeshBuffer`] concatenates every visible visual mesh into a [`DrawList`],
//! one [`DrawBuffer`] per material, which the renderer uploads wholesale.

mod buffer;
mod primitives;

pub use buffer::MeshBuffer;

use crate::geometry::Rect;

pub type DrawIndex = u32;

/// Native name of a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl DrawVertex {
    pub fn new(pos: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self { pos, uv, color }
    }
}

/// One indexed draw call: `elem_count` indices drawn with `clip_rect` as scissor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub clip_rect: Rect,
    pub elem_count: u32,
    pub texture: Option<TextureId>,
}

/// Geometry for a single material, local to one producer.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<DrawVertex>,
    pub indices: Vec<DrawIndex>,
    pub commands: Vec<DrawCommand>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.commands.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices onto this one's vertices.
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as DrawIndex;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        for cmd in &other.commands {
            self.push_elements(cmd.texture, cmd.elem_count);
        }
    }

    /// Record `count` freshly pushed indices, starting a new command when the
    /// texture changes.
    fn push_elements(&mut self, texture: Option<TextureId>, count: u32) {
        if count == 0 {
            return;
        }
        match self.commands.last_mut() {
            Some(last) if last.texture == texture => last.elem_count += count,
            _ => self.commands.push(DrawCommand {
                clip_rect: Rect::default(),
                elem_count: count,
                texture,
            }),
        }
    }
}

/// The three per-material meshes produced by one visual.
#[derive(Debug, Clone, Default)]
pub struct VisualMesh {
    /// Solid fills and strokes.
    pub shape: Mesh,
    /// Quadratic curve triangles, anti-aliased by the curved material.
    pub bezier: Mesh,
    /// Textured quads.
    pub image: Mesh,
}

impl VisualMesh {
    pub fn clear(&mut self) {
        self.shape.clear();
        self.bezier.clear();
        self.image.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty() && self.bezier.is_empty() && self.image.is_empty()
    }
}

/// A frame's worth of geometry for one material.
#[derive(Debug, Clone, Default)]
pub struct DrawBuffer {
    pub command_buffer: Vec<DrawCommand>,
    pub index_buffer: Vec<DrawIndex>,
    pub vertex_buffer: Vec<DrawVertex>,
}

impl DrawBuffer {
    pub fn clear(&mut self) {
        self.command_buffer.clear();
        self.index_buffer.clear();
        self.vertex_buffer.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.command_buffer.is_empty()
    }

    /// Append a mesh clipped to `clip_rect`.
    ///
    /// Adjacent commands sharing clip rect and texture are merged so the
    /// renderer issues as few draw calls as possible.
    pub fn append(&mut self, mesh: &Mesh, clip_rect: Rect) {
        let base = self.vertex_buffer.len() as DrawIndex;
        self.vertex_buffer.extend_from_slice(&mesh.vertices);
        self.index_buffer
            .extend(mesh.indices.iter().map(|i| i + base));

        for cmd in mesh.commands.iter().filter(|c| c.elem_count > 0) {
            match self.command_buffer.last_mut() {
                Some(last) if last.clip_rect == clip_rect && last.texture == cmd.texture => {
                    last.elem_count += cmd.elem_count;
                }
                _ => self.command_buffer.push(DrawCommand {
                    clip_rect,
                    elem_count: cmd.elem_count,
                    texture: cmd.texture,
                }),
            }
        }
    }
}

/// Draw buffers for the plain, curved and image materials, drawn in that order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub draw_buffer: DrawBuffer,
    pub bezier_buffer: DrawBuffer,
    pub image_buffer: DrawBuffer,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.draw_buffer.clear();
        self.bezier_buffer.clear();
        self.image_buffer.clear();
    }

    pub fn append_visual_mesh(&mut self, mesh: &VisualMesh, clip_rect: Rect) {
        self.draw_buffer.append(&mesh.shape, clip_rect);
        self.bezier_buffer.append(&mesh.bezier, clip_rect);
        self.image_buffer.append(&mesh.image, clip_rect);
    }

    pub fn command_count(&self) -> usize {
        self.draw_buffer.command_buffer.len()
            + self.bezier_buffer.command_buffer.len()
            + self.image_buffer.command_buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn quad(x: f32) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_rect_filled(Rect::new(x, 0.0, 10.0, 10.0), Color::WHITE);
        mesh
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut buffer = DrawBuffer::default();
        let clip = Rect::new(0.0, 0.0, 100.0, 100.0);
        buffer.append(&quad(0.0), clip);
        buffer.append(&quad(20.0), clip);

        assert_eq!(buffer.vertex_buffer.len(), 8);
        assert_eq!(buffer.index_buffer.len(), 12);
        assert!(buffer.index_buffer[6..].iter().all(|&i| (4..8).contains(&i)));
        // Same clip and texture: one merged command.
        assert_eq!(buffer.command_buffer.len(), 1);
        assert_eq!(buffer.command_buffer[0].elem_count, 12);
    }

    #[test]
    fn test_different_clip_starts_new_command() {
        let mut buffer = DrawBuffer::default();
        buffer.append(&quad(0.0), Rect::new(0.0, 0.0, 50.0, 50.0));
        buffer.append(&quad(0.0), Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(buffer.command_buffer.len(), 2);
        assert_eq!(buffer.command_buffer[1].clip_rect, Rect::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_empty_mesh_adds_no_command() {
        let mut buffer = DrawBuffer::default();
        buffer.append(&Mesh::new(), Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_draw_list_clear() {
        let mut list = DrawList::new();
        let mut mesh = VisualMesh::default();
        mesh.shape = quad(0.0);
        list.append_visual_mesh(&mesh, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(list.command_count(), 1);
        list.clear();
        assert_eq!(list.command_count(), 0);
        assert!(list.draw_buffer.vertex_buffer.is_empty());
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<DrawVertex>(), 32);
        let v = DrawVertex::new([1.0, 2.0], [0.5, 0.5], [1.0, 0.0, 0.0, 1.0]);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 32);
    }
}
