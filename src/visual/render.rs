use super::{NodeId, Visual, VisualFlags, VisualTree};
use crate::content::ContentCache;
use crate::drawing::{DrawingContext, Geometry, MeshDrawingContext};
use crate::error::{Error, Result};
use crate::mesh::VisualMesh;
use crate::render_stats::FrameStats;
use crate::style::Color;
use crate::text::TextShaper;

/// Everything a render pass needs besides the tree itself.
///
/// The content cache is owned by the caller and lent to each pass.
pub struct RenderContext<'a> {
    pub shaper: &'a mut dyn TextShaper,
    pub content_cache: &'a mut ContentCache,
    pub stats: FrameStats,
}

impl<'a> RenderContext<'a> {
    pub fn new(shaper: &'a mut dyn TextShaper, content_cache: &'a mut ContentCache) -> Self {
        Self {
            shaper,
            content_cache,
            stats: FrameStats::default(),
        }
    }
}

impl VisualTree {
    /// Regenerate the meshes of every dirty visual under `root`.
    ///
    /// The root is always visited. Below it, only children flagged
    /// `SUBTREE_DIRTY_FOR_RENDER` are descended into, so clean subtrees
    /// cost nothing.
    pub fn render(&mut self, root: NodeId, ctx: &mut RenderContext<'_>) -> Result<()> {
        if !self.contains(root) {
            return Err(Error::NodeNotFound(root));
        }
        let before = ctx.stats;
        self.render_recursive(root, ctx)?;
        log::debug!(
            "render pass: visited {} visuals, rendered {}",
            ctx.stats.visuals_visited - before.visuals_visited,
            ctx.stats.contents_rendered - before.contents_rendered
        );
        Ok(())
    }

    fn render_recursive(&mut self, id: NodeId, ctx: &mut RenderContext<'_>) -> Result<()> {
        ctx.stats.visuals_visited += 1;

        let dirty = self.get(id).is_some_and(|v| v.is_content_dirty());
        if dirty {
            if let Some((visual, mesh)) = self.visual_and_mesh_mut(id) {
                render_content(visual, mesh, ctx)?;
            }
            ctx.stats.contents_rendered += 1;
            if let Some(visual) = self.get_mut(id) {
                visual.set_flags(false, VisualFlags::CONTENT_DIRTY);
            }
        }

        // Index iteration: the child list cannot be borrowed across the recursion.
        for index in 0..self.child_count(id) {
            let Some(child) = self.get_visual_by_index(id, index) else {
                break;
            };
            if self.get(child).is_some_and(|v| v.is_subtree_dirty()) {
                self.render_recursive(child, ctx)?;
            }
        }

        if let Some(visual) = self.get_mut(id) {
            visual.set_flags(false, VisualFlags::SUBTREE_DIRTY_FOR_RENDER);
        }
        Ok(())
    }
}

/// Turn a visual's state into its meshes, replacing the previous ones.
fn render_content(visual: &Visual, mesh: &mut VisualMesh, ctx: &mut RenderContext<'_>) -> Result<()> {
    mesh.clear();

    if visual.use_box_model {
        render_box(visual, mesh);
    }

    if let Some(content) = &visual.content {
        let mut drawing = MeshDrawingContext::new(mesh);
        content.replay(&mut drawing);
        return drawing.close();
    }

    match &visual.geometry {
        None => Ok(()),
        Some(Geometry::Path(path)) => {
            let mut drawing = MeshDrawingContext::new(mesh);
            drawing.draw_geometry(None, None, path);
            drawing.close()
        }
        Some(Geometry::Text(text)) => {
            let content = ctx.content_cache.cached(&text.text, &visual.cache_key());
            let mut content = content.borrow_mut();
            if content.build(visual.content_rect(), &visual.style, ctx.shaper)? {
                ctx.stats.text_contexts_created += 1;
            } else {
                ctx.stats.text_builds_skipped += 1;
            }
            content.text_mesh().append_to(mesh, visual.style.font_color);
            Ok(())
        }
        Some(Geometry::Image(image)) => {
            let rect = visual.content_rect();
            let texture = &image.texture;
            match image.slice {
                Some(slice) => {
                    mesh.image
                        .add_image_sliced(rect, texture.size(), slice, texture.id(), Color::WHITE)
                }
                None => mesh
                    .image
                    .add_image_rect(rect, [0.0, 0.0], [1.0, 1.0], texture.id(), Color::WHITE),
            }
            Ok(())
        }
    }
}

/// Background and border of a box-model visual.
fn render_box(visual: &Visual, mesh: &mut VisualMesh) {
    let style = &visual.style;
    let rect = visual.rect;
    let radius = style.corner_radius;

    if !style.background_color.is_transparent() {
        if radius > 0.0 {
            mesh.shape
                .add_rounded_rect_filled(rect, radius, radius, style.background_color);
        } else {
            mesh.shape.add_rect_filled(rect, style.background_color);
        }
    }

    if style.border.is_zero() || style.border_color.is_transparent() {
        return;
    }
    if radius > 0.0 {
        let b = style.border;
        let thickness = b.top.max(b.right).max(b.bottom).max(b.left);
        mesh.shape
            .add_rounded_rect_stroke(rect, radius, radius, style.border_color, thickness);
    } else {
        mesh.shape.add_rect_border(rect, style.border, style.border_color);
    }
}
