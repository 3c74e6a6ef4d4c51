use super::DrawList;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::visual::{NodeId, VisualTree};

/// Collects the meshes of every visible visual into a frame's [`DrawList`].
#[derive(Debug, Default)]
pub struct MeshBuffer {
    draw_list: DrawList,
}

impl MeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the draw list from scratch.
    ///
    /// Visuals are visited in pre-order so later siblings draw on top.
    /// Inactive subtrees and visuals outside their clip rect are skipped
    /// along with their descendants.
    pub fn build(&mut self, tree: &VisualTree, root: NodeId, root_clip: Rect) -> Result<&DrawList> {
        if !tree.contains(root) {
            return Err(Error::NodeNotFound(root));
        }
        self.draw_list.clear();
        if tree.active_in_tree(root) {
            let clip = tree.clip_rect(root, root_clip);
            self.append_subtree(tree, root, clip);
        }
        log::trace!(
            "mesh buffer built: {} plain, {} curved, {} image commands",
            self.draw_list.draw_buffer.command_buffer.len(),
            self.draw_list.bezier_buffer.command_buffer.len(),
            self.draw_list.image_buffer.command_buffer.len()
        );
        Ok(&self.draw_list)
    }

    fn append_subtree(&mut self, tree: &VisualTree, id: NodeId, clip: Rect) {
        let Some(visual) = tree.get(id) else {
            return;
        };
        if !visual.active_self || visual.is_clipped(clip) {
            return;
        }
        if let Some(mesh) = tree.mesh(id) {
            self.draw_list.append_visual_mesh(mesh, clip);
        }
        let child_clip = clip.intersect(&visual.children_clip_area());
        for &child in tree.children(id) {
            self.append_subtree(tree, child, child_clip);
        }
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }
}
