//! Arena storage for visuals.
//!
//! Visuals are stored densely with a sparse map from generational handles to
//! dense slots, so lookups are O(1) and removal is a swap-remove. The parent
//! owns the ordered list of child handles; the child keeps its parent handle
//! for lookups only.

use super::{Visual, VisualFlags};
use crate::content::ContentCache;
use crate::drawing::{DrawingContent, Geometry, RecordingContext};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::mesh::VisualMesh;
use crate::style::Style;

/// Handle to a visual in a [`VisualTree`].
///
/// Contains an index plus a generation counter that increments whenever the
/// slot is reused, so stale handles are detected instead of aliasing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

struct Node {
    visual: Visual,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Output of the last content render.
    mesh: VisualMesh,
    /// Size computed by the last layout measure pass.
    desired_size: Option<Size>,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// Owner of every visual and of the per-visual meshes.
#[derive(Default)]
pub struct VisualTree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    /// Last generation handed out per sparse slot, kept after the slot is freed.
    generations: Vec<u32>,
    free_indices: Vec<u32>,
}

impl VisualTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a detached visual and return its handle.
    pub fn insert(&mut self, visual: Visual) -> NodeId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let generation = self.generations[idx as usize].wrapping_add(1);
            self.generations[idx as usize] = generation;
            (idx, generation)
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            self.generations.push(0);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            visual,
            parent: None,
            children: Vec::new(),
            mesh: VisualMesh::default(),
            desired_size: None,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        NodeId::new(sparse_index, generation)
    }

    fn dense_index(&self, id: NodeId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation)
            .map(|e| e.dense_index)
    }

    fn require(&self, id: NodeId) -> Result<usize> {
        self.dense_index(id).ok_or(Error::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Visual> {
        self.dense_index(id).map(|idx| &self.dense[idx].visual)
    }

    /// Direct access to a visual. Changes made here are not tracked; use the
    /// `set_*` methods for anything that affects rendering.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Visual> {
        self.dense_index(id).map(|idx| &mut self.dense[idx].visual)
    }

    /// The mesh produced by the visual's last content render.
    pub fn mesh(&self, id: NodeId) -> Option<&VisualMesh> {
        self.dense_index(id).map(|idx| &self.dense[idx].mesh)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.dense_index(id).and_then(|idx| self.dense[idx].parent)
    }

    /// Child handles in insertion order, which is also drawing order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.dense_index(id) {
            Some(idx) => &self.dense[idx].children,
            None => &[],
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn get_visual_by_index(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Append `child` at the end of `parent`'s children.
    ///
    /// A child that already has a parent is moved: it is detached from the
    /// old parent's child list first rather than only having its parent
    /// overwritten, and a child may not become its own ancestor. Pending
    /// render work in the child is propagated to its new ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.require(parent)?;
        let child_idx = self.require(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::InvalidHierarchy(child));
        }

        if let Some(old_parent) = self.dense[child_idx].parent {
            if let Some(old_idx) = self.dense_index(old_parent) {
                self.dense[old_idx].children.retain(|&c| c != child);
            }
        }
        self.dense[child_idx].parent = Some(parent);
        let parent_idx = self.require(parent)?;
        self.dense[parent_idx].children.push(child);

        if self.dense[child_idx].visual.is_subtree_dirty() {
            self.mark_subtree_dirty(parent);
        }
        Ok(())
    }

    /// Detach a direct child. The child stays in the arena.
    ///
    /// Returns whether `child` was a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let parent_idx = self.require(parent)?;
        let children = &mut self.dense[parent_idx].children;
        let Some(position) = children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        children.remove(position);
        if let Some(child_idx) = self.dense_index(child) {
            self.dense[child_idx].parent = None;
        }
        Ok(true)
    }

    /// Remove a visual and all of its descendants from the arena.
    ///
    /// Content cached for them stays in the caller's cache; use
    /// [`dispose_with_content`](Self::dispose_with_content) to evict it too.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        let idx = self.require(id)?;
        if let Some(parent) = self.dense[idx].parent {
            if let Some(parent_idx) = self.dense_index(parent) {
                self.dense[parent_idx].children.retain(|&c| c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(dense_index) = self.dense_index(current) else {
                continue;
            };
            stack.extend(self.dense[dense_index].children.iter().copied());

            let last = self.dense.len() - 1;
            self.dense.swap_remove(dense_index);
            if dense_index != last {
                let moved = self.dense[dense_index].sparse_index;
                if let Some(entry) = self.sparse[moved as usize].as_mut() {
                    entry.dense_index = dense_index;
                }
            }
            // The generation lives on in `generations`; the next insert bumps it.
            self.sparse[current.index as usize] = None;
            self.free_indices.push(current.index);
        }
        Ok(())
    }

    /// [`dispose`](Self::dispose) that also evicts the cached text content
    /// of every removed visual, so the shaped text is released with it.
    pub fn dispose_with_content(&mut self, id: NodeId, cache: &mut ContentCache) -> Result<()> {
        let idx = self.require(id)?;
        let mut keys = vec![self.dense[idx].visual.cache_key()];
        self.foreach(id, |_, visual| {
            keys.push(visual.cache_key());
            true
        });
        self.dispose(id)?;
        for key in &keys {
            cache.remove(key);
        }
        Ok(())
    }

    /// Depth-first search of the descendants of `root`, in insertion order.
    pub fn get_visual_by_id(&self, root: NodeId, id: i32) -> Option<NodeId> {
        for &child in self.children(root) {
            if self.get(child).map(|v| v.id) == Some(id) {
                return Some(child);
            }
            if let Some(found) = self.get_visual_by_id(child, id) {
                return Some(found);
            }
        }
        None
    }

    /// Visit the descendants of `root` in pre-order.
    ///
    /// When the callback returns `false` the node's children are skipped;
    /// traversal continues with its next sibling.
    pub fn foreach(&self, root: NodeId, mut f: impl FnMut(NodeId, &Visual) -> bool) {
        self.foreach_inner(root, &mut f);
    }

    fn foreach_inner(&self, root: NodeId, f: &mut dyn FnMut(NodeId, &Visual) -> bool) {
        for &child in self.children(root) {
            let Some(visual) = self.get(child) else {
                continue;
            };
            if f(child, visual) {
                self.foreach_inner(child, f);
            }
        }
    }

    /// Whether the visual and all of its ancestors are active.
    /// Recomputed on every call.
    pub fn active_in_tree(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.dense_index(node) {
                Some(idx) if self.dense[idx].visual.active_self => {
                    current = self.dense[idx].parent;
                }
                _ => return false,
            }
        }
        true
    }

    /// Whether the visual lies outside `clip_rect`.
    pub fn is_clipped(&self, id: NodeId, clip_rect: Rect) -> bool {
        self.get(id).map_or(true, |v| v.is_clipped(clip_rect))
    }

    /// Effective clip rect of a visual.
    ///
    /// The root gets `root_clip`; every other visual gets its parent's clip
    /// rect narrowed to the parent's children area, so a child's clip rect is
    /// always inside its parent's.
    pub fn clip_rect(&self, id: NodeId, root_clip: Rect) -> Rect {
        match self.parent(id) {
            None => root_clip,
            Some(parent) => {
                let parent_clip = self.clip_rect(parent, root_clip);
                match self.get(parent) {
                    Some(visual) => parent_clip.intersect(&visual.children_clip_area()),
                    None => parent_clip,
                }
            }
        }
    }

    /// Flag the visual's content for regeneration and mark the path to the
    /// root as needing a render.
    pub fn mark_content_dirty(&mut self, id: NodeId) {
        if let Some(idx) = self.dense_index(id) {
            self.dense[idx]
                .visual
                .set_flags(true, VisualFlags::CONTENT_DIRTY);
            self.mark_subtree_dirty(id);
        }
    }

    /// Set the subtree bit on `id` and its ancestors.
    ///
    /// Stops at the first node already marked: its ancestors are marked too.
    fn mark_subtree_dirty(&mut self, id: NodeId) {
        let mut current = id;
        loop {
            let Some(idx) = self.dense_index(current) else {
                return;
            };
            let visual = &mut self.dense[idx].visual;
            if visual.is_subtree_dirty() {
                return;
            }
            visual.set_flags(true, VisualFlags::SUBTREE_DIRTY_FOR_RENDER);
            match self.dense[idx].parent {
                Some(parent) => current = parent,
                None => return,
            }
        }
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> Result<()> {
        let idx = self.require(id)?;
        if self.dense[idx].visual.rect != rect {
            self.dense[idx].visual.rect = rect;
            self.mark_content_dirty(id);
        }
        Ok(())
    }

    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let idx = self.require(id)?;
        if self.dense[idx].visual.style != style {
            self.dense[idx].visual.style = style;
            self.mark_content_dirty(id);
        }
        Ok(())
    }

    /// Replace the visual's geometry. Any recorded drawing content is dropped.
    pub fn set_geometry(&mut self, id: NodeId, geometry: Option<Geometry>) -> Result<()> {
        let idx = self.require(id)?;
        let visual = &mut self.dense[idx].visual;
        visual.geometry = geometry;
        visual.content = None;
        self.mark_content_dirty(id);
        Ok(())
    }

    /// Toggle the visual's own active state. Inactive subtrees are not drawn.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<()> {
        let idx = self.require(id)?;
        self.dense[idx].visual.active_self = active;
        Ok(())
    }

    /// Start recording new drawing content for a visual.
    pub fn render_open(&mut self, id: NodeId) -> Result<RecordingContext<'_>> {
        self.require(id)?;
        Ok(RecordingContext::new(self, id))
    }

    /// Hand recorded content to a visual, replacing what it drew before.
    pub fn render_close(&mut self, id: NodeId, content: DrawingContent) -> Result<()> {
        let idx = self.require(id)?;
        self.dense[idx].visual.content = Some(content);
        self.mark_content_dirty(id);
        Ok(())
    }

    pub(crate) fn cache_desired_size(&mut self, id: NodeId, size: Size) {
        if let Some(idx) = self.dense_index(id) {
            self.dense[idx].desired_size = Some(size);
        }
    }

    pub fn desired_size(&self, id: NodeId) -> Option<Size> {
        self.dense_index(id).and_then(|idx| self.dense[idx].desired_size)
    }

    /// Mutable access to a visual and its mesh at once.
    pub(crate) fn visual_and_mesh_mut(&mut self, id: NodeId) -> Option<(&Visual, &mut VisualMesh)> {
        self.dense_index(id).map(|idx| {
            let node = &mut self.dense[idx];
            (&node.visual, &mut node.mesh)
        })
    }
}
