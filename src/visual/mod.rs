//! The retained visual tree.
//!
//! Each [`Visual`] carries placement, style and at most one piece of
//! [`Geometry`]. Visuals live in a [`VisualTree`] arena; handles are
//! generational [`NodeId`]s so a removed visual can never be confused with
//! the one that reuses its slot.

mod render;
mod tree;

use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use rustc_hash::FxHasher;

pub use render::RenderContext;
pub use tree::{NodeId, VisualTree};

use crate::drawing::{DrawingContent, Geometry};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::layout::{LayoutKind, LayoutOption};
use crate::style::Style;

bitflags! {
    /// Pending render work for a visual.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VisualFlags: u8 {
        /// The visual's own mesh must be regenerated.
        const CONTENT_DIRTY = 1 << 0;
        /// The visual or one of its descendants changed since the last render.
        const SUBTREE_DIRTY_FOR_RENDER = 1 << 1;
    }
}

/// Stable integer id for the label part of a visual name.
pub fn hash_label(label: &str) -> i32 {
    let mut hasher = FxHasher::default();
    label.hash(&mut hasher);
    hasher.finish() as i32
}

/// A node of the visual tree.
#[derive(Debug, Clone)]
pub struct Visual {
    pub id: i32,
    pub name: Option<String>,
    /// Border box when the visual uses the box model.
    pub rect: Rect,
    pub active_self: bool,
    pub style: Style,
    pub use_box_model: bool,
    pub layout: Option<LayoutKind>,
    pub layout_options: Vec<LayoutOption>,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) content: Option<DrawingContent>,
    pub(crate) flags: VisualFlags,
}

impl Visual {
    /// A new visual needs its first render, so it starts dirty.
    pub fn new(id: i32) -> Self {
        Self {
            id,
            name: None,
            rect: Rect::default(),
            active_self: true,
            style: Style::default(),
            use_box_model: false,
            layout: None,
            layout_options: Vec::new(),
            geometry: None,
            content: None,
            flags: VisualFlags::CONTENT_DIRTY | VisualFlags::SUBTREE_DIRTY_FOR_RENDER,
        }
    }

    /// Build a visual from a `label#rest` name.
    ///
    /// The id is the hash of `label`; the name keeps the part starting at `#`.
    pub fn with_name(name: &str) -> Result<Self> {
        let Some(index) = name.find('#') else {
            return Err(Error::InvalidName(name.to_string()));
        };
        let mut visual = Self::new(hash_label(&name[..index]));
        visual.name = Some(name[index..].to_string());
        Ok(visual)
    }

    pub fn with_id_and_name(id: i32, name: impl Into<String>) -> Self {
        let mut visual = Self::new(id);
        visual.name = Some(name.into());
        visual
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn box_model(mut self, use_box_model: bool) -> Self {
        self.use_box_model = use_box_model;
        self
    }

    pub fn layout(mut self, kind: LayoutKind) -> Self {
        self.layout = Some(kind);
        self
    }

    pub fn layout_options(mut self, options: impl Into<Vec<LayoutOption>>) -> Self {
        self.layout_options = options.into();
        self
    }

    pub fn get_geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Recorded drawing content, if the visual was drawn through a context.
    pub fn drawing_content(&self) -> Option<&DrawingContent> {
        self.content.as_ref()
    }

    pub fn flags(&self) -> VisualFlags {
        self.flags
    }

    pub fn is_content_dirty(&self) -> bool {
        self.flags.contains(VisualFlags::CONTENT_DIRTY)
    }

    pub fn is_subtree_dirty(&self) -> bool {
        self.flags.contains(VisualFlags::SUBTREE_DIRTY_FOR_RENDER)
    }

    pub(crate) fn set_flags(&mut self, value: bool, flags: VisualFlags) {
        self.flags.set(flags, value);
    }

    /// True when the visual lies entirely outside `clip_rect`. Touching
    /// edges count as outside.
    pub fn is_clipped(&self, clip_rect: Rect) -> bool {
        !clip_rect.intersects_with(&self.rect)
    }

    /// Area inside which children are drawn: the content box under the box
    /// model, the whole rect otherwise.
    pub fn children_clip_area(&self) -> Rect {
        if self.use_box_model {
            self.style.content_rect(self.rect)
        } else {
            self.rect
        }
    }

    /// Where this visual's own text and image content is placed.
    pub fn content_rect(&self) -> Rect {
        self.children_clip_area()
    }

    /// Key used for this visual's entry in the content cache.
    pub fn cache_key(&self) -> String {
        match &self.name {
            Some(name) => format!("{}{}", self.id, name),
            None => self.id.to_string(),
        }
    }
}
