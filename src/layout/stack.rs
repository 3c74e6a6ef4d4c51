//! Two-pass stack layout over the visual tree.
//!
//! Measure walks bottom-up and caches each visual's desired size. Arrange
//! walks top-down and assigns rects; every rect that changes marks its visual
//! content-dirty through the tree.

use super::{LayoutKind, LayoutOption};
use crate::content::Content;
use crate::drawing::Geometry;
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::style::Alignment;
use crate::text::TextShaper;
use crate::visual::{NodeId, VisualTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn of(vertical: bool) -> Self {
        if vertical {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    fn main(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    fn cross(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    fn expands_main(self, options: &[LayoutOption]) -> bool {
        match self {
            Axis::Horizontal => LayoutOption::expands_width(options),
            Axis::Vertical => LayoutOption::expands_height(options),
        }
    }

    fn expands_cross(self, options: &[LayoutOption]) -> bool {
        match self {
            Axis::Horizontal => LayoutOption::expands_height(options),
            Axis::Vertical => LayoutOption::expands_width(options),
        }
    }
}

fn align_offset(alignment: Alignment, free: f32) -> f32 {
    match alignment {
        Alignment::Start => 0.0,
        Alignment::Center => free / 2.0,
        Alignment::End => free,
    }
}

impl VisualTree {
    /// Measure and arrange the subtree under `root`.
    ///
    /// The root keeps its position and takes its desired size. Visuals
    /// without a [`LayoutKind`] keep their rect; their children are laid out
    /// in place.
    pub fn layout(&mut self, root: NodeId, shaper: &mut dyn TextShaper) -> Result<()> {
        let size = self.measure(root, shaper)?;
        let origin = self.get(root).ok_or(Error::NodeNotFound(root))?.rect.top_left();
        self.arrange(root, Rect::from_point_size(origin, size))
    }

    fn active_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.get(child).is_some_and(|v| v.active_self))
            .collect()
    }

    fn measure(&mut self, id: NodeId, shaper: &mut dyn TextShaper) -> Result<Size> {
        let visual = self.get(id).ok_or(Error::NodeNotFound(id))?;
        let kind = visual.layout;
        let options = visual.layout_options.clone();
        let style = visual.style.clone();
        let extent = if visual.use_box_model {
            style.box_extent()
        } else {
            Size::zero()
        };
        let current = visual.rect.size();
        let content = match visual.get_geometry() {
            Some(Geometry::Text(text)) => Content::text(text.text.clone()),
            Some(Geometry::Image(image)) => Content::image(image.texture.clone()),
            _ => Content::none(),
        };
        let children = self.active_children(id);

        let size = match kind {
            None => {
                for child in children {
                    self.measure(child, shaper)?;
                }
                current
            }
            Some(LayoutKind::Entry) => {
                let measured = content.get_size(&style, &options, shaper)?;
                let width = match LayoutOption::fixed_width(&options) {
                    Some(_) => measured.width,
                    None => measured.width + extent.width,
                };
                let height = match LayoutOption::fixed_height(&options) {
                    Some(_) => measured.height,
                    None => measured.height + extent.height,
                };
                Size::new(
                    LayoutOption::clamp_width(&options, width),
                    LayoutOption::clamp_height(&options, height),
                )
            }
            Some(LayoutKind::Group { vertical }) => {
                let axis = Axis::of(vertical);
                let mut main = 0.0f32;
                let mut cross = 0.0f32;
                let count = children.len();
                for child in children {
                    let size = self.measure(child, shaper)?;
                    main += axis.main(size);
                    cross = cross.max(axis.cross(size));
                }
                if count > 1 {
                    main += style.cell_spacing * (count - 1) as f32;
                }
                let stacked = axis.size(main, cross);
                let width = LayoutOption::fixed_width(&options)
                    .unwrap_or(stacked.width + extent.width);
                let height = LayoutOption::fixed_height(&options)
                    .unwrap_or(stacked.height + extent.height);
                Size::new(
                    LayoutOption::clamp_width(&options, width),
                    LayoutOption::clamp_height(&options, height),
                )
            }
        };

        self.cache_desired_size(id, size);
        Ok(size)
    }

    fn arrange(&mut self, id: NodeId, rect: Rect) -> Result<()> {
        self.set_rect(id, rect)?;

        let visual = self.get(id).ok_or(Error::NodeNotFound(id))?;
        let kind = visual.layout;
        let area = visual.children_clip_area();
        let spacing = visual.style.cell_spacing;
        let horizontal_alignment = visual.style.horizontal_alignment;
        let vertical_alignment = visual.style.vertical_alignment;
        let children = self.active_children(id);

        match kind {
            Some(LayoutKind::Entry) => Ok(()),
            None => {
                for child in children {
                    let Some(current) = self.get(child).map(|v| v.rect) else {
                        continue;
                    };
                    let size = self.desired_size(child).unwrap_or(current.size());
                    self.arrange(child, Rect::from_point_size(current.top_left(), size))?;
                }
                Ok(())
            }
            Some(LayoutKind::Group { vertical }) => {
                let axis = Axis::of(vertical);
                let (main_alignment, cross_alignment) = match axis {
                    Axis::Vertical => (vertical_alignment, horizontal_alignment),
                    Axis::Horizontal => (horizontal_alignment, vertical_alignment),
                };

                let mut entries = Vec::with_capacity(children.len());
                let mut used = 0.0f32;
                let mut expanders = 0usize;
                for child in children {
                    let size = self.desired_size(child).unwrap_or_default();
                    let options = self
                        .get(child)
                        .map(|v| v.layout_options.as_slice())
                        .unwrap_or_default();
                    let expand_main = axis.expands_main(options);
                    let expand_cross = axis.expands_cross(options);
                    if expand_main {
                        expanders += 1;
                    }
                    used += axis.main(size);
                    entries.push((child, size, expand_main, expand_cross));
                }
                if entries.len() > 1 {
                    used += spacing * (entries.len() - 1) as f32;
                }

                let available_main = axis.main(area.size());
                let available_cross = axis.cross(area.size());
                let free = (available_main - used).max(0.0);
                let share = if expanders > 0 {
                    free / expanders as f32
                } else {
                    0.0
                };

                let mut cursor = if expanders > 0 {
                    0.0
                } else {
                    align_offset(main_alignment, free)
                };
                for (child, size, expand_main, expand_cross) in entries {
                    let main = axis.main(size) + if expand_main { share } else { 0.0 };
                    let (cross, cross_offset) = if expand_cross {
                        (available_cross, 0.0)
                    } else {
                        let cross = axis.cross(size);
                        let free_cross = (available_cross - cross).max(0.0);
                        (cross, align_offset(cross_alignment, free_cross))
                    };
                    let child_rect = match axis {
                        Axis::Vertical => {
                            Rect::new(area.x + cross_offset, area.y + cursor, cross, main)
                        }
                        Axis::Horizontal => {
                            Rect::new(area.x + cursor, area.y + cross_offset, main, cross)
                        }
                    };
                    self.arrange(child, child_rect)?;
                    cursor += main + spacing;
                }
                Ok(())
            }
        }
    }
}
