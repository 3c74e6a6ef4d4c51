//! Drawing commands and the contexts that consume them.
//!
//! A [`DrawingContext`] either records operations into a [`DrawingContent`]
//! (see [`crate::visual::VisualTree::render_open`]) or tessellates them
//! straight into a visual's meshes ([`MeshDrawingContext`]).

mod geometry;
mod mesh_context;
mod recording;

use std::rc::Rc;

pub use geometry::{Geometry, ImageGeometry, PathCommand, PathGeometry, TextGeometry};
pub(crate) use geometry::flatten_quad;
pub use mesh_context::MeshDrawingContext;
pub use recording::RecordingContext;

use crate::error::Result;
use crate::geometry::{Point, Rect, Thickness};
use crate::platform::Texture;
use crate::style::Color;
use crate::text::GlyphRun;

/// Solid fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color,
}

impl Brush {
    pub const fn solid(color: Color) -> Self {
        Self { color }
    }
}

/// Stroke color and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub thickness: f32,
}

impl Pen {
    pub const fn new(color: Color, thickness: f32) -> Self {
        Self { color, thickness }
    }
}

/// Describes visual content with draw calls.
///
/// Where both a brush and a pen are optional, passing neither is a no-op.
/// Closing consumes the context, so it cannot be drawn into afterwards.
pub trait DrawingContext {
    fn draw_line(&mut self, pen: &Pen, p0: Point, p1: Point);

    fn draw_rectangle(&mut self, brush: Option<&Brush>, pen: Option<&Pen>, rect: Rect);

    /// Radii are clamped to half of the rectangle's width and height.
    fn draw_rounded_rectangle(
        &mut self,
        brush: Option<&Brush>,
        pen: Option<&Pen>,
        rect: Rect,
        radius_x: f32,
        radius_y: f32,
    );

    fn draw_ellipse(
        &mut self,
        brush: Option<&Brush>,
        pen: Option<&Pen>,
        center: Point,
        radius_x: f32,
        radius_y: f32,
    );

    /// Fill and stroke apply to figures not already consumed by the path's
    /// own fill and stroke commands.
    fn draw_geometry(&mut self, brush: Option<&Brush>, pen: Option<&Pen>, geometry: &PathGeometry);

    /// Stretch the image over `rect`.
    fn draw_image(&mut self, image: &Rc<dyn Texture>, rect: Rect);

    /// Nine-slice the image over `rect`; `slice` is the inset in texture pixels.
    fn draw_image_sliced(&mut self, image: &Rc<dyn Texture>, rect: Rect, slice: Thickness);

    fn draw_glyph_run(&mut self, brush: &Brush, glyph_run: &GlyphRun);

    /// Replay previously recorded content.
    fn draw_drawing(&mut self, drawing: &DrawingContent);

    fn close(self) -> Result<()>
    where
        Self: Sized;
}

#[derive(Debug, Clone)]
pub(crate) enum DrawOp {
    Line(Pen, Point, Point),
    Rectangle(Option<Brush>, Option<Pen>, Rect),
    RoundedRectangle(Option<Brush>, Option<Pen>, Rect, f32, f32),
    Ellipse(Option<Brush>, Option<Pen>, Point, f32, f32),
    Geometry(Option<Brush>, Option<Pen>, PathGeometry),
    Image(Rc<dyn Texture>, Rect),
    ImageSliced(Rc<dyn Texture>, Rect, Thickness),
    GlyphRun(Brush, GlyphRun),
    Drawing(DrawingContent),
}

/// Recorded drawing operations.
#[derive(Debug, Clone, Default)]
pub struct DrawingContent {
    ops: Vec<DrawOp>,
}

impl DrawingContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Issue every recorded operation on `ctx`, in recording order.
    pub fn replay(&self, ctx: &mut dyn DrawingContext) {
        for op in &self.ops {
            match op {
                DrawOp::Line(pen, a, b) => ctx.draw_line(pen, *a, *b),
                DrawOp::Rectangle(brush, pen, rect) => {
                    ctx.draw_rectangle(brush.as_ref(), pen.as_ref(), *rect)
                }
                DrawOp::RoundedRectangle(brush, pen, rect, rx, ry) => {
                    ctx.draw_rounded_rectangle(brush.as_ref(), pen.as_ref(), *rect, *rx, *ry)
                }
                DrawOp::Ellipse(brush, pen, center, rx, ry) => {
                    ctx.draw_ellipse(brush.as_ref(), pen.as_ref(), *center, *rx, *ry)
                }
                DrawOp::Geometry(brush, pen, path) => {
                    ctx.draw_geometry(brush.as_ref(), pen.as_ref(), path)
                }
                DrawOp::Image(texture, rect) => ctx.draw_image(texture, *rect),
                DrawOp::ImageSliced(texture, rect, slice) => {
                    ctx.draw_image_sliced(texture, *rect, *slice)
                }
                DrawOp::GlyphRun(brush, run) => ctx.draw_glyph_run(brush, run),
                DrawOp::Drawing(content) => ctx.draw_drawing(content),
            }
        }
    }
}
