use std::rc::Rc;

use super::{Brush, DrawOp, DrawingContent, DrawingContext, PathGeometry, Pen};
use crate::error::Result;
use crate::geometry::{Point, Rect, Thickness};
use crate::platform::Texture;
use crate::text::GlyphRun;
use crate::visual::{NodeId, VisualTree};

/// Records drawing operations for one visual.
///
/// Obtained from [`VisualTree::render_open`]. Closing hands the recording to
/// the visual, replacing its previous content and marking it for re-render.
pub struct RecordingContext<'t> {
    tree: &'t mut VisualTree,
    node: NodeId,
    content: DrawingContent,
}

impl<'t> RecordingContext<'t> {
    pub(crate) fn new(tree: &'t mut VisualTree, node: NodeId) -> Self {
        Self {
            tree,
            node,
            content: DrawingContent::new(),
        }
    }
}

impl DrawingContext for RecordingContext<'_> {
    fn draw_line(&mut self, pen: &Pen, p0: Point, p1: Point) {
        self.content.push(DrawOp::Line(*pen, p0, p1));
    }

    fn draw_rectangle(&mut self, brush: Option<&Brush>, pen: Option<&Pen>, rect: Rect) {
        if brush.is_none() && pen.is_none() {
            return;
        }
        self.content
            .push(DrawOp::Rectangle(brush.copied(), pen.copied(), rect));
    }

    fn draw_rounded_rectangle(
        &mut self,
        brush: Option<&Brush>,
        pen: Option<&Pen>,
        rect: Rect,
        radius_x: f32,
        radius_y: f32,
    ) {
        if brush.is_none() && pen.is_none() {
            return;
        }
        self.content.push(DrawOp::RoundedRectangle(
            brush.copied(),
            pen.copied(),
            rect,
            radius_x,
            radius_y,
        ));
    }

    fn draw_ellipse(
        &mut self,
        brush: Option<&Brush>,
        pen: Option<&Pen>,
        center: Point,
        radius_x: f32,
        radius_y: f32,
    ) {
        if brush.is_none() && pen.is_none() {
            return;
        }
        self.content.push(DrawOp::Ellipse(
            brush.copied(),
            pen.copied(),
            center,
            radius_x,
            radius_y,
        ));
    }

    fn draw_geometry(&mut self, brush: Option<&Brush>, pen: Option<&Pen>, geometry: &PathGeometry) {
        self.content.push(DrawOp::Geometry(
            brush.copied(),
            pen.copied(),
            geometry.clone(),
        ));
    }

    fn draw_image(&mut self, image: &Rc<dyn Texture>, rect: Rect) {
        self.content.push(DrawOp::Image(image.clone(), rect));
    }

    fn draw_image_sliced(&mut self, image: &Rc<dyn Texture>, rect: Rect, slice: Thickness) {
        self.content
            .push(DrawOp::ImageSliced(image.clone(), rect, slice));
    }

    fn draw_glyph_run(&mut self, brush: &Brush, glyph_run: &GlyphRun) {
        self.content
            .push(DrawOp::GlyphRun(*brush, glyph_run.clone()));
    }

    fn draw_drawing(&mut self, drawing: &DrawingContent) {
        self.content.push(DrawOp::Drawing(drawing.clone()));
    }

    fn close(self) -> Result<()> {
        self.tree.render_close(self.node, self.content)
    }
}
