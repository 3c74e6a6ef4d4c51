use std::rc::Rc;

use super::{flatten_quad, Brush, DrawingContent, DrawingContext, PathCommand, PathGeometry, Pen};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Thickness};
use crate::mesh::VisualMesh;
use crate::platform::Texture;
use crate::style::Color;
use crate::text::{GlyphRun, TextMesh};

const QUAD_SEGMENTS: usize = 16;

/// Tessellates drawing operations directly into a visual's meshes.
///
/// Tessellation failures do not interrupt drawing; the first one is
/// reported when the context is closed.
pub struct MeshDrawingContext<'m> {
    mesh: &'m mut VisualMesh,
    error: Option<Error>,
}

impl<'m> MeshDrawingContext<'m> {
    pub fn new(mesh: &'m mut VisualMesh) -> Self {
        Self { mesh, error: None }
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            log::error!("drawing failed: {err}");
            if self.error.is_none() {
                self.error = Some(err);
            }
        }
    }

    fn fill_figures(&mut self, figures: &[(Vec<Point>, bool)], color: Color) {
        let polygons: Vec<Vec<Point>> = figures.iter().map(|(points, _)| points.clone()).collect();
        let result = self.mesh.shape.add_polygons_even_odd(&polygons, color);
        self.record(result);
    }

    fn stroke_figures(&mut self, figures: &[(Vec<Point>, bool)], color: Color, thickness: f32) {
        for (points, closed) in figures {
            self.mesh.shape.add_polyline(points, color, *closed, thickness);
        }
    }
}

fn flush(current: &mut Vec<Point>, figures: &mut Vec<(Vec<Point>, bool)>, closed: bool) {
    if current.len() > 1 {
        figures.push((std::mem::take(current), closed));
    } else {
        current.clear();
    }
}

impl DrawingContext for MeshDrawingContext<'_> {
    fn draw_line(&mut self, pen: &Pen, p0: Point, p1: Point) {
        self.mesh.shape.add_line(p0, p1, pen.color, pen.thickness);
    }

    fn draw_rectangle(&mut self, brush: Option<&Brush>, pen: Option<&Pen>, rect: Rect) {
        if let Some(brush) = brush {
            self.mesh.shape.add_rect_filled(rect, brush.color);
        }
        if let Some(pen) = pen {
            let corners = [rect.top_left(), rect.top_right(), rect.bottom_right(), rect.bottom_left()];
            self.mesh.shape.add_polyline(&corners, pen.color, true, pen.thickness);
        }
    }

    fn draw_rounded_rectangle(
        &mut self,
        brush: Option<&Brush>,
        pen: Option<&Pen>,
        rect: Rect,
        radius_x: f32,
        radius_y: f32,
    ) {
        if let Some(brush) = brush {
            self.mesh
                .shape
                .add_rounded_rect_filled(rect, radius_x, radius_y, brush.color);
        }
        if let Some(pen) = pen {
            self.mesh
                .shape
                .add_rounded_rect_stroke(rect, radius_x, radius_y, pen.color, pen.thickness);
        }
    }

    fn draw_ellipse(
        &mut self,
        brush: Option<&Brush>,
        pen: Option<&Pen>,
        center: Point,
        radius_x: f32,
        radius_y: f32,
    ) {
        if let Some(brush) = brush {
            self.mesh
                .shape
                .add_ellipse_filled(center, radius_x, radius_y, brush.color);
        }
        if let Some(pen) = pen {
            self.mesh
                .shape
                .add_ellipse_stroke(center, radius_x, radius_y, pen.color, pen.thickness);
        }
    }

    fn draw_geometry(&mut self, brush: Option<&Brush>, pen: Option<&Pen>, geometry: &PathGeometry) {
        let mut figures: Vec<(Vec<Point>, bool)> = Vec::new();
        let mut current: Vec<Point> = Vec::new();

        for command in &geometry.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    flush(&mut current, &mut figures, false);
                    current.push(p);
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::QuadTo { control, to } => match current.last().copied() {
                    Some(from) => current.extend(flatten_quad(from, control, to, QUAD_SEGMENTS)),
                    None => current.push(to),
                },
                PathCommand::Close => flush(&mut current, &mut figures, true),
                PathCommand::Fill(color) => {
                    flush(&mut current, &mut figures, false);
                    self.fill_figures(&figures, color);
                    figures.clear();
                }
                PathCommand::Stroke { color, thickness } => {
                    flush(&mut current, &mut figures, false);
                    self.stroke_figures(&figures, color, thickness);
                    figures.clear();
                }
            }
        }

        flush(&mut current, &mut figures, false);
        if figures.is_empty() {
            return;
        }
        if let Some(brush) = brush {
            self.fill_figures(&figures, brush.color);
        }
        if let Some(pen) = pen {
            self.stroke_figures(&figures, pen.color, pen.thickness);
        }
    }

    fn draw_image(&mut self, image: &Rc<dyn Texture>, rect: Rect) {
        self.mesh
            .image
            .add_image_rect(rect, [0.0, 0.0], [1.0, 1.0], image.id(), Color::WHITE);
    }

    fn draw_image_sliced(&mut self, image: &Rc<dyn Texture>, rect: Rect, slice: Thickness) {
        self.mesh
            .image
            .add_image_sliced(rect, image.size(), slice, image.id(), Color::WHITE);
    }

    fn draw_glyph_run(&mut self, brush: &Brush, glyph_run: &GlyphRun) {
        let mut text = TextMesh::new();
        let result = text.build(glyph_run.origin, brush.color, &*glyph_run.text);
        self.record(result);
        text.append_to(self.mesh, brush.color);
    }

    fn draw_drawing(&mut self, drawing: &DrawingContent) {
        drawing.replay(self);
    }

    fn close(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::FakeTexture;
    use crate::text::testing::FakeTextContext;

    #[test]
    fn test_rectangle_fill_and_stroke() {
        let mut mesh = VisualMesh::default();
        let mut ctx = MeshDrawingContext::new(&mut mesh);
        ctx.draw_rectangle(
            Some(&Brush::solid(Color::WHITE)),
            Some(&Pen::new(Color::BLACK, 1.0)),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        ctx.close().unwrap();
        // One fill quad and four edge quads.
        assert_eq!(mesh.shape.indices.len(), 5 * 6);
        assert!(mesh.bezier.is_empty());
    }

    #[test]
    fn test_neither_brush_nor_pen_is_noop() {
        let mut mesh = VisualMesh::default();
        let mut ctx = MeshDrawingContext::new(&mut mesh);
        ctx.draw_rectangle(None, None, Rect::new(0.0, 0.0, 10.0, 10.0));
        ctx.draw_ellipse(None, None, Point::new(5.0, 5.0), 3.0, 3.0);
        ctx.close().unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_path_fill_consumes_figures() {
        let mut path = PathGeometry::new();
        path.path_rect(Rect::new(0.0, 0.0, 10.0, 10.0)).path_fill(Color::BLACK);

        let mut mesh = VisualMesh::default();
        let mut ctx = MeshDrawingContext::new(&mut mesh);
        // The pen has nothing left to stroke.
        ctx.draw_geometry(None, Some(&Pen::new(Color::WHITE, 2.0)), &path);
        ctx.close().unwrap();

        assert!(!mesh.shape.is_empty());
        assert!(mesh.shape.vertices.iter().all(|v| v.color == Color::BLACK.to_array()));
    }

    #[test]
    fn test_images_go_to_image_mesh() {
        let texture: Rc<dyn Texture> = Rc::new(FakeTexture::new(3, 32, 32));
        let mut mesh = VisualMesh::default();
        let mut ctx = MeshDrawingContext::new(&mut mesh);
        ctx.draw_image(&texture, Rect::new(0.0, 0.0, 32.0, 32.0));
        ctx.close().unwrap();
        assert_eq!(mesh.image.commands.len(), 1);
        assert_eq!(mesh.image.commands[0].texture, Some(texture.id()));
        assert!(mesh.shape.is_empty());
    }

    #[test]
    fn test_glyph_run_uses_brush_color() {
        let run = GlyphRun::new(Point::new(0.0, 0.0), Rc::new(FakeTextContext::boxes("hi", 8.0)));
        let red = Color::rgb(1.0, 0.0, 0.0);
        let mut mesh = VisualMesh::default();
        let mut ctx = MeshDrawingContext::new(&mut mesh);
        ctx.draw_glyph_run(&Brush::solid(red), &run);
        ctx.close().unwrap();
        assert!(!mesh.shape.is_empty());
        assert!(!mesh.bezier.is_empty());
        assert!(mesh.bezier.vertices.iter().all(|v| v.color == red.to_array()));
    }
}
