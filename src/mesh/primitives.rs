use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers};

use super::{DrawIndex, DrawVertex, Mesh, TextureId};
use crate::error::Result;
use crate::geometry::{Point, Rect, Size, Thickness};
use crate::style::Color;

const NO_UV: [f32; 2] = [0.0, 0.0];

/// Segment count for an arc of the given radius, kept between 4 and 64.
fn arc_segments(radius: f32) -> usize {
    ((radius * 0.75).ceil() as usize).clamp(4, 64)
}

/// Outline of a rounded rectangle, clockwise from the top-left arc.
///
/// Radii are clamped to half of the rectangle's width and height.
pub fn rounded_rect_points(rect: Rect, radius_x: f32, radius_y: f32) -> Vec<Point> {
    let rx = radius_x.abs().min(rect.width / 2.0);
    let ry = radius_y.abs().min(rect.height / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return vec![rect.top_left(), rect.top_right(), rect.bottom_right(), rect.bottom_left()];
    }

    let segments = arc_segments(rx.max(ry));
    let corners = [
        (Point::new(rect.x + rx, rect.y + ry), std::f32::consts::PI),
        (Point::new(rect.right() - rx, rect.y + ry), std::f32::consts::PI * 1.5),
        (Point::new(rect.right() - rx, rect.bottom() - ry), 0.0),
        (Point::new(rect.x + rx, rect.bottom() - ry), std::f32::consts::FRAC_PI_2),
    ];

    let mut points = Vec::with_capacity(4 * (segments + 1));
    for (center, start) in corners {
        for i in 0..=segments {
            let a = start + std::f32::consts::FRAC_PI_2 * (i as f32 / segments as f32);
            points.push(Point::new(center.x + rx * a.cos(), center.y + ry * a.sin()));
        }
    }
    points
}

pub fn ellipse_points(center: Point, radius_x: f32, radius_y: f32) -> Vec<Point> {
    let rx = radius_x.abs();
    let ry = radius_y.abs();
    let segments = arc_segments(rx.max(ry)) * 4;
    (0..segments)
        .map(|i| {
            let a = std::f32::consts::TAU * (i as f32 / segments as f32);
            Point::new(center.x + rx * a.cos(), center.y + ry * a.sin())
        })
        .collect()
}

impl Mesh {
    /// Push raw triangles. Indices are relative to the first pushed vertex.
    pub fn add_triangles(
        &mut self,
        vertices: &[DrawVertex],
        indices: &[DrawIndex],
        texture: Option<TextureId>,
    ) {
        let base = self.vertices.len() as DrawIndex;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));
        self.push_elements(texture, indices.len() as u32);
    }

    fn add_quad(&mut self, corners: [Point; 4], uvs: [[f32; 2]; 4], color: Color, texture: Option<TextureId>) {
        let color = color.to_array();
        let vertices = [
            DrawVertex::new([corners[0].x, corners[0].y], uvs[0], color),
            DrawVertex::new([corners[1].x, corners[1].y], uvs[1], color),
            DrawVertex::new([corners[2].x, corners[2].y], uvs[2], color),
            DrawVertex::new([corners[3].x, corners[3].y], uvs[3], color),
        ];
        self.add_triangles(&vertices, &[0, 1, 2, 0, 2, 3], texture);
    }

    pub fn add_rect_filled(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.add_quad(
            [rect.top_left(), rect.top_right(), rect.bottom_right(), rect.bottom_left()],
            [NO_UV; 4],
            color,
            None,
        );
    }

    /// Stroke the inside edges of `rect` with per-side thickness.
    pub fn add_rect_border(&mut self, rect: Rect, border: Thickness, color: Color) {
        let inner = rect.deflate(border);
        self.add_rect_filled(Rect::new(rect.x, rect.y, rect.width, border.top), color);
        self.add_rect_filled(
            Rect::new(rect.x, rect.bottom() - border.bottom, rect.width, border.bottom),
            color,
        );
        self.add_rect_filled(Rect::new(rect.x, inner.y, border.left, inner.height), color);
        self.add_rect_filled(
            Rect::new(rect.right() - border.right, inner.y, border.right, inner.height),
            color,
        );
    }

    pub fn add_line(&mut self, a: Point, b: Point, color: Color, thickness: f32) {
        let dir = (b - a).normalized();
        if dir.x == 0.0 && dir.y == 0.0 {
            return;
        }
        let n = dir.perpendicular() * (thickness / 2.0);
        self.add_quad([a + n, b + n, b - n, a - n], [NO_UV; 4], color, None);
    }

    pub fn add_polyline(&mut self, points: &[Point], color: Color, closed: bool, thickness: f32) {
        if points.len() < 2 {
            return;
        }
        for pair in points.windows(2) {
            self.add_line(pair[0], pair[1], color, thickness);
        }
        if closed && points.len() > 2 {
            self.add_line(points[points.len() - 1], points[0], color, thickness);
        }
    }

    /// Triangle-fan fill. Points must describe a convex polygon.
    pub fn add_convex_fill(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        let color = color.to_array();
        let vertices: Vec<DrawVertex> = points
            .iter()
            .map(|p| DrawVertex::new([p.x, p.y], NO_UV, color))
            .collect();
        let mut indices = Vec::with_capacity((points.len() - 2) * 3);
        for i in 1..points.len() as DrawIndex - 1 {
            indices.extend_from_slice(&[0, i, i + 1]);
        }
        self.add_triangles(&vertices, &indices, None);
    }

    pub fn add_rounded_rect_filled(&mut self, rect: Rect, radius_x: f32, radius_y: f32, color: Color) {
        self.add_convex_fill(&rounded_rect_points(rect, radius_x, radius_y), color);
    }

    pub fn add_rounded_rect_stroke(
        &mut self,
        rect: Rect,
        radius_x: f32,
        radius_y: f32,
        color: Color,
        thickness: f32,
    ) {
        self.add_polyline(&rounded_rect_points(rect, radius_x, radius_y), color, true, thickness);
    }

    pub fn add_ellipse_filled(&mut self, center: Point, radius_x: f32, radius_y: f32, color: Color) {
        self.add_convex_fill(&ellipse_points(center, radius_x, radius_y), color);
    }

    pub fn add_ellipse_stroke(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        color: Color,
        thickness: f32,
    ) {
        self.add_polyline(&ellipse_points(center, radius_x, radius_y), color, true, thickness);
    }

    /// Fill arbitrary, possibly self-intersecting polygons with the even-odd rule.
    ///
    /// Holes in glyphs come out naturally since inner contours flip parity.
    pub fn add_polygons_even_odd(&mut self, polygons: &[Vec<Point>], color: Color) -> Result<()> {
        let mut builder = Path::builder();
        let mut any = false;
        for polygon in polygons.iter().filter(|p| p.len() >= 3) {
            builder.begin(point(polygon[0].x, polygon[0].y));
            for p in &polygon[1..] {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(true);
            any = true;
        }
        if !any {
            return Ok(());
        }
        let path = builder.build();

        let mut geometry: VertexBuffers<[f32; 2], DrawIndex> = VertexBuffers::new();
        let options = FillOptions::default().with_fill_rule(FillRule::EvenOdd);
        FillTessellator::new().tessellate_path(
            &path,
            &options,
            &mut BuffersBuilder::new(&mut geometry, |v: FillVertex| v.position().to_array()),
        )?;

        let color = color.to_array();
        let vertices: Vec<DrawVertex> = geometry
            .vertices
            .iter()
            .map(|&pos| DrawVertex::new(pos, NO_UV, color))
            .collect();
        self.add_triangles(&vertices, &geometry.indices, None);
        Ok(())
    }

    /// One quadratic curve triangle for the curved material.
    ///
    /// UVs follow the Loop-Blinn layout so the fragment stage can discard
    /// pixels on the wrong side of `u * u - v`.
    pub fn add_bezier(&mut self, start: Point, control: Point, end: Point, color: Color) {
        let color = color.to_array();
        let vertices = [
            DrawVertex::new([start.x, start.y], [0.0, 0.0], color),
            DrawVertex::new([control.x, control.y], [0.5, 0.0], color),
            DrawVertex::new([end.x, end.y], [1.0, 1.0], color),
        ];
        self.add_triangles(&vertices, &[0, 1, 2], None);
    }

    /// Textured quad covering `rect`, sampling `uv_min..uv_max`.
    pub fn add_image_rect(
        &mut self,
        rect: Rect,
        uv_min: [f32; 2],
        uv_max: [f32; 2],
        texture: TextureId,
        tint: Color,
    ) {
        if rect.is_empty() {
            return;
        }
        self.add_quad(
            [rect.top_left(), rect.top_right(), rect.bottom_right(), rect.bottom_left()],
            [
                uv_min,
                [uv_max[0], uv_min[1]],
                uv_max,
                [uv_min[0], uv_max[1]],
            ],
            tint,
            Some(texture),
        );
    }

    /// Nine-slice image: corners keep their size, edges and center stretch.
    ///
    /// `slice` gives the inset in texture pixels from each edge.
    pub fn add_image_sliced(
        &mut self,
        rect: Rect,
        texture_size: Size,
        slice: Thickness,
        texture: TextureId,
        tint: Color,
    ) {
        if texture_size.width <= 0.0 || texture_size.height <= 0.0 {
            return;
        }
        let xs = [rect.x, rect.x + slice.left, rect.right() - slice.right, rect.right()];
        let ys = [rect.y, rect.y + slice.top, rect.bottom() - slice.bottom, rect.bottom()];
        let us = [
            0.0,
            slice.left / texture_size.width,
            1.0 - slice.right / texture_size.width,
            1.0,
        ];
        let vs = [
            0.0,
            slice.top / texture_size.height,
            1.0 - slice.bottom / texture_size.height,
            1.0,
        ];

        for row in 0..3 {
            for col in 0..3 {
                let cell = Rect::new(xs[col], ys[row], xs[col + 1] - xs[col], ys[row + 1] - ys[row]);
                self.add_image_rect(
                    cell,
                    [us[col], vs[row]],
                    [us[col + 1], vs[row + 1]],
                    texture,
                    tint,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_filled() {
        let mut mesh = Mesh::new();
        mesh.add_rect_filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.commands.len(), 1);
        assert_eq!(mesh.commands[0].elem_count, 6);
        assert_eq!(mesh.commands[0].texture, None);
    }

    #[test]
    fn test_empty_rect_is_skipped() {
        let mut mesh = Mesh::new();
        mesh.add_rect_filled(Rect::new(0.0, 0.0, 0.0, 10.0), Color::BLACK);
        assert!(mesh.is_empty());
        assert!(mesh.commands.is_empty());
    }

    #[test]
    fn test_rounded_rect_radius_is_clamped() {
        let rect = Rect::new(0.0, 0.0, 10.0, 4.0);
        let points = rounded_rect_points(rect, 100.0, 100.0);
        for p in &points {
            assert!(p.x >= -0.001 && p.x <= 10.001);
            assert!(p.y >= -0.001 && p.y <= 4.001);
        }
        // Zero radius degenerates to the plain corners.
        assert_eq!(rounded_rect_points(rect, 0.0, 0.0).len(), 4);
    }

    #[test]
    fn test_convex_fill_fan() {
        let mut mesh = Mesh::new();
        let pentagon = ellipse_points(Point::new(0.0, 0.0), 5.0, 5.0);
        mesh.add_convex_fill(&pentagon, Color::WHITE);
        assert_eq!(mesh.indices.len(), (pentagon.len() - 2) * 3);
    }

    #[test]
    fn test_even_odd_square_with_hole() {
        let mut mesh = Mesh::new();
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let inner = vec![
            Point::new(3.0, 3.0),
            Point::new(7.0, 3.0),
            Point::new(7.0, 7.0),
            Point::new(3.0, 7.0),
        ];
        mesh.add_polygons_even_odd(&[outer, inner], Color::BLACK).unwrap();

        // Total triangle area must equal 100 - 16.
        let area: f32 = mesh
            .indices
            .chunks(3)
            .map(|t| {
                let a = mesh.vertices[t[0] as usize].pos;
                let b = mesh.vertices[t[1] as usize].pos;
                let c = mesh.vertices[t[2] as usize].pos;
                ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
            })
            .sum();
        assert!((area - 84.0).abs() < 0.01);
    }

    #[test]
    fn test_image_texture_switch_splits_commands() {
        let mut mesh = Mesh::new();
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        mesh.add_image_rect(r, [0.0, 0.0], [1.0, 1.0], TextureId(1), Color::WHITE);
        mesh.add_image_rect(r, [0.0, 0.0], [1.0, 1.0], TextureId(1), Color::WHITE);
        mesh.add_image_rect(r, [0.0, 0.0], [1.0, 1.0], TextureId(2), Color::WHITE);
        assert_eq!(mesh.commands.len(), 2);
        assert_eq!(mesh.commands[0].elem_count, 12);
        assert_eq!(mesh.commands[1].texture, Some(TextureId(2)));
    }

    #[test]
    fn test_nine_slice() {
        let mut mesh = Mesh::new();
        mesh.add_image_sliced(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Size::new(30.0, 30.0),
            Thickness::all(10.0),
            TextureId(7),
            Color::WHITE,
        );
        assert_eq!(mesh.vertices.len(), 9 * 4);
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[1].pos, [10.0, 0.0]);
    }

    #[test]
    fn test_bezier_uvs() {
        let mut mesh = Mesh::new();
        mesh.add_bezier(Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 0.0), Color::BLACK);
        let uvs: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [0.5, 0.0], [1.0, 1.0]]);
    }
}
