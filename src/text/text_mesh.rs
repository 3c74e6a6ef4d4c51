use super::TextContext;
use crate::error::Result;
use crate::geometry::Point;
use crate::mesh::{Mesh, VisualMesh};
use crate::style::Color;

/// Triangles for a block of shaped text.
///
/// Glyph polygons are filled into `shape`; curved edges go to `bezier`,
/// drawn afterwards by the curved material to carve the outline.
#[derive(Debug, Clone, Default)]
pub struct TextMesh {
    pub shape: Mesh,
    pub bezier: Mesh,
}

impl TextMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.shape.clear();
        self.bezier.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty() && self.bezier.is_empty()
    }

    /// Tessellate every glyph of `text` anchored at `origin`.
    pub fn build(&mut self, origin: Point, color: Color, text: &dyn TextContext) -> Result<()> {
        for glyph in text.glyphs() {
            let polygons: Vec<Vec<Point>> = glyph
                .outline
                .polygons
                .iter()
                .map(|polygon| polygon.iter().map(|&p| glyph.transform(origin, p)).collect())
                .collect();
            self.shape.add_polygons_even_odd(&polygons, color)?;

            for &(start, control, end) in &glyph.outline.bezier_segments {
                self.bezier.add_bezier(
                    glyph.transform(origin, start),
                    glyph.transform(origin, control),
                    glyph.transform(origin, end),
                    color,
                );
            }
        }
        Ok(())
    }

    /// Copy the text triangles into a visual's meshes, painted with `color`.
    ///
    /// Color changes do not require reshaping, so the cached triangles are
    /// recolored on the way out.
    pub fn append_to(&self, mesh: &mut VisualMesh, color: Color) {
        let color = color.to_array();
        for (target, source) in [(&mut mesh.shape, &self.shape), (&mut mesh.bezier, &self.bezier)] {
            let first = target.vertices.len();
            target.append(source);
            for v in &mut target.vertices[first..] {
                v.color = color;
            }
        }
    }
}
