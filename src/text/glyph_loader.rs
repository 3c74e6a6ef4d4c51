//! Conversion of TrueType-style glyph contours into fill polygons and
//! quadratic curve segments.

use crate::geometry::Point;

/// A contour point in font units with Y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPoint {
    pub x: f32,
    pub y: f32,
    pub on_curve: bool,
}

impl GlyphPoint {
    pub const fn on(x: f32, y: f32) -> Self {
        Self { x, y, on_curve: true }
    }

    pub const fn off(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            on_curve: false,
        }
    }

    /// Flip into Y-down coordinates.
    fn flipped(self) -> Point {
        Point::new(self.x, -self.y)
    }
}

/// Raw glyph contours: `end_points[i]` is the index of the last point of contour `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glyph {
    pub points: Vec<GlyphPoint>,
    pub end_points: Vec<u16>,
}

/// Straight-edge polygons plus `(previous, control, next)` curve triples, Y down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphOutline {
    pub polygons: Vec<Vec<Point>>,
    pub bezier_segments: Vec<(Point, Point, Point)>,
}

impl GlyphOutline {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.bezier_segments.is_empty()
    }
}

/// Split a glyph into polygons and quadratic curve triples.
///
/// Two consecutive off-curve points imply an on-curve point halfway between
/// them, which is inserted first. Contours left with fewer than three
/// on-curve points are dropped together with their curves.
pub fn read_glyph(glyph: &Glyph) -> GlyphOutline {
    let mut outline = GlyphOutline::default();

    let mut first = 0usize;
    for &end in &glyph.end_points {
        let end = end as usize;
        if end < first || end >= glyph.points.len() {
            log::warn!("skipping malformed glyph contour {first}..={end}");
            first = end + 1;
            continue;
        }
        let contour = with_implied_points(&glyph.points[first..=end]);
        first = end + 1;

        let polygon: Vec<Point> = contour
            .iter()
            .filter(|p| p.on_curve)
            .map(|p| p.flipped())
            .collect();
        if polygon.len() < 3 {
            continue;
        }

        let n = contour.len();
        for (j, p) in contour.iter().enumerate().filter(|(_, p)| !p.on_curve) {
            let prev = contour[(j + n - 1) % n];
            let next = contour[(j + 1) % n];
            outline
                .bezier_segments
                .push((prev.flipped(), p.flipped(), next.flipped()));
        }
        outline.polygons.push(polygon);
    }

    outline
}

fn with_implied_points(contour: &[GlyphPoint]) -> Vec<GlyphPoint> {
    let mut out = Vec::with_capacity(contour.len() * 2);
    for (j, &p) in contour.iter().enumerate() {
        let prev = if j == 0 {
            contour[contour.len() - 1]
        } else {
            contour[j - 1]
        };
        if !prev.on_curve && !p.on_curve {
            out.push(GlyphPoint::on((prev.x + p.x) / 2.0, (prev.y + p.y) / 2.0));
        }
        out.push(p);
    }
    out
}
