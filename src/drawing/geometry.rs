use std::rc::Rc;

use crate::geometry::{Point, Rect, Thickness};
use crate::platform::Texture;
use crate::style::Color;

/// The content a visual renders. A visual holds at most one.
#[derive(Debug, Clone)]
pub enum Geometry {
    Path(PathGeometry),
    Text(TextGeometry),
    Image(ImageGeometry),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
    Close,
    /// Fill every figure started since the last fill or stroke.
    Fill(Color),
    /// Stroke every figure started since the last fill or stroke.
    Stroke { color: Color, thickness: f32 },
}

/// A sequence of path commands, built up immediate-mode style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGeometry {
    pub commands: Vec<PathCommand>,
}

impl PathGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, control: Point, to: Point) -> &mut Self {
        self.commands.push(PathCommand::QuadTo { control, to });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Add a closed rectangle figure.
    pub fn path_rect(&mut self, rect: Rect) -> &mut Self {
        self.move_to(rect.top_left())
            .line_to(rect.top_right())
            .line_to(rect.bottom_right())
            .line_to(rect.bottom_left())
            .close()
    }

    pub fn path_fill(&mut self, color: Color) -> &mut Self {
        self.commands.push(PathCommand::Fill(color));
        self
    }

    pub fn path_stroke(&mut self, color: Color, thickness: f32) -> &mut Self {
        self.commands.push(PathCommand::Stroke { color, thickness });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Text laid out in the visual's content rect with the visual's style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGeometry {
    pub text: String,
}

impl TextGeometry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// An image stretched over the visual's content rect, optionally nine-sliced.
#[derive(Debug, Clone)]
pub struct ImageGeometry {
    pub texture: Rc<dyn Texture>,
    pub slice: Option<Thickness>,
}

impl ImageGeometry {
    pub fn new(texture: Rc<dyn Texture>) -> Self {
        Self {
            texture,
            slice: None,
        }
    }

    pub fn sliced(texture: Rc<dyn Texture>, slice: Thickness) -> Self {
        Self {
            texture,
            slice: Some(slice),
        }
    }
}

/// Flatten a quadratic curve into `segments` line pieces, excluding the start point.
pub(crate) fn flatten_quad(from: Point, control: Point, to: Point, segments: usize) -> Vec<Point> {
    (1..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            from.lerp(control, t).lerp(control.lerp(to, t), t)
        })
        .collect()
}
