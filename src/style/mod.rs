//! Visual styling: colors, fonts and the box model.

mod font;

pub use font::{Font, FontFamily, FontStretch, FontStyle, FontWeight, TextAlignment};

use crate::error::Result;
use crate::geometry::{Rect, Size, Thickness};
use crate::text::TextShaper;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Placement of a child inside the free space of its parent, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

/// The resolved style of one visual.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font: Font,
    pub text_alignment: TextAlignment,
    pub font_color: Color,
    pub background_color: Color,
    pub border: Thickness,
    pub border_color: Color,
    pub padding: Thickness,
    /// Gap between consecutive children of a group.
    pub cell_spacing: f32,
    pub horizontal_alignment: Alignment,
    pub vertical_alignment: Alignment,
    pub corner_radius: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: Font::default(),
            text_alignment: TextAlignment::default(),
            font_color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            border: Thickness::default(),
            border_color: Color::TRANSPARENT,
            padding: Thickness::default(),
            cell_spacing: 0.0,
            horizontal_alignment: Alignment::Start,
            vertical_alignment: Alignment::Start,
            corner_radius: 0.0,
        }
    }
}

impl Style {
    /// Whether text shaped with `previous` must be shaped again for `next`.
    ///
    /// Only the font fields and the text alignment take part; colors and box
    /// model changes reuse the shaped text.
    pub fn requires_text_rebuild(previous: Option<&Style>, next: &Style) -> bool {
        let Some(previous) = previous else {
            return true;
        };
        previous.font.family != next.font.family
            || previous.font.size != next.font.size
            || previous.font.stretch != next.font.stretch
            || previous.font.style != next.font.style
            || previous.font.weight != next.font.weight
            || previous.text_alignment != next.text_alignment
    }

    /// Natural size of `text` laid out on a single unconstrained box.
    pub fn text_actual_size(&self, text: &str, shaper: &mut dyn TextShaper) -> Result<Size> {
        shaper.measure(text, &self.font)
    }

    /// Border box minus the border.
    pub fn padding_rect(&self, border_box: Rect) -> Rect {
        border_box.deflate(self.border)
    }

    /// Border box minus border and padding.
    pub fn content_rect(&self, border_box: Rect) -> Rect {
        self.padding_rect(border_box).deflate(self.padding)
    }

    /// Total horizontal and vertical space taken by border and padding.
    pub fn box_extent(&self) -> Size {
        Size::new(
            self.border.horizontal() + self.padding.horizontal(),
            self.border.vertical() + self.padding.vertical(),
        )
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font.size = size;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn border(mut self, thickness: Thickness, color: Color) -> Self {
        self.border = thickness;
        self.border_color = color;
        self
    }

    pub fn padding(mut self, padding: Thickness) -> Self {
        self.padding = padding;
        self
    }
}
