//! Font description types used by text content.
//!
//! A [`Font`] bundles every field that affects glyph shaping. Any change to
//! one of them invalidates previously built text meshes.

use cosmic_text::{Align, Attrs, Family, Stretch, Style as CosmicStyle, Weight};

/// Font family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    /// Sans-serif font (default system sans-serif)
    #[default]
    SansSerif,
    /// Serif font (default system serif)
    Serif,
    /// Monospace font (default system monospace)
    Monospace,
    /// Custom font by name
    Name(String),
}

impl FontFamily {
    /// Convert to cosmic-text Family type for shaping.
    pub fn to_cosmic(&self) -> Family<'_> {
        match self {
            FontFamily::SansSerif => Family::SansSerif,
            FontFamily::Serif => Family::Serif,
            FontFamily::Monospace => Family::Monospace,
            FontFamily::Name(name) => Family::Name(name),
        }
    }
}

/// Font weight on a 100-900 scale, matching CSS font-weight values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: Self = Self(100);
    pub const LIGHT: Self = Self(300);
    /// Normal/regular weight (400) - default
    pub const NORMAL: Self = Self(400);
    pub const MEDIUM: Self = Self(500);
    pub const SEMI_BOLD: Self = Self(600);
    pub const BOLD: Self = Self(700);
    pub const BLACK: Self = Self(900);

    pub fn to_cosmic(self) -> Weight {
        Weight(self.0)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn to_cosmic(self) -> CosmicStyle {
        match self {
            FontStyle::Normal => CosmicStyle::Normal,
            FontStyle::Italic => CosmicStyle::Italic,
            FontStyle::Oblique => CosmicStyle::Oblique,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStretch {
    Condensed,
    SemiCondensed,
    #[default]
    Normal,
    SemiExpanded,
    Expanded,
}

impl FontStretch {
    pub fn to_cosmic(self) -> Stretch {
        match self {
            FontStretch::Condensed => Stretch::Condensed,
            FontStretch::SemiCondensed => Stretch::SemiCondensed,
            FontStretch::Normal => Stretch::Normal,
            FontStretch::SemiExpanded => Stretch::SemiExpanded,
            FontStretch::Expanded => Stretch::Expanded,
        }
    }
}

/// Horizontal alignment of lines inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlignment {
    #[default]
    Leading,
    Center,
    Trailing,
    Justify,
}

impl TextAlignment {
    pub fn to_cosmic(self) -> Align {
        match self {
            TextAlignment::Leading => Align::Left,
            TextAlignment::Center => Align::Center,
            TextAlignment::Trailing => Align::Right,
            TextAlignment::Justify => Align::Justified,
        }
    }
}

/// Everything the shaper needs to know about a face and its size.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: FontFamily,
    pub size: f32,
    pub stretch: FontStretch,
    pub style: FontStyle,
    pub weight: FontWeight,
}

impl Font {
    pub fn new(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            ..Default::default()
        }
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn stretch(mut self, stretch: FontStretch) -> Self {
        self.stretch = stretch;
        self
    }

    /// Line height used for layout, matching the measurer's 1.2 ratio.
    pub fn line_height(&self) -> f32 {
        self.size * 1.2
    }

    pub fn to_attrs(&self) -> Attrs<'_> {
        Attrs::new()
            .family(self.family.to_cosmic())
            .weight(self.weight.to_cosmic())
            .style(self.style.to_cosmic())
            .stretch(self.stretch.to_cosmic())
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: FontFamily::default(),
            size: 14.0,
            stretch: FontStretch::default(),
            style: FontStyle::default(),
            weight: FontWeight::default(),
        }
    }
}
