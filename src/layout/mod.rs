//! Box-model layout for the visual tree.
//!
//! Visuals opt into layout with a [`LayoutKind`]: groups stack their children
//! along one axis, entries size themselves from their content. Per-visual
//! [`LayoutOption`]s fix, bound or expand either dimension.

mod stack;

/// A sizing override attached to a visual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutOption {
    FixedWidth(f32),
    FixedHeight(f32),
    MinWidth(f32),
    MaxWidth(f32),
    MinHeight(f32),
    MaxHeight(f32),
    /// Take a share of the parent's leftover space along this axis, or stretch across it.
    ExpandWidth(bool),
    ExpandHeight(bool),
}

impl LayoutOption {
    /// The fixed width, if any. The last matching option wins.
    pub fn fixed_width(options: &[LayoutOption]) -> Option<f32> {
        options.iter().rev().find_map(|o| match o {
            LayoutOption::FixedWidth(w) => Some(*w),
            _ => None,
        })
    }

    pub fn fixed_height(options: &[LayoutOption]) -> Option<f32> {
        options.iter().rev().find_map(|o| match o {
            LayoutOption::FixedHeight(h) => Some(*h),
            _ => None,
        })
    }

    pub fn expands_width(options: &[LayoutOption]) -> bool {
        options.iter().rev().find_map(|o| match o {
            LayoutOption::ExpandWidth(e) => Some(*e),
            _ => None,
        }) == Some(true)
    }

    pub fn expands_height(options: &[LayoutOption]) -> bool {
        options.iter().rev().find_map(|o| match o {
            LayoutOption::ExpandHeight(e) => Some(*e),
            _ => None,
        }) == Some(true)
    }

    /// Apply min/max width bounds. Min wins over max when they conflict.
    pub fn clamp_width(options: &[LayoutOption], width: f32) -> f32 {
        let mut width = width;
        for option in options {
            if let LayoutOption::MaxWidth(max) = option {
                width = width.min(*max);
            }
        }
        for option in options {
            if let LayoutOption::MinWidth(min) = option {
                width = width.max(*min);
            }
        }
        width
    }

    pub fn clamp_height(options: &[LayoutOption], height: f32) -> f32 {
        let mut height = height;
        for option in options {
            if let LayoutOption::MaxHeight(max) = option {
                height = height.min(*max);
            }
        }
        for option in options {
            if let LayoutOption::MinHeight(min) = option {
                height = height.max(*min);
            }
        }
        height
    }
}

/// How a visual takes part in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Stacks its children, vertically or horizontally.
    Group { vertical: bool },
    /// A leaf sized by its content.
    Entry,
}

impl LayoutKind {
    pub const fn vertical() -> Self {
        LayoutKind::Group { vertical: true }
    }

    pub const fn horizontal() -> Self {
        LayoutKind::Group { vertical: false }
    }
}
