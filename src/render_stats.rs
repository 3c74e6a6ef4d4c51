//! Per-pass render counters for debugging and performance analysis.
//!
//! A [`FrameStats`] lives in the [`crate::visual::RenderContext`] of one
//! render pass. Callers read it after the pass and may log or accumulate it.

use std::fmt;
use std::ops::AddAssign;

/// Counters gathered during one render pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Visuals the pass descended into.
    pub visuals_visited: u64,
    /// Visuals whose content was regenerated.
    pub contents_rendered: u64,
    /// Shaped-text handles requested from the text shaper.
    pub text_contexts_created: u64,
    /// Text contents whose previous build was reused.
    pub text_builds_skipped: u64,
}

impl FrameStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fraction of visited visuals that were re-rendered.
    pub fn render_rate(&self) -> f64 {
        if self.visuals_visited == 0 {
            0.0
        } else {
            self.contents_rendered as f64 / self.visuals_visited as f64
        }
    }
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, other: Self) {
        self.visuals_visited += other.visuals_visited;
        self.contents_rendered += other.contents_rendered;
        self.text_contexts_created += other.text_contexts_created;
        self.text_builds_skipped += other.text_builds_skipped;
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {} | rendered {} ({:.1}%) | text shaped {} reused {}",
            self.visuals_visited,
            self.contents_rendered,
            self.render_rate() * 100.0,
            self.text_contexts_created,
            self.text_builds_skipped
        )
    }
}
