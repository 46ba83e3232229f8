//! Rendering Boundary
//!
//! The drawing library is an external collaborator. The core only talks
//! to it through [`TextRenderer`], a small set of immediate-mode
//! primitives fed in order by [`render_rich_text`](crate::rich_text::render_rich_text)
//! and the tooltip flush.

use crate::color::Rgba;

/// Immediate-mode text primitives provided by the rendering library
pub trait TextRenderer {
    /// Make `color` the text color until the matching pop
    fn push_text_color(&mut self, color: Rgba);

    fn pop_text_color(&mut self);

    /// Emit one styled run in the current text color
    fn text_run(&mut self, text: &str);

    /// Keep the next run on the current line
    fn same_line(&mut self) {}

    /// Advance to a new line
    fn new_line(&mut self);

    /// Switch to the secondary (smaller) font if one exists
    ///
    /// Returns `false` when there is none; the caller must then skip the
    /// matching [`pop_font`](Self::pop_font).
    fn push_small_font(&mut self) -> bool {
        false
    }

    fn pop_font(&mut self) {}

    /// Open the transient overlay used for tooltips
    fn begin_tooltip(&mut self);

    fn end_tooltip(&mut self);
}
