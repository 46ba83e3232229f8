//! Tooltip Staging
//!
//! Widgets contribute tooltip text while a frame is built; the frame
//! driver flushes it once, after every contribution, as a single overlay.

use crate::color::Rgba;
use crate::render::TextRenderer;
use crate::rich_text::{render_rich_text, RichText};

/// Pending tooltip content for the current frame
#[derive(Clone, Debug, Default)]
pub struct TooltipAccumulator {
    pending: RichText,
}

impl TooltipAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending content
    pub fn set(&mut self, text: impl Into<RichText>) {
        self.pending = text.into();
    }

    /// Append to the pending content (plain or styled bytes)
    pub fn add(&mut self, text: impl AsRef<[u8]>) {
        self.pending.push_bytes(text.as_ref());
    }

    pub fn pending(&self) -> &RichText {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop the pending content without rendering it
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Render and clear the pending content, if there is any
    ///
    /// Uses the renderer's small font when it has one. Returns whether a
    /// tooltip was emitted.
    pub fn consume_and_render_if_present<R>(&mut self, renderer: &mut R, default_color: Rgba) -> bool
    where
        R: TextRenderer + ?Sized,
    {
        if self.pending.is_empty() {
            return false;
        }

        let small_font = renderer.push_small_font();
        renderer.begin_tooltip();
        render_rich_text(renderer, self.pending.as_bytes(), default_color);
        renderer.end_tooltip();
        if small_font {
            renderer.pop_font();
        }

        self.pending.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::{RecordingRenderer, RenderCall};

    #[test]
    fn test_add_concatenates_and_consumes_once() {
        let mut tooltip = TooltipAccumulator::new();
        tooltip.add("x");
        tooltip.add("y");

        let mut renderer = RecordingRenderer::default();
        assert!(tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE));
        assert_eq!(renderer.text(), "xy");
        assert_eq!(renderer.count(&RenderCall::BeginTooltip), 1);

        let calls = renderer.calls.len();
        assert!(!tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE));
        assert_eq!(renderer.calls.len(), calls);
    }

    #[test]
    fn test_set_replaces_pending() {
        let mut tooltip = TooltipAccumulator::new();
        tooltip.add("stale");
        tooltip.set("fresh");

        assert_eq!(tooltip.pending().plain_text(), "fresh");
    }

    #[test]
    fn test_small_font_pushed_and_popped_when_available() {
        let mut tooltip = TooltipAccumulator::new();
        tooltip.set("tip");

        let mut renderer = RecordingRenderer::with_small_font();
        tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE);

        assert_eq!(renderer.calls.first(), Some(&RenderCall::PushSmallFont));
        assert_eq!(renderer.calls.last(), Some(&RenderCall::PopFont));
        assert_eq!(renderer.color_depth(), 0);
    }

    #[test]
    fn test_no_pop_without_small_font() {
        let mut tooltip = TooltipAccumulator::new();
        tooltip.set("tip");

        let mut renderer = RecordingRenderer::default();
        tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE);

        assert_eq!(renderer.count(&RenderCall::PopFont), 0);
        assert_eq!(renderer.calls.last(), Some(&RenderCall::EndTooltip));
    }

    #[test]
    fn test_rich_contributions_keep_colors() {
        let red = Rgba::new(255, 0, 0, 255);
        let mut part = RichText::new();
        part.push_colored(red, "hot");

        let mut tooltip = TooltipAccumulator::new();
        tooltip.add("cpu ");
        tooltip.add(&part);

        let mut renderer = RecordingRenderer::default();
        tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE);

        assert_eq!(
            renderer.colored_runs(),
            vec![("cpu ".to_string(), Rgba::WHITE), ("hot".to_string(), red)]
        );
    }

    #[test]
    fn test_empty_is_noop() {
        let mut tooltip = TooltipAccumulator::new();
        let mut renderer = RecordingRenderer::default();

        assert!(!tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE));
        assert!(renderer.calls.is_empty());
    }
}
