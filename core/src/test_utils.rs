//! Renderer Test Utilities
//!
//! Provides a `TextRenderer` that records every primitive call, for
//! asserting on rich-text and tooltip output without a real frontend.
//!
//! # Usage
//!
//! ```ignore
//! use tracevis_core::test_utils::{RecordingRenderer, RenderCall};
//!
//! let mut renderer = RecordingRenderer::with_small_font();
//! tooltip.consume_and_render_if_present(&mut renderer, Rgba::WHITE);
//!
//! assert_eq!(renderer.text(), "xy");
//! assert_eq!(renderer.count(&RenderCall::BeginTooltip), 1);
//! ```

use crate::color::Rgba;
use crate::render::TextRenderer;

/// One recorded renderer call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCall {
    PushColor(Rgba),
    PopColor,
    Text(String),
    SameLine,
    NewLine,
    PushSmallFont,
    PopFont,
    BeginTooltip,
    EndTooltip,
}

/// Records calls in order
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
    /// Whether `push_small_font` reports a secondary font
    pub has_small_font: bool,
    color_depth: usize,
}

impl RecordingRenderer {
    pub fn with_small_font() -> Self {
        Self {
            has_small_font: true,
            ..Self::default()
        }
    }

    /// All text runs concatenated, line breaks as `\n`
    pub fn text(&self) -> String {
        let mut out = String::new();
        for call in &self.calls {
            match call {
                RenderCall::Text(t) => out.push_str(t),
                RenderCall::NewLine => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    /// Text runs paired with the color active when they were emitted
    pub fn colored_runs(&self) -> Vec<(String, Rgba)> {
        let mut stack: Vec<Rgba> = Vec::new();
        let mut runs = Vec::new();

        for call in &self.calls {
            match call {
                RenderCall::PushColor(c) => stack.push(*c),
                RenderCall::PopColor => {
                    stack.pop();
                }
                RenderCall::Text(t) => {
                    runs.push((t.clone(), stack.last().copied().unwrap_or_default()));
                }
                _ => {}
            }
        }

        runs
    }

    pub fn count(&self, call: &RenderCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Pushes minus pops; zero when every push was balanced
    pub fn color_depth(&self) -> usize {
        self.color_depth
    }
}

impl TextRenderer for RecordingRenderer {
    fn push_text_color(&mut self, color: Rgba) {
        self.color_depth += 1;
        self.calls.push(RenderCall::PushColor(color));
    }

    fn pop_text_color(&mut self) {
        self.color_depth = self.color_depth.saturating_sub(1);
        self.calls.push(RenderCall::PopColor);
    }

    fn text_run(&mut self, text: &str) {
        self.calls.push(RenderCall::Text(text.to_owned()));
    }

    fn same_line(&mut self) {
        self.calls.push(RenderCall::SameLine);
    }

    fn new_line(&mut self) {
        self.calls.push(RenderCall::NewLine);
    }

    fn push_small_font(&mut self) -> bool {
        if self.has_small_font {
            self.calls.push(RenderCall::PushSmallFont);
        }
        self.has_small_font
    }

    fn pop_font(&mut self) {
        self.calls.push(RenderCall::PopFont);
    }

    fn begin_tooltip(&mut self) {
        self.calls.push(RenderCall::BeginTooltip);
    }

    fn end_tooltip(&mut self) {
        self.calls.push(RenderCall::EndTooltip);
    }
}
