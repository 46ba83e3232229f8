//! ratatui Text Renderer
//!
//! [`SpanRenderer`] turns the core's immediate-mode text calls into
//! ratatui [`Line`]s. Tooltip content is captured separately so the frame
//! can draw it as a popup over everything else.

use std::mem;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use tracevis_core::{Rgba, TextRenderer};

use crate::theme;

/// Collects styled runs into lines
#[derive(Debug, Default)]
pub struct SpanRenderer {
    base: Style,
    small_font: Option<Modifier>,
    font_depth: usize,
    colors: Vec<Rgba>,
    current: Vec<Span<'static>>,
    lines: Vec<Line<'static>>,
    /// Main lines parked while a tooltip is open
    parked: Option<Vec<Line<'static>>>,
    tooltip: Vec<Line<'static>>,
}

impl SpanRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style applied under every run
    pub fn with_base_style(mut self, style: Style) -> Self {
        self.base = style;
        self
    }

    /// Offer a small font, drawn with `modifier`
    pub fn with_small_font(mut self, modifier: Modifier) -> Self {
        self.small_font = Some(modifier);
        self
    }

    /// End the current line, even if it is empty
    pub fn finish_line(&mut self) {
        let spans = mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    /// Lines emitted outside tooltips
    pub fn take_lines(&mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() {
            self.finish_line();
        }
        mem::take(&mut self.lines)
    }

    /// Lines of the last tooltip
    pub fn take_tooltip(&mut self) -> Vec<Line<'static>> {
        mem::take(&mut self.tooltip)
    }

    /// Open color pushes (0 when every push was popped)
    pub fn color_depth(&self) -> usize {
        self.colors.len()
    }

    fn run_style(&self) -> Style {
        let mut style = self.base;
        if let Some(color) = self.colors.last() {
            style = style.fg(theme::to_color(*color));
        }
        match self.small_font {
            Some(modifier) if self.font_depth > 0 => style.add_modifier(modifier),
            _ => style,
        }
    }
}

impl TextRenderer for SpanRenderer {
    fn push_text_color(&mut self, color: Rgba) {
        self.colors.push(color);
    }

    fn pop_text_color(&mut self) {
        self.colors.pop();
    }

    fn text_run(&mut self, text: &str) {
        let style = self.run_style();
        self.current.push(Span::styled(text.to_owned(), style));
    }

    fn new_line(&mut self) {
        self.finish_line();
    }

    fn push_small_font(&mut self) -> bool {
        if self.small_font.is_none() {
            return false;
        }
        self.font_depth += 1;
        true
    }

    fn pop_font(&mut self) {
        self.font_depth = self.font_depth.saturating_sub(1);
    }

    fn begin_tooltip(&mut self) {
        if !self.current.is_empty() {
            self.finish_line();
        }
        self.parked = Some(mem::take(&mut self.lines));
    }

    fn end_tooltip(&mut self) {
        if !self.current.is_empty() {
            self.finish_line();
        }
        self.tooltip = mem::take(&mut self.lines);
        self.lines = self.parked.take().unwrap_or_default();
    }
}
