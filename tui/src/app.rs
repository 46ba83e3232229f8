//! Main Application
//!
//! The App owns every frame-thread resource: the log collector, the color
//! table, the style settings and the settings file. Each frame it:
//! 1. Handles terminal input
//! 2. Merges background log entries and collects finished loaders
//! 3. Renders the log panel and the color panel
//! 4. Stages the selected color's tooltip
//! 5. Flushes the tooltip into a popup over everything else

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::time::MissedTickBehavior;
use tracevis_core::{
    logf, render_rich_text, AppConfig, ColorId, ColorPicker, ColorTable, FileSettings,
    LogCollector, Logger, PickerChannel, Rgba, RichText, SettingsError, SharedPalette,
    StyleSettings, TooltipAccumulator,
};

use crate::loader::LoaderSet;
use crate::render::SpanRenderer;
use crate::theme;
use crate::widgets::{RichTextBlock, RichTextBlockState};

/// Picker slider step per key press
const PICKER_STEP: f32 = 0.05;

/// Font scale step and bounds
const SCALE_STEP: f32 = 0.25;
const SCALE_RANGE: (f32, f32) = (0.5, 3.0);

/// Tooltip popup width before font scaling
const TOOLTIP_MAX_WIDTH: f32 = 40.0;

/// Log lines per page scroll
const PAGE_LINES: i32 = 10;

pub struct App {
    config: AppConfig,

    log: LogCollector,
    logger: Logger,
    /// Styled lines for `log.snapshot()[..rendered_entries]`
    log_lines: Vec<Line<'static>>,
    rendered_entries: usize,
    log_state: RichTextBlockState,

    colors: ColorTable,
    /// `colors` as seen by the tracing layer and loader threads
    palette: SharedPalette,
    style: StyleSettings,
    /// `None` when there is no settings path or the file is unreadable
    settings: Option<FileSettings>,
    picker: ColorPicker,
    tooltip: TooltipAccumulator,

    loaders: LoaderSet,

    selected: usize,
    swatch: usize,
    show_tooltip: bool,
    running: bool,
}

impl App {
    /// Load settings, apply them, and start loaders for `files`
    pub fn new(config: AppConfig, log: LogCollector, files: Vec<PathBuf>) -> Self {
        Self::with_palette(config, log, files, SharedPalette::default())
    }

    /// Like [`new`](Self::new), publishing colors into an existing palette
    pub fn with_palette(
        config: AppConfig,
        mut log: LogCollector,
        files: Vec<PathBuf>,
        palette: SharedPalette,
    ) -> Self {
        let logger = log.logger();

        let settings = match config.settings_path.as_ref() {
            Some(path) => match FileSettings::open(path) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!(error = %e, "Settings unavailable, edits will not be saved");
                    None
                }
            },
            None => None,
        };

        let mut colors = ColorTable::new();
        let mut style = StyleSettings::new();
        if let Some(ref settings) = settings {
            colors.load(settings);
            style.load(settings);
        }
        palette.publish(&colors);

        logf!(log, "tracevis {} starting, {} file(s)", env!("CARGO_PKG_VERSION"), files.len());
        let loaders = LoaderSet::spawn(files, &logger, &palette);

        Self {
            config,
            log,
            logger,
            log_lines: Vec::new(),
            rendered_entries: 0,
            log_state: RichTextBlockState::default(),
            colors,
            palette,
            style,
            settings,
            picker: ColorPicker::default(),
            tooltip: TooltipAccumulator::new(),
            loaders,
            selected: 0,
            swatch: 0,
            show_tooltip: true,
            running: true,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / f64::from(self.config.frame_rate));
        let mut interval = tokio::time::interval(frame_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut event_stream = EventStream::new();

        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => self.handle_key(key),
                        // Resize and the rest redraw below
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                _ = interval.tick() => {}
            }

            self.update();
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false
            }

            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left => self.move_swatch(-1),
            KeyCode::Right => self.move_swatch(1),
            KeyCode::Enter => self.apply_swatch(),
            KeyCode::Char('r') => self.reset_selected(),
            KeyCode::Char('c') => self.clear_log(),
            KeyCode::Char('t') => self.show_tooltip = !self.show_tooltip,

            KeyCode::Char('s') => self.picker.adjust(PickerChannel::Saturation, -PICKER_STEP),
            KeyCode::Char('S') => self.picker.adjust(PickerChannel::Saturation, PICKER_STEP),
            KeyCode::Char('v') => self.picker.adjust(PickerChannel::Value, -PICKER_STEP),
            KeyCode::Char('V') => self.picker.adjust(PickerChannel::Value, PICKER_STEP),
            KeyCode::Char('a') => self.picker.adjust(PickerChannel::Alpha, -PICKER_STEP),
            KeyCode::Char('A') => self.picker.adjust(PickerChannel::Alpha, PICKER_STEP),

            KeyCode::Char('+') => self.adjust_scale(SCALE_STEP),
            KeyCode::Char('-') => self.adjust_scale(-SCALE_STEP),

            KeyCode::PageUp => self.log_state.scroll(-PAGE_LINES),
            KeyCode::PageDown => self.log_state.scroll(PAGE_LINES),
            KeyCode::End => self.log_state.scroll_to_bottom(),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let count = ColorId::COUNT as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(count) as usize;
    }

    fn move_swatch(&mut self, delta: isize) {
        let count = tracevis_core::color::SWATCH_COUNT as isize;
        self.swatch = (self.swatch as isize + delta).rem_euclid(count) as usize;
    }

    fn apply_swatch(&mut self) {
        let Some(color) = self.picker.select(self.swatch) else {
            return;
        };
        let id = self.selected_id();
        if self.colors.set(id, color) {
            self.palette.publish(&self.colors);
            self.log_color_change(id, "set to");
        }
    }

    fn reset_selected(&mut self) {
        let id = self.selected_id();
        if self.colors.reset(id) {
            self.palette.publish(&self.colors);
            self.log_color_change(id, "reset to");
        }
    }

    fn adjust_scale(&mut self, delta: f32) {
        let (min, max) = SCALE_RANGE;
        self.style.font_scale = (self.style.font_scale + delta).clamp(min, max);
    }

    fn log_color_change(&mut self, id: ColorId, verb: &str) {
        let color = self.colors.get(id, None);

        let mut entry = RichText::new();
        entry
            .push_str("Color ")
            .push_colored(self.colors.get(ColorId::BrightText, None), id.name())
            .push_color(self.config.default_text_color)
            .push_str(" ")
            .push_str(verb)
            .push_str(" ")
            .push_colored(color.with_alpha(255), &color.to_string());
        self.log.append(entry);
    }

    fn clear_log(&mut self) {
        self.log.clear();
        self.log_lines.clear();
        self.rendered_entries = 0;
        self.log_state = RichTextBlockState::default();
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Merge cross-thread log entries and collect finished loaders
    pub fn update(&mut self) {
        self.log.merge();
        if self.loaders.poll(&self.logger) > 0 {
            self.log.merge();
        }
    }

    /// Render the UI
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let [main, status] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());
        let [log_area, color_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(main);

        self.draw_log(frame, log_area);
        let anchor = self.draw_colors(frame, color_area);
        self.draw_status(frame, status);

        self.flush_tooltip(frame, anchor);
    }

    /// Style entries appended since the last frame
    fn sync_log_lines(&mut self) {
        if self.log.len() < self.rendered_entries {
            self.log_lines.clear();
            self.rendered_entries = 0;
        }

        let mut renderer = SpanRenderer::new();
        for entry in &self.log.snapshot()[self.rendered_entries..] {
            render_rich_text(&mut renderer, entry.as_bytes(), self.config.default_text_color);
            renderer.finish_line();
        }
        self.log_lines.extend(renderer.take_lines());
        self.rendered_entries = self.log.len();
    }

    fn draw_log(&mut self, frame: &mut Frame<'_>, area: Rect) {
        self.sync_log_lines();

        let panel = theme::panel_style(&self.style);
        let block = Block::bordered()
            .title(format!(" Log ({}) ", self.log.len()))
            .border_style(theme::border_style(&self.style))
            .style(panel);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        frame.render_stateful_widget(
            RichTextBlock::new(&self.log_lines).style(panel),
            inner,
            &mut self.log_state,
        );
    }

    /// Draw the color list and swatches; returns the selected row
    fn draw_colors(&mut self, frame: &mut Frame<'_>, area: Rect) -> Rect {
        let panel = theme::panel_style(&self.style);
        let bg = theme::window_bg(&self.style);
        let block = Block::bordered()
            .title(format!(" Colors ({} modified) ", self.colors.dirty_count()))
            .border_style(theme::border_style(&self.style))
            .style(panel);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = usize::from(inner.width.max(1));
        let swatch_rows = tracevis_core::color::SWATCH_COUNT.div_ceil(width) as u16;
        let [list_area, picker_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(swatch_rows + 1)])
                .areas(inner);

        // Keep the selection visible
        let visible = usize::from(list_area.height.max(1));
        let first = (self.selected + 1).saturating_sub(visible);

        let rows: Vec<Line<'static>> = self
            .colors
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(i, (id, color))| {
                let marker = if i == self.selected { theme::SELECTION_MARKER } else { "  " };
                let dirty = if self.colors.is_dirty(id) { " *" } else { "" };
                let line = Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        theme::SWATCH_GLYPH.repeat(2),
                        Style::default().fg(theme::to_color_on(color, bg)),
                    ),
                    Span::raw(format!(" {}{}", id.name(), dirty)),
                ]);
                if i == self.selected {
                    line.style(theme::selected_style(&self.style))
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(rows).style(panel), list_area);

        let swatches: Vec<Span<'static>> = self
            .picker
            .swatches()
            .into_iter()
            .enumerate()
            .map(|(i, swatch)| {
                let glyph = if i == self.swatch {
                    theme::SWATCH_ACTIVE_GLYPH
                } else {
                    theme::SWATCH_GLYPH
                };
                Span::styled(
                    glyph,
                    Style::default().fg(theme::to_color_on(swatch.color, bg)),
                )
            })
            .collect();
        let mut picker_lines = vec![Line::from(format!(
            "S {:.2}  V {:.2}  A {:.2}",
            self.picker.saturation, self.picker.value, self.picker.alpha
        ))];
        picker_lines.extend(
            swatches
                .chunks(width)
                .map(|chunk| Line::from(chunk.to_vec())),
        );
        frame.render_widget(Paragraph::new(picker_lines).style(panel), picker_area);

        if self.show_tooltip {
            let tip = self.selected_tooltip();
            self.tooltip.set(tip);
            if let Some(color) = self.picker.select(self.swatch) {
                let mut preview = RichText::new();
                preview
                    .push_newline()
                    .push_str("swatch ")
                    .push_colored(color.with_alpha(255), &color.to_string());
                self.tooltip.add(&preview);
            }
        }

        Rect::new(
            list_area.x,
            list_area.y + (self.selected - first) as u16,
            list_area.width,
            1,
        )
    }

    fn selected_tooltip(&self) -> RichText {
        let id = self.selected_id();
        let color = self.colors.get(id, None);
        let state = if self.colors.is_dirty(id) { "modified" } else { "saved" };

        let mut tip = RichText::new();
        tip.push_colored(self.colors.get(ColorId::BrightText, None), id.name())
            .push_newline()
            .push_str("value ")
            .push_colored(color.with_alpha(255), &color.to_string())
            .push_newline()
            .push_colored(self.colors.get(ColorId::DimText, None), state);
        tip
    }

    fn draw_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(theme::STATUS_KEY));
        let text = |t: String| Span::styled(t, Style::default().fg(theme::STATUS_TEXT));

        let loaded = self.loaders.finished().len();
        let line = Line::from(vec![
            key("q"),
            text(" quit  ".into()),
            key("↑↓"),
            text(" color  ".into()),
            key("←→"),
            text(" swatch  ".into()),
            key("enter"),
            text(" apply  ".into()),
            key("r"),
            text(" reset  ".into()),
            key("c"),
            text(" clear log  ".into()),
            text(format!(
                "│ files {loaded}/{} │ entries {} │ scale {:.2}",
                self.loaders.total(),
                self.log.len(),
                self.style.font_scale
            )),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Draw whatever was staged this frame as a popup beside `anchor`
    fn flush_tooltip(&mut self, frame: &mut Frame<'_>, anchor: Rect) {
        let popup_style = theme::popup_style(&self.style);
        let mut renderer = SpanRenderer::new().with_base_style(popup_style);
        if self.config.tooltip_small_font {
            renderer = renderer.with_small_font(theme::SMALL_FONT);
        }

        if !self
            .tooltip
            .consume_and_render_if_present(&mut renderer, self.config.default_text_color)
        {
            return;
        }

        let lines = renderer.take_tooltip();
        let area = frame.area();
        let max_width = self.style.scale(TOOLTIP_MAX_WIDTH) as u16;
        let content_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
        let width = (content_width + 2).min(max_width).min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);

        let x = anchor.x.saturating_sub(width).max(area.x);
        let y = anchor.y.min(area.bottom().saturating_sub(height));
        let popup = Rect::new(x, y, width, height);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .style(popup_style)
                .block(Block::bordered().border_style(theme::border_style(&self.style))),
            popup,
        );
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Persist edits and release the log
    ///
    /// Modified colors and the style are written to the settings file, then
    /// every log entry is released and the collector stops accepting
    /// entries from other threads.
    pub fn shutdown(mut self) -> Result<(), SettingsError> {
        let flushed = match self.settings.as_mut() {
            Some(settings) => {
                let written = self.colors.save(settings);
                self.style.save(settings);
                tracing::info!(colors = written, path = %settings.path().display(), "Saving settings");
                settings.flush()
            }
            None => Ok(()),
        };

        self.log.clear();
        self.log.shutdown();

        flushed
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn selected_id(&self) -> ColorId {
        ColorId::ALL[self.selected]
    }

    pub fn selected_swatch(&self) -> Option<Rgba> {
        self.picker.select(self.swatch)
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn palette(&self) -> &SharedPalette {
        &self.palette
    }

    pub fn style(&self) -> &StyleSettings {
        &self.style
    }

    pub fn log(&self) -> &LogCollector {
        &self.log
    }

    pub fn loaders(&self) -> &LoaderSet {
        &self.loaders
    }

    /// Handle for logging into this app from other threads
    pub fn logger(&self) -> Logger {
        self.logger.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    use super::*;

    fn test_app() -> App {
        let mut config = AppConfig::default();
        config.settings_path = None;
        App::new(config, LogCollector::init(), Vec::new())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = test_app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_id(), *ColorId::ALL.last().unwrap());

        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_id(), ColorId::ALL[0]);
    }

    #[test]
    fn test_apply_swatch_sets_and_logs() {
        let mut app = test_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);

        let swatch = app.selected_swatch().unwrap();
        press(&mut app, KeyCode::Enter);

        let id = ColorId::ALL[1];
        assert_eq!(app.colors().get(id, None), swatch);
        assert!(app.colors().is_dirty(id));

        let last = app.log().snapshot().last().unwrap().plain_text();
        assert_eq!(last, format!("Color {} set to {}", id.name(), swatch.with_alpha(255)));
    }

    #[test]
    fn test_color_edits_reach_shared_palette() {
        let mut app = test_app();
        for _ in 0..ColorId::RedText.index() {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Right);
        let swatch = app.selected_swatch().unwrap();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.selected_id(), ColorId::RedText);
        assert_eq!(app.palette().get(ColorId::RedText), swatch);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(
            app.palette().get(ColorId::RedText),
            ColorId::RedText.default_color()
        );
    }

    #[test]
    fn test_reset_restores_default() {
        let mut app = test_app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));

        let id = app.selected_id();
        assert_eq!(app.colors().get(id, None), id.default_color());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(app.is_running());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_running());

        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
    }

    #[test]
    fn test_clear_log_key() {
        let mut app = test_app();
        assert!(!app.log().is_empty());

        press(&mut app, KeyCode::Char('c'));
        assert!(app.log().is_empty());
        assert!(app.is_running());
    }

    #[test]
    fn test_font_scale_clamped() {
        let mut app = test_app();
        for _ in 0..20 {
            press(&mut app, KeyCode::Char('+'));
        }
        assert_eq!(app.style().font_scale, SCALE_RANGE.1);
    }

    #[test]
    fn test_draw_shows_panels_and_tooltip() {
        let mut app = test_app();
        let text = screen(&mut app);

        assert!(text.contains("Log (1)"));
        assert!(text.contains("tracevis"));
        assert!(text.contains("GraphRowBk"));
        // Tooltip for the selected color
        assert!(text.contains("value "));
        assert!(text.contains("swatch ff"));
    }

    #[test]
    fn test_tooltip_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('t'));

        let text = screen(&mut app);
        assert!(!text.contains("value "));
    }

    #[test]
    fn test_background_entries_appear_after_update() {
        let mut app = test_app();
        let logger = app.logger();
        std::thread::spawn(move || logger.append("from worker"))
            .join()
            .unwrap();

        assert!(!screen(&mut app).contains("from worker"));
        app.update();
        assert!(screen(&mut app).contains("from worker"));
    }
}
