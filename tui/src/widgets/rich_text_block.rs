//! RichTextBlock Widget
//!
//! A borderless, scrollable region of pre-styled lines. Lines wider than
//! the area are clipped, not wrapped, so one log entry stays one row.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

/// Scroll state for a rich text block
#[derive(Debug)]
pub struct RichTextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total content lines at the last render
    pub total_lines: usize,
    /// Keep the newest line in view as content grows
    pub follow: bool,
}

impl Default for RichTextBlockState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            total_lines: 0,
            follow: true,
        }
    }
}

impl RichTextBlockState {
    /// Scroll by delta (positive = down); scrolling up stops following
    pub fn scroll(&mut self, delta: i32) {
        let new_offset = self.scroll_offset as i64 + i64::from(delta);
        self.scroll_offset = new_offset.max(0) as usize;
        if delta < 0 {
            self.follow = false;
        }
    }

    /// Jump to the newest line and keep following
    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll_offset = self.total_lines;
    }
}

/// A borderless, scrollable block of styled lines
pub struct RichTextBlock<'a> {
    lines: &'a [Line<'a>],
    style: Style,
}

impl<'a> RichTextBlock<'a> {
    pub fn new(lines: &'a [Line<'a>]) -> Self {
        Self {
            lines,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl StatefulWidget for RichTextBlock<'_> {
    type State = RichTextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(area, self.style);

        state.total_lines = self.lines.len();

        let height = area.height as usize;
        let max_scroll = state.total_lines.saturating_sub(height);
        if state.follow {
            state.scroll_offset = max_scroll;
        }
        state.scroll_offset = state.scroll_offset.min(max_scroll);
        if state.scroll_offset == max_scroll {
            state.follow = true;
        }

        for (i, line) in self
            .lines
            .iter()
            .skip(state.scroll_offset)
            .take(height)
            .enumerate()
        {
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(lines: &[Line<'_>], height: u16, state: &mut RichTextBlockState) -> Vec<String> {
        let area = Rect::new(0, 0, 6, height);
        let mut buf = Buffer::empty(area);
        RichTextBlock::new(lines).render(area, &mut buf, state);

        (0..height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn numbered(n: usize) -> Vec<Line<'static>> {
        (0..n).map(|i| Line::from(format!("l{i}"))).collect()
    }

    #[test]
    fn test_follow_shows_tail() {
        let lines = numbered(5);
        let mut state = RichTextBlockState::default();

        assert_eq!(render(&lines, 2, &mut state), vec!["l3", "l4"]);
        assert_eq!(state.total_lines, 5);
    }

    #[test]
    fn test_scroll_up_stops_following() {
        let lines = numbered(5);
        let mut state = RichTextBlockState::default();
        render(&lines, 2, &mut state);

        state.scroll(-2);
        assert!(!state.follow);
        assert_eq!(render(&lines, 2, &mut state), vec!["l1", "l2"]);

        let more = numbered(8);
        assert_eq!(render(&more, 2, &mut state), vec!["l1", "l2"]);
    }

    #[test]
    fn test_scroll_back_to_bottom_resumes_following() {
        let lines = numbered(5);
        let mut state = RichTextBlockState::default();
        render(&lines, 2, &mut state);
        state.scroll(-1);

        state.scroll(10);
        render(&lines, 2, &mut state);
        assert!(state.follow);
    }

    #[test]
    fn test_long_lines_are_clipped() {
        let lines = vec![Line::from("abcdefghij")];
        let mut state = RichTextBlockState::default();

        assert_eq!(render(&lines, 1, &mut state), vec!["abcdef"]);
    }
}
