//! Inline Color-Escape Rich Text
//!
//! A styled string is plain text with two control tokens embedded:
//!
//! - `\n` breaks the line
//! - `0x1B` followed by exactly 4 raw bytes (R, G, B, A) switches the color
//!   of everything after it
//!
//! The 4 color bytes are data, not text, so they may take any value
//! (including `\n` or `0x1B`) and a styled string is generally not UTF-8.
//! All types here operate on bytes.
//!
//! # Example
//!
//! ```ignore
//! let mut text = RichText::new();
//! text.push_str("AB");
//! text.push_color(Rgba::new(255, 0, 0, 255));
//! text.push_str("CD");
//!
//! for segment in text.segments(Rgba::WHITE) {
//!     // Run { "AB", white }, Run { "CD", red }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::color::Rgba;
use crate::render::TextRenderer;

/// Control byte introducing a color code
pub const ESCAPE: u8 = 0x1b;

/// Number of data bytes following [`ESCAPE`]
pub const COLOR_CODE_LEN: usize = 4;

/// The 5-byte escape sequence selecting `color`
pub const fn color_code(color: Rgba) -> [u8; 1 + COLOR_CODE_LEN] {
    let [r, g, b, a] = color.to_bytes();
    [ESCAPE, r, g, b, a]
}

// ============================================================================
// Encoder
// ============================================================================

/// An owned styled string
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RichText {
    bytes: Vec<u8>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-encoded bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn push_str(&mut self, text: &str) -> &mut Self {
        self.bytes.extend_from_slice(text.as_bytes());
        self
    }

    /// Switch the color of all following text
    pub fn push_color(&mut self, color: Rgba) -> &mut Self {
        self.bytes.extend_from_slice(&color_code(color));
        self
    }

    pub fn push_newline(&mut self) -> &mut Self {
        self.bytes.push(b'\n');
        self
    }

    /// `text` in `color`, leaving `color` active afterwards
    pub fn push_colored(&mut self, color: Rgba, text: &str) -> &mut Self {
        self.push_color(color).push_str(text)
    }

    /// Append another styled string verbatim
    pub fn append(&mut self, other: &RichText) -> &mut Self {
        self.push_bytes(&other.bytes)
    }

    /// Append already-encoded bytes verbatim
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Decode into runs and line breaks
    pub fn segments(&self, default_color: Rgba) -> Segments<'_> {
        Segments::new(&self.bytes, default_color)
    }

    /// The visible text with color codes removed
    pub fn plain_text(&self) -> String {
        plain_text(&self.bytes)
    }
}

impl fmt::Write for RichText {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl AsRef<[u8]> for RichText {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RichText({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec())
    }
}

impl From<String> for RichText {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl From<Vec<u8>> for RichText {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// One unit of decoded output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Contiguous text in a single color
    Run { text: &'a [u8], color: Rgba },
    /// Vertical advance to a new line
    LineBreak,
}

impl<'a> Segment<'a> {
    /// Run text for display, invalid UTF-8 replaced
    pub fn text(&self) -> Option<Cow<'a, str>> {
        match self {
            Segment::Run { text, .. } => Some(String::from_utf8_lossy(text)),
            Segment::LineBreak => None,
        }
    }
}

/// Single-pass decoder over styled bytes
///
/// Yields runs lazily and never allocates. An escape with fewer than 4
/// bytes after it ends decoding; runs before it are still yielded.
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    input: &'a [u8],
    pos: usize,
    start: usize,
    color: Rgba,
    pending_break: bool,
    done: bool,
}

impl<'a> Segments<'a> {
    pub fn new(input: &'a [u8], default_color: Rgba) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            color: default_color,
            pending_break: false,
            done: false,
        }
    }

    /// Text accumulated since the last control token, as a run
    fn take_run(&mut self) -> Option<Segment<'a>> {
        let input = self.input;
        (self.pos > self.start).then(|| Segment::Run {
            text: &input[self.start..self.pos],
            color: self.color,
        })
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_break {
            self.pending_break = false;
            return Some(Segment::LineBreak);
        }
        if self.done {
            return None;
        }

        let input = self.input;

        while self.pos < input.len() {
            match input[self.pos] {
                b'\n' => {
                    let run = self.take_run();
                    self.pos += 1;
                    self.start = self.pos;

                    return match run {
                        Some(run) => {
                            self.pending_break = true;
                            Some(run)
                        }
                        None => Some(Segment::LineBreak),
                    };
                }
                ESCAPE => {
                    let run = self.take_run();
                    let code_start = self.pos + 1;
                    let code_end = code_start + COLOR_CODE_LEN;

                    let Some(code) = input.get(code_start..code_end) else {
                        // Truncated color code
                        self.done = true;
                        return run;
                    };

                    let next_color = Rgba::from_bytes([code[0], code[1], code[2], code[3]]);
                    self.pos = code_end;
                    self.start = code_end;
                    self.color = next_color;

                    if run.is_some() {
                        return run;
                    }
                }
                _ => self.pos += 1,
            }
        }

        self.done = true;
        let run = self.take_run();
        self.start = self.pos;
        run
    }
}

/// Visible text of styled bytes, color codes dropped and line breaks kept
pub fn plain_text(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());

    for segment in Segments::new(input, Rgba::default()) {
        match segment.text() {
            Some(text) => out.push_str(&text),
            None => out.push('\n'),
        }
    }

    out
}

/// Stand-in for an ESC byte found in outside text
pub const ESCAPE_STANDIN: &str = "\u{241b}";

/// `text` with every ESC replaced by [`ESCAPE_STANDIN`]
///
/// Paths, messages and other text that did not come from a [`RichText`]
/// builder go through this before being pushed, so a stray ESC cannot
/// start a color code.
pub fn replace_escapes(text: &str) -> Cow<'_, str> {
    if text.as_bytes().contains(&ESCAPE) {
        Cow::Owned(text.replace(char::from(ESCAPE), ESCAPE_STANDIN))
    } else {
        Cow::Borrowed(text)
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Feed decoded styled text to a renderer
///
/// The default color is pushed for the duration of the call; each color
/// change pops the active color and pushes the new one. Runs after the
/// first on a line are preceded by `same_line`.
pub fn render_rich_text<R>(renderer: &mut R, input: &[u8], default_color: Rgba)
where
    R: TextRenderer + ?Sized,
{
    let mut active = default_color;
    let mut line_start = true;

    renderer.push_text_color(active);

    for segment in Segments::new(input, default_color) {
        match segment {
            Segment::Run { text, color } => {
                if color != active {
                    renderer.pop_text_color();
                    renderer.push_text_color(color);
                    active = color;
                }
                if !line_start {
                    renderer.same_line();
                }
                renderer.text_run(&String::from_utf8_lossy(text));
                line_start = false;
            }
            Segment::LineBreak => {
                renderer.new_line();
                line_start = true;
            }
        }
    }

    renderer.pop_text_color();
}
