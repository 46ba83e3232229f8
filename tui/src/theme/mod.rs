//! Theme and Colors
//!
//! Terminal cells have no alpha, so translucent palette entries are
//! blended over a background before they reach ratatui.

use ratatui::style::{Color, Modifier, Style};
use tracevis_core::{ColorId, Rgba, SharedPalette, StyleColor, StyleSettings};

// ============================================================================
// UI Colors
// ============================================================================

/// Status bar key hints
pub const STATUS_KEY: Color = Color::Rgb(255, 223, 128);

/// Status bar text
pub const STATUS_TEXT: Color = Color::Rgb(160, 160, 160);

/// Selection marker in the color list
pub const SELECTION_MARKER: &str = "▶ ";

/// Swatch glyph
pub const SWATCH_GLYPH: &str = "█";

/// Glyph for the active swatch
pub const SWATCH_ACTIVE_GLYPH: &str = "◆";

/// Modifier standing in for the small tooltip font
pub const SMALL_FONT: Modifier = Modifier::ITALIC;

// ============================================================================
// Conversions
// ============================================================================

/// Opaque terminal color, ignoring alpha
pub fn to_color(color: Rgba) -> Color {
    Color::Rgb(color.r(), color.g(), color.b())
}

/// Composite `fg` over an opaque `bg` using `fg`'s alpha
pub fn blend_over(fg: Rgba, bg: Rgba) -> Rgba {
    let a = u16::from(fg.a());
    let mix = |f: u8, b: u8| ((u16::from(f) * a + u16::from(b) * (255 - a) + 127) / 255) as u8;
    Rgba::new(mix(fg.r(), bg.r()), mix(fg.g(), bg.g()), mix(fg.b(), bg.b()), 255)
}

/// Terminal color for `fg` drawn on `bg`
pub fn to_color_on(fg: Rgba, bg: Rgba) -> Color {
    to_color(blend_over(fg, bg))
}

/// Level word color for forwarded tracing events
pub fn level_color(level: &tracing::Level, palette: &SharedPalette) -> Rgba {
    let id = match *level {
        tracing::Level::ERROR => ColorId::RedText,
        tracing::Level::WARN => ColorId::YellowText,
        tracing::Level::INFO => ColorId::GreenText,
        _ => ColorId::DimText,
    };
    palette.get(id)
}

// ============================================================================
// Panel Styles
// ============================================================================

/// Window background, composited over black
pub fn window_bg(style: &StyleSettings) -> Rgba {
    blend_over(style.rgba(StyleColor::WindowBg), Rgba::BLACK)
}

/// Base style for panel text
pub fn panel_style(style: &StyleSettings) -> Style {
    let bg = window_bg(style);
    Style::default()
        .fg(to_color_on(style.rgba(StyleColor::Text), bg))
        .bg(to_color(bg))
}

pub fn border_style(style: &StyleSettings) -> Style {
    Style::default().fg(to_color_on(style.rgba(StyleColor::Border), window_bg(style)))
}

/// Highlight for the selected color row
pub fn selected_style(style: &StyleSettings) -> Style {
    Style::default()
        .bg(to_color_on(style.rgba(StyleColor::HeaderHovered), window_bg(style)))
        .add_modifier(Modifier::BOLD)
}

pub fn popup_style(style: &StyleSettings) -> Style {
    let bg = blend_over(style.rgba(StyleColor::PopupBg), Rgba::BLACK);
    Style::default()
        .fg(to_color_on(style.rgba(StyleColor::Text), bg))
        .bg(to_color(bg))
}
