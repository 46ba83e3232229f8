//! Frontend Style Settings
//!
//! Global font scale and the frontend's widget colors, persisted in the
//! `$imgui_settings$` section (`win_scale` as a float, each style color as
//! a 4-float vector under its name).

use crate::color::{Rgba, Vec4};
use crate::settings::SettingsStore;

/// Settings section for style values
pub const STYLE_SECTION: &str = "$imgui_settings$";

const SCALE_KEY: &str = "win_scale";

/// Widget color slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleColor {
    Text,
    TextDisabled,
    WindowBg,
    PopupBg,
    Border,
    FrameBg,
    TitleBg,
    Header,
    HeaderHovered,
    Button,
    ButtonActive,
    ScrollbarBg,
}

impl StyleColor {
    pub const ALL: &'static [StyleColor] = &[
        StyleColor::Text,
        StyleColor::TextDisabled,
        StyleColor::WindowBg,
        StyleColor::PopupBg,
        StyleColor::Border,
        StyleColor::FrameBg,
        StyleColor::TitleBg,
        StyleColor::Header,
        StyleColor::HeaderHovered,
        StyleColor::Button,
        StyleColor::ButtonActive,
        StyleColor::ScrollbarBg,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub const fn name(self) -> &'static str {
        match self {
            StyleColor::Text => "Text",
            StyleColor::TextDisabled => "TextDisabled",
            StyleColor::WindowBg => "WindowBg",
            StyleColor::PopupBg => "PopupBg",
            StyleColor::Border => "Border",
            StyleColor::FrameBg => "FrameBg",
            StyleColor::TitleBg => "TitleBg",
            StyleColor::Header => "Header",
            StyleColor::HeaderHovered => "HeaderHovered",
            StyleColor::Button => "Button",
            StyleColor::ButtonActive => "ButtonActive",
            StyleColor::ScrollbarBg => "ScrollbarBg",
        }
    }

    const fn default_value(self) -> Vec4 {
        match self {
            StyleColor::Text => [0.90, 0.90, 0.90, 1.00],
            StyleColor::TextDisabled => [0.60, 0.60, 0.60, 1.00],
            StyleColor::WindowBg => [0.00, 0.00, 0.00, 0.70],
            StyleColor::PopupBg => [0.05, 0.05, 0.10, 0.90],
            StyleColor::Border => [0.70, 0.70, 0.70, 0.65],
            StyleColor::FrameBg => [0.80, 0.80, 0.80, 0.30],
            StyleColor::TitleBg => [0.27, 0.27, 0.54, 0.83],
            StyleColor::Header => [0.40, 0.40, 0.90, 0.45],
            StyleColor::HeaderHovered => [0.45, 0.45, 0.90, 0.80],
            StyleColor::Button => [0.67, 0.40, 0.40, 0.60],
            StyleColor::ButtonActive => [0.80, 0.50, 0.50, 1.00],
            StyleColor::ScrollbarBg => [0.20, 0.25, 0.30, 0.60],
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Font scale plus one color per [`StyleColor`]
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSettings {
    pub font_scale: f32,
    colors: [Vec4; StyleColor::COUNT],
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            font_scale: 1.0,
            colors: std::array::from_fn(|i| StyleColor::ALL[i].default_value()),
        }
    }
}

impl StyleSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply stored values, keeping defaults for anything missing
    ///
    /// A missing window background is made fully opaque.
    pub fn load<S: SettingsStore + ?Sized>(&mut self, store: &S) {
        self.font_scale = store.get_float(STYLE_SECTION, SCALE_KEY).unwrap_or(1.0);

        for style in StyleColor::ALL {
            match store.get_vec4(STYLE_SECTION, style.name()) {
                Some(value) => self.colors[style.index()] = value,
                None if *style == StyleColor::WindowBg => self.colors[style.index()][3] = 1.0,
                None => {}
            }
        }

        tracing::debug!(font_scale = self.font_scale, "Loaded style settings");
    }

    /// Write the scale and every color
    pub fn save<S: SettingsStore + ?Sized>(&self, store: &mut S) {
        store.put_float(STYLE_SECTION, SCALE_KEY, self.font_scale);

        for style in StyleColor::ALL {
            store.put_vec4(STYLE_SECTION, style.name(), self.colors[style.index()]);
        }

        tracing::debug!(section = STYLE_SECTION, count = StyleColor::COUNT, "Saved style settings");
    }

    pub fn get(&self, style: StyleColor) -> Vec4 {
        self.colors[style.index()]
    }

    pub fn rgba(&self, style: StyleColor) -> Rgba {
        Rgba::from_vec4(self.get(style))
    }

    pub fn set(&mut self, style: StyleColor, value: Vec4) {
        self.colors[style.index()] = value;
    }

    /// Scale a size by the global font scale
    pub fn scale(&self, value: f32) -> f32 {
        value * self.font_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    #[test]
    fn test_load_empty_store_forces_opaque_window_bg() {
        let mut style = StyleSettings::new();
        style.load(&MemorySettings::new());

        assert_eq!(style.font_scale, 1.0);
        assert_eq!(style.get(StyleColor::WindowBg)[3], 1.0);
        assert_eq!(style.get(StyleColor::PopupBg), StyleColor::PopupBg.default_value());
    }

    #[test]
    fn test_stored_window_bg_alpha_is_kept() {
        let mut store = MemorySettings::new();
        store.put_vec4(STYLE_SECTION, "WindowBg", [0.1, 0.1, 0.1, 0.5]);

        let mut style = StyleSettings::new();
        style.load(&store);
        assert_eq!(style.get(StyleColor::WindowBg), [0.1, 0.1, 0.1, 0.5]);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let mut style = StyleSettings::new();
        style.font_scale = 1.5;
        style.set(StyleColor::Text, [1.0, 0.0, 0.0, 1.0]);

        let mut store = MemorySettings::new();
        style.save(&mut store);
        assert_eq!(store.len(), StyleColor::COUNT + 1);

        let mut loaded = StyleSettings::new();
        loaded.load(&store);
        assert_eq!(loaded, style);
        assert_eq!(loaded.scale(10.0), 15.0);
    }
}
