//! TOML Configuration File Support
//!
//! Viewer configuration lives at `~/.config/tracevis/tracevis.toml`. It is
//! separate from the settings store, which holds user edits (colors and
//! style) written back by the viewer itself.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [ui]
//! frame_rate = 60
//! tooltip_small_font = true
//! default_text_color = "#e6e6e6"
//!
//! [settings]
//! path = "/home/me/.config/tracevis/settings.toml"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgba;

/// Accepted frame rates, in frames per second
pub const FRAME_RATE_RANGE: std::ops::RangeInclusive<u32> = 1..=240;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Cli,
    Env,
    File,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[ui]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Frames per second for the frame loop
    pub frame_rate: Option<u32>,

    /// Draw tooltips with the small font if the frontend has one
    pub tooltip_small_font: Option<bool>,

    /// `#rrggbb` or `#rrggbbaa`
    pub default_text_color: Option<String>,
}

/// `[settings]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsToml {
    /// Settings store file
    pub path: Option<PathBuf>,
}

/// Root of the TOML file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TracevisToml {
    pub ui: UiToml,
    pub settings: SettingsToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved viewer configuration
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub frame_rate: u32,
    pub tooltip_small_font: bool,
    pub default_text_color: Rgba,
    /// Settings store file, `None` when no config directory exists
    pub settings_path: Option<PathBuf>,
    /// Path the config was read from, if any
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            tooltip_small_font: true,
            default_text_color: Rgba::new(230, 230, 230, 255),
            settings_path: default_settings_path(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-priority source that contributed a value
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FRAME_RATE_RANGE.contains(&self.frame_rate) {
            return Err(ConfigError::ValidationError(format!(
                "frame_rate {} outside {}..={}",
                self.frame_rate,
                FRAME_RATE_RANGE.start(),
                FRAME_RATE_RANGE.end()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// `$XDG_CONFIG_HOME/tracevis/tracevis.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tracevis").join("tracevis.toml"))
}

/// `$XDG_CONFIG_HOME/tracevis/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tracevis").join("settings.toml"))
}

/// Load from the default path with environment overrides
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load from `path` (missing file means defaults), then apply the environment
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config_from_path`] with an injectable environment
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: TracevisToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut AppConfig, toml: &TracevisToml) -> Result<(), ConfigError> {
    if let Some(rate) = toml.ui.frame_rate {
        config.frame_rate = rate;
    }
    if let Some(small) = toml.ui.tooltip_small_font {
        config.tooltip_small_font = small;
    }
    if let Some(ref color) = toml.ui.default_text_color {
        config.default_text_color = parse_hex_color(color).ok_or_else(|| {
            ConfigError::ValidationError(format!("default_text_color {color:?} is not #rrggbb[aa]"))
        })?;
    }
    if let Some(ref path) = toml.settings.path {
        config.settings_path = Some(path.clone());
    }
    Ok(())
}

fn apply_env_config<F>(config: &mut AppConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(rate) = env("TRACEVIS_FRAME_RATE") {
        if let Ok(rate) = rate.parse::<u32>() {
            config.frame_rate = rate;
            config.source = ConfigSource::Env;
        }
    }

    if let Some(path) = env("TRACEVIS_SETTINGS") {
        if !path.is_empty() {
            config.settings_path = Some(PathBuf::from(path));
            config.source = ConfigSource::Env;
        }
    }

    if let Some(small) = env("TRACEVIS_SMALL_FONT") {
        match small.as_str() {
            "1" | "true" | "yes" => config.tooltip_small_font = true,
            "0" | "false" | "no" => config.tooltip_small_font = false,
            _ => return,
        }
        config.source = ConfigSource::Env;
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
pub fn parse_hex_color(s: &str) -> Option<Rgba> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub settings_path: Option<PathBuf>,
    pub frame_rate: Option<u32>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn with_frame_rate(mut self, rate: u32) -> Self {
        self.frame_rate = Some(rate);
        self
    }

    /// Apply on top of a loaded config and re-validate
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(ref path) = self.settings_path {
            config.settings_path = Some(path.clone());
            config.source = ConfigSource::Cli;
        }
        if let Some(rate) = self.frame_rate {
            config.frame_rate = rate;
            config.source = ConfigSource::Cli;
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.frame_rate, 30);
        assert!(config.tooltip_small_font);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("tracevis/tracevis.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_config(
            r##"
[ui]
frame_rate = 60
tooltip_small_font = false
default_text_color = "#10203040"

[settings]
path = "/tmp/tracevis-settings.toml"
"##,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.frame_rate, 60);
        assert!(!config.tooltip_small_font);
        assert_eq!(config.default_text_color, Rgba::new(0x10, 0x20, 0x30, 0x40));
        assert_eq!(
            config.settings_path,
            Some(PathBuf::from("/tmp/tracevis-settings.toml"))
        );
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_config("[ui]\nframe_rate = 15\n");

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.frame_rate, 15);
        assert!(config.tooltip_small_font);
    }

    #[test]
    fn test_missing_file_graceful() {
        let config =
            load_config_with_env(Some(PathBuf::from("/nonexistent/tracevis.toml")), no_env)
                .unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert_eq!(config.config_file_path, None);
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_config("[ui\nframe_rate = ");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_frame_rate_out_of_range() {
        let file = write_config("[ui]\nframe_rate = 0\n");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_bad_color_rejected() {
        let file = write_config("[ui]\ndefault_text_color = \"red\"\n");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[ui]\nframe_rate = 60\ntooltip_small_font = true\n");
        let env: HashMap<&str, &str> = [
            ("TRACEVIS_FRAME_RATE", "120"),
            ("TRACEVIS_SMALL_FONT", "0"),
            ("TRACEVIS_SETTINGS", "/tmp/env-settings.toml"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.frame_rate, 120);
        assert!(!config.tooltip_small_font);
        assert_eq!(
            config.settings_path,
            Some(PathBuf::from("/tmp/env-settings.toml"))
        );
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_unparseable_env_is_ignored() {
        let config = load_config_with_env(None, |k| {
            (k == "TRACEVIS_FRAME_RATE").then(|| "fast".to_string())
        })
        .unwrap();

        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config =
            load_config_with_env(None, |k| (k == "TRACEVIS_FRAME_RATE").then(|| "10".into()))
                .unwrap();

        ConfigOverrides::new()
            .with_frame_rate(50)
            .with_settings_path(PathBuf::from("/tmp/cli.toml"))
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.frame_rate, 50);
        assert_eq!(config.settings_path, Some(PathBuf::from("/tmp/cli.toml")));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_cli_override_validated() {
        let mut config = AppConfig::default();
        let result = ConfigOverrides::new().with_frame_rate(1000).apply(&mut config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(parse_hex_color("00ff0080"), Some(Rgba::new(0, 255, 0, 0x80)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
