//! Tracevis Core - Frame-Driven Logging, Rich Text and Colors
//!
//! This crate holds the viewer's diagnostics and presentation plumbing,
//! independent of any terminal or GUI toolkit. Frontends plug in through
//! [`TextRenderer`] and persist user edits through [`SettingsStore`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   Logger::append   ┌────────────────────────────┐
//! │ Loader / worker     │ ─────────────────▶ │ pending buffer (Mutex)     │
//! │ threads             │                    └─────────────┬──────────────┘
//! └────────────────────┘                                  │ merge(), once
//!                                                         ▼ per frame
//! ┌────────────────────┐   append (no lock)  ┌────────────────────────────┐
//! │ Frame thread        │ ─────────────────▶ │ LogCollector main buffer   │
//! └─────────┬──────────┘                    └─────────────┬──────────────┘
//!           │ set / add                                   │ snapshot()
//!           ▼                                             ▼
//! ┌────────────────────┐                    ┌────────────────────────────┐
//! │ TooltipAccumulator  │ ── consume ──────▶ │ render_rich_text           │
//! └────────────────────┘                    │  (Segments → TextRenderer) │
//!                                           └────────────────────────────┘
//!           ColorTable ◀── load / save ──▶ SettingsStore (FileSettings)
//! ```
//!
//! # Key Types
//!
//! - [`LogCollector`]: frame-thread owner of the log, merges background entries
//! - [`Logger`]: cloneable handle any thread can log through
//! - [`RichText`]: byte string with embedded color escapes
//! - [`ColorTable`]: semantic palette with change tracking
//! - [`TooltipAccumulator`]: per-frame tooltip staging

pub mod color;
pub mod colors;
pub mod config;
pub mod format;
pub mod log;
pub mod render;
pub mod rich_text;
pub mod settings;
pub mod strings;
pub mod style;
pub mod test_utils;
pub mod tooltip;
pub mod version;

pub use color::{ColorPicker, PickerChannel, Rgba, Swatch, Vec4};
pub use colors::{ColorId, ColorTable, SharedPalette};
pub use config::{AppConfig, ConfigError, ConfigOverrides, ConfigSource};
pub use format::try_format;
pub use log::{LogCollector, LogEntry, Logger};
pub use render::TextRenderer;
pub use rich_text::{render_rich_text, replace_escapes, RichText, Segment, Segments};
pub use settings::{FileSettings, MemorySettings, SettingValue, SettingsError, SettingsStore};
pub use style::{StyleColor, StyleSettings};
pub use tooltip::TooltipAccumulator;
pub use version::CompVersion;
