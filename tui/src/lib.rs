//! Tracevis TUI - Terminal frontend for tracevis
//!
//! This crate drives the core crate from a ratatui frame loop: one frame
//! thread owns the log collector and the color table, background loader
//! threads log through cloned handles, and every frame renders the merged
//! log, the color editor and a tooltip popup.
//!
//! # Architecture
//!
//! - **App**: Frame loop, input handling, shutdown persistence
//! - **Render**: `TextRenderer` implementation producing ratatui lines
//! - **Widgets**: Scrollable block of pre-styled lines
//! - **Loader**: Background file scanning threads
//! - **Log layer**: `tracing` events forwarded into the log panel

pub mod app;
pub mod loader;
pub mod log_layer;
pub mod render;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use log_layer::LogCollectorLayer;
pub use render::SpanRenderer;
