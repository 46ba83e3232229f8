//! Tracing Layer for the Log Panel
//!
//! Forwards `tracing` events into the [`LogCollector`](tracevis_core::LogCollector)
//! through a [`Logger`] handle, so diagnostics from any thread show up in
//! the on-screen log with the level word colored.
//!
//! Colors come from a [`SharedPalette`], so edits made in the color panel
//! apply to later events. Message, field and target text is passed
//! through [`replace_escapes`] before it joins the entry.

use std::fmt::{self, Write};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;
use tracevis_core::{replace_escapes, ColorId, Logger, RichText, SharedPalette};

use crate::theme;

/// `tracing_subscriber` layer appending one entry per event
#[derive(Clone, Debug)]
pub struct LogCollectorLayer {
    logger: Logger,
    palette: SharedPalette,
    with_target: bool,
}

impl LogCollectorLayer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            palette: SharedPalette::default(),
            with_target: false,
        }
    }

    /// Color entries from `palette` instead of the compiled-in defaults
    pub fn with_palette(mut self, palette: SharedPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Prefix messages with the event target
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

impl<S: Subscriber> Layer<S> for LogCollectorLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.logger.is_closed() {
            return;
        }

        let meta = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let text = self.palette.get(ColorId::BarText);
        let dim = self.palette.get(ColorId::DimText);

        let level = theme::level_color(meta.level(), &self.palette);

        let mut entry = RichText::new();
        entry
            .push_colored(level, meta.level().as_str())
            .push_color(text)
            .push_str(" ");
        if self.with_target {
            entry
                .push_colored(dim, &replace_escapes(meta.target()))
                .push_color(text)
                .push_str(": ");
        }
        entry.push_str(&replace_escapes(&visitor.message));
        if !visitor.fields.is_empty() {
            entry.push_colored(dim, &replace_escapes(&visitor.fields));
        }

        self.logger.append(entry);
    }
}

/// Collects the `message` field and renders the rest as ` key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
