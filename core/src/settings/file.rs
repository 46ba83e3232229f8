//! TOML-Backed Settings File
//!
//! Each section is a top-level table, so section names such as
//! `$graph_colors$` appear as quoted table headers:
//!
//! ```toml
//! ["$graph_colors$"]
//! TimeTick = 4294967040
//!
//! ["$imgui_settings$"]
//! win_scale = 1.25
//! WindowBg = [0.06, 0.06, 0.06, 1.0]
//! ```
//!
//! `u64` values above `i64::MAX` do not fit a TOML integer and are stored
//! as decimal strings.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::{Table, Value};

use super::SettingsStore;
use crate::color::Vec4;

/// Errors from reading or writing the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file
    #[error("Failed to read settings file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid TOML
    #[error("Failed to parse settings file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The document could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Failed to write the settings file
    #[error("Failed to write settings file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Settings persisted to a TOML file
///
/// Puts only touch the in-memory document; [`flush`](Self::flush) writes
/// it back, and only when some value actually changed.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    doc: Table,
    dirty: bool,
}

impl FileSettings {
    /// Load `path`, starting empty when the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();

        let doc = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
                path: path.clone(),
                source,
            })?;
            let doc: Table = toml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;

            tracing::info!(path = %path.display(), sections = doc.len(), "Loaded settings");
            doc
        } else {
            tracing::debug!(path = %path.display(), "Settings file not found, starting empty");
            Table::new()
        };

        Ok(Self {
            path,
            doc,
            dirty: false,
        })
    }

    /// An empty store that will be written to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            doc: Table::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a put changed the document since load or the last flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document if anything changed
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or the file
    /// (or its parent directory) cannot be written.
    pub fn flush(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }

        let content = toml::to_string(&self.doc)?;

        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, content).map_err(write_err)?;

        self.dirty = false;
        tracing::info!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    fn value(&self, section: &str, key: &str) -> Option<&Value> {
        self.doc.get(section)?.as_table()?.get(key)
    }

    fn put_value(&mut self, section: &str, key: &str, value: Value) {
        let slot = self
            .doc
            .entry(section.to_owned())
            .or_insert(Value::Table(Table::new()));
        if !slot.is_table() {
            *slot = Value::Table(Table::new());
        }

        if let Value::Table(table) = slot {
            if table.get(key) != Some(&value) {
                table.insert(key.to_owned(), value);
                self.dirty = true;
            }
        }
    }
}

fn as_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Float(f) => Some(*f as f32),
        Value::Integer(i) => Some(*i as f32),
        _ => None,
    }
}

impl SettingsStore for FileSettings {
    fn get_float(&self, section: &str, key: &str) -> Option<f32> {
        as_f32(self.value(section, key)?)
    }

    fn put_float(&mut self, section: &str, key: &str, value: f32) {
        self.put_value(section, key, Value::Float(f64::from(value)));
    }

    fn get_u64(&self, section: &str, key: &str) -> Option<u64> {
        match self.value(section, key)? {
            Value::Integer(i) => u64::try_from(*i).ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn put_u64(&mut self, section: &str, key: &str, value: u64) {
        let value = match i64::try_from(value) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::String(value.to_string()),
        };
        self.put_value(section, key, value);
    }

    fn get_vec4(&self, section: &str, key: &str) -> Option<Vec4> {
        let array = self.value(section, key)?.as_array()?;
        if array.len() != 4 {
            return None;
        }

        let mut out = [0.0; 4];
        for (slot, value) in out.iter_mut().zip(array) {
            *slot = as_f32(value)?;
        }
        Some(out)
    }

    fn put_vec4(&mut self, section: &str, key: &str, value: Vec4) {
        let array = value.iter().map(|v| Value::Float(f64::from(*v))).collect();
        self.put_value(section, key, Value::Array(array));
    }
}
