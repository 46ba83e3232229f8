//! Persisted Settings Store
//!
//! A sectioned key/value store with typed float, `u64` and 4-float vector
//! values. The color table and style settings persist through the
//! [`SettingsStore`] trait; which backend holds the data is up to the
//! frame driver.
//!
//! - [`MemorySettings`]: in-process map, used by tests and headless runs
//! - [`FileSettings`]: TOML document on disk, one table per section
//!
//! A getter returning `None` is a persistence miss, not an error: callers
//! keep their compiled-in default.

mod file;

use std::collections::BTreeMap;

use crate::color::Vec4;

pub use file::{FileSettings, SettingsError};

/// Typed get/put by `(section, key)`
pub trait SettingsStore {
    fn get_float(&self, section: &str, key: &str) -> Option<f32>;

    fn put_float(&mut self, section: &str, key: &str, value: f32);

    fn get_u64(&self, section: &str, key: &str) -> Option<u64>;

    fn put_u64(&mut self, section: &str, key: &str, value: u64);

    fn get_vec4(&self, section: &str, key: &str) -> Option<Vec4>;

    fn put_vec4(&mut self, section: &str, key: &str, value: Vec4);
}

/// A stored value of any supported type
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingValue {
    Float(f32),
    U64(u64),
    Vec4(Vec4),
}

/// In-memory settings, counting every put
#[derive(Clone, Debug, Default)]
pub struct MemorySettings {
    values: BTreeMap<(String, String), SettingValue>,
    writes: usize,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&SettingValue> {
        self.values.get(&(section.to_owned(), key.to_owned()))
    }

    /// Number of put calls since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn put(&mut self, section: &str, key: &str, value: SettingValue) {
        self.writes += 1;
        self.values.insert((section.to_owned(), key.to_owned()), value);
    }
}

impl SettingsStore for MemorySettings {
    fn get_float(&self, section: &str, key: &str) -> Option<f32> {
        match self.get(section, key)? {
            SettingValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn put_float(&mut self, section: &str, key: &str, value: f32) {
        self.put(section, key, SettingValue::Float(value));
    }

    fn get_u64(&self, section: &str, key: &str) -> Option<u64> {
        match self.get(section, key)? {
            SettingValue::U64(v) => Some(*v),
            _ => None,
        }
    }

    fn put_u64(&mut self, section: &str, key: &str, value: u64) {
        self.put(section, key, SettingValue::U64(value));
    }

    fn get_vec4(&self, section: &str, key: &str) -> Option<Vec4> {
        match self.get(section, key)? {
            SettingValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    fn put_vec4(&mut self, section: &str, key: &str, value: Vec4) {
        self.put(section, key, SettingValue::Vec4(value));
    }
}
