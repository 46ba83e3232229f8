//! Semantic Color Table
//!
//! A fixed palette indexed by [`ColorId`]. Values start at the
//! compiled-in defaults, are overridden from the settings store at load,
//! and only entries changed through [`ColorTable::set`] are written back
//! at save. Untouched entries never reach the settings file.
//!
//! The table has no internal locking; it belongs to the frame thread.
//! Threads that color their log output read a [`SharedPalette`], which
//! the frame thread republishes after each edit.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::color::Rgba;
use crate::settings::SettingsStore;

/// Settings section holding one `u64` key per color
pub const COLORS_SECTION: &str = "$graph_colors$";

macro_rules! define_colors {
    ($($(#[$meta:meta])* $name:ident => $default:expr,)*) => {
        /// Semantic color identifiers, dense and zero-based
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ColorId {
            $($(#[$meta])* $name,)*
        }

        impl ColorId {
            /// Every id in index order
            pub const ALL: &'static [ColorId] = &[$(ColorId::$name,)*];

            pub const COUNT: usize = Self::ALL.len();

            /// Settings key and display name
            pub const fn name(self) -> &'static str {
                match self {
                    $(ColorId::$name => stringify!($name),)*
                }
            }

            pub const fn default_color(self) -> Rgba {
                match self {
                    $(ColorId::$name => $default,)*
                }
            }
        }
    };
}

define_colors! {
    /// Graph background
    GraphBk => Rgba::new(20, 20, 20, 255),
    /// Alternating row background
    GraphRowBk => Rgba::new(34, 34, 40, 255),
    /// Time axis tick marks
    TimeTick => Rgba::new(255, 255, 0, 255),
    /// Current cursor position
    CursorPos => Rgba::new(0, 255, 0, 255),
    /// Mouse hover position
    MousePos => Rgba::new(255, 0, 255, 255),
    MarkerA => Rgba::new(255, 200, 0, 255),
    MarkerB => Rgba::new(0, 200, 255, 255),
    /// Vertical blank lines
    VBlank => Rgba::new(128, 128, 255, 160),
    FtraceMarker => Rgba::new(255, 60, 60, 255),
    /// Event bar labels
    BarText => Rgba::new(230, 230, 230, 255),
    BarSelected => Rgba::new(0, 200, 0, 200),
    EventHover => Rgba::new(255, 255, 255, 120),
    /// Emphasized tooltip and log text
    BrightText => Rgba::new(255, 255, 255, 255),
    YellowText => Rgba::new(255, 255, 0, 255),
    RedText => Rgba::new(255, 80, 80, 255),
    GreenText => Rgba::new(120, 230, 120, 255),
    /// Secondary text
    DimText => Rgba::new(140, 140, 140, 255),
}

impl ColorId {
    /// Id at a dense index, `None` when out of range
    pub fn from_index(index: usize) -> Option<ColorId> {
        Self::ALL.get(index).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up an id by its settings name
    pub fn from_name(name: &str) -> Option<ColorId> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }
}

#[derive(Clone, Copy, Debug)]
struct ColorEntry {
    color: Rgba,
    modified: bool,
}

/// The palette: one value and dirty flag per [`ColorId`]
#[derive(Clone, Debug)]
pub struct ColorTable {
    entries: [ColorEntry; ColorId::COUNT],
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            entries: std::array::from_fn(|i| ColorEntry {
                color: ColorId::ALL[i].default_color(),
                modified: false,
            }),
        }
    }
}

impl ColorTable {
    /// Table holding the compiled-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Override defaults with whatever the store has
    ///
    /// Missing keys keep their default. Nothing is marked dirty.
    pub fn load<S: SettingsStore + ?Sized>(&mut self, store: &S) {
        let mut loaded = 0usize;

        for (id, entry) in ColorId::ALL.iter().zip(self.entries.iter_mut()) {
            if let Some(value) = store.get_u64(COLORS_SECTION, id.name()) {
                entry.color = Rgba(value as u32);
                loaded += 1;
            }
        }

        tracing::debug!(loaded, total = ColorId::COUNT, "Loaded color table");
    }

    /// Write every entry changed since load; returns how many were written
    pub fn save<S: SettingsStore + ?Sized>(&self, store: &mut S) -> usize {
        let mut written = 0usize;

        for (id, entry) in ColorId::ALL.iter().zip(self.entries.iter()) {
            if entry.modified {
                store.put_u64(COLORS_SECTION, id.name(), u64::from(entry.color.0));
                written += 1;
            }
        }

        tracing::debug!(written, "Saved color table");
        written
    }

    /// Stored color, with the alpha channel replaced when `alpha` is given
    pub fn get(&self, id: ColorId, alpha: Option<u8>) -> Rgba {
        let color = self.entries[id.index()].color;
        match alpha {
            Some(a) => color.with_alpha(a),
            None => color,
        }
    }

    /// Change a color; marks it dirty only if the value differs
    ///
    /// Returns whether anything changed.
    pub fn set(&mut self, id: ColorId, color: Rgba) -> bool {
        let entry = &mut self.entries[id.index()];
        if entry.color == color {
            return false;
        }

        entry.color = color;
        entry.modified = true;
        true
    }

    /// Restore the compiled-in default (dirty if that changes the value)
    pub fn reset(&mut self, id: ColorId) -> bool {
        self.set(id, id.default_color())
    }

    pub fn name(&self, id: ColorId) -> &'static str {
        id.name()
    }

    pub fn is_dirty(&self, id: ColorId) -> bool {
        self.entries[id.index()].modified
    }

    pub fn dirty_count(&self) -> usize {
        self.entries.iter().filter(|e| e.modified).count()
    }

    /// `(id, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (ColorId, Rgba)> + '_ {
        ColorId::ALL
            .iter()
            .zip(self.entries.iter())
            .map(|(id, entry)| (*id, entry.color))
    }
}

// ============================================================================
// Shared Palette
// ============================================================================

/// Copy of the table's colors readable from any thread
#[derive(Clone, Debug)]
pub struct SharedPalette {
    colors: Arc<RwLock<[Rgba; ColorId::COUNT]>>,
}

impl Default for SharedPalette {
    fn default() -> Self {
        Self {
            colors: Arc::new(RwLock::new(std::array::from_fn(|i| {
                ColorId::ALL[i].default_color()
            }))),
        }
    }
}

impl SharedPalette {
    pub fn new(table: &ColorTable) -> Self {
        let palette = Self::default();
        palette.publish(table);
        palette
    }

    pub fn get(&self, id: ColorId) -> Rgba {
        self.colors.read()[id.index()]
    }

    /// Replace every color with the table's current values
    pub fn publish(&self, table: &ColorTable) {
        let mut colors = self.colors.write();
        for (id, color) in table.iter() {
            colors[id.index()] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MemorySettings, SettingValue};

    #[test]
    fn test_ids_are_dense() {
        for (i, id) in ColorId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(ColorId::from_index(i), Some(*id));
            assert_eq!(ColorId::from_name(id.name()), Some(*id));
        }
        assert_eq!(ColorId::from_index(ColorId::COUNT), None);
    }

    #[test]
    fn test_names_are_identifiers() {
        assert_eq!(ColorId::TimeTick.name(), "TimeTick");
        assert_eq!(ColorTable::new().name(ColorId::BarText), "BarText");
    }

    #[test]
    fn test_get_alpha_override_does_not_mutate() {
        let table = ColorTable::new();
        let base = table.get(ColorId::TimeTick, None);

        let faded = table.get(ColorId::TimeTick, Some(0x40));
        assert_eq!(faded, base.with_alpha(0x40));
        assert_eq!(table.get(ColorId::TimeTick, None), base);
        assert!(!table.is_dirty(ColorId::TimeTick));
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let mut table = ColorTable::new();
        let current = table.get(ColorId::CursorPos, None);

        assert!(!table.set(ColorId::CursorPos, current));
        assert!(!table.is_dirty(ColorId::CursorPos));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut table = ColorTable::new();
        let red = Rgba::new(255, 0, 0, 255);

        assert!(table.set(ColorId::BarText, red));
        assert!(!table.set(ColorId::BarText, red));
        assert_eq!(table.dirty_count(), 1);
        assert_eq!(table.get(ColorId::BarText, None), red);
    }

    #[test]
    fn test_load_overrides_without_dirtying() {
        let mut store = MemorySettings::new();
        store.put_u64(COLORS_SECTION, "TimeTick", 0x1122_3344);

        let mut table = ColorTable::new();
        table.load(&store);

        assert_eq!(table.get(ColorId::TimeTick, None), Rgba(0x1122_3344));
        assert_eq!(
            table.get(ColorId::MarkerA, None),
            ColorId::MarkerA.default_color()
        );
        assert_eq!(table.dirty_count(), 0);
    }

    #[test]
    fn test_load_then_save_writes_nothing() {
        let mut store = MemorySettings::new();
        store.put_u64(COLORS_SECTION, "VBlank", 7);
        let writes_before = store.write_count();

        let mut table = ColorTable::new();
        table.load(&store);

        assert_eq!(table.save(&mut store), 0);
        assert_eq!(store.write_count(), writes_before);
    }

    #[test]
    fn test_save_writes_only_dirty_entries() {
        let mut store = MemorySettings::new();
        let mut table = ColorTable::new();
        let green = Rgba::new(0, 255, 0, 255);

        table.set(ColorId::MarkerB, green);
        assert_eq!(table.save(&mut store), 1);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(COLORS_SECTION, "MarkerB"),
            Some(&SettingValue::U64(u64::from(green.0)))
        );
    }

    #[test]
    fn test_reset_restores_default() {
        let mut table = ColorTable::new();
        table.set(ColorId::DimText, Rgba::BLACK);

        assert!(table.reset(ColorId::DimText));
        assert_eq!(
            table.get(ColorId::DimText, None),
            ColorId::DimText.default_color()
        );
        // Still dirty: the value changed since load
        assert!(table.is_dirty(ColorId::DimText));
    }

    #[test]
    fn test_shared_palette_follows_published_table() {
        let mut table = ColorTable::new();
        let palette = SharedPalette::new(&table);
        let reader = palette.clone();
        assert_eq!(reader.get(ColorId::RedText), ColorId::RedText.default_color());

        let custom = Rgba::new(1, 2, 3, 255);
        table.set(ColorId::RedText, custom);
        assert_eq!(reader.get(ColorId::RedText), ColorId::RedText.default_color());

        palette.publish(&table);
        assert_eq!(reader.get(ColorId::RedText), custom);
        assert_eq!(reader.get(ColorId::GreenText), ColorId::GreenText.default_color());
    }
}
