//! Compute Ring Names
//!
//! Compute rings are named `comp_<major>.<minor>.<patch>` with major in
//! 1..=2, minor in 0..=3 and patch in 0..=8. Each name maps to a dense
//! index in 0..72 so per-ring state can live in a flat array.

use std::fmt;

const PREFIX: &str = "comp_";

/// Number of distinct ring names
pub const COMP_COUNT: u32 = 72;

/// A parsed `comp_a.b.c` ring identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompVersion {
    major: u8,
    minor: u8,
    patch: u8,
}

impl CompVersion {
    /// Build from fields, `None` if any is out of range
    pub fn new(major: u8, minor: u8, patch: u8) -> Option<Self> {
        ((1..=2).contains(&major) && minor <= 3 && patch <= 8).then_some(Self {
            major,
            minor,
            patch,
        })
    }

    /// Parse the leading `comp_[1-2].[0-3].[0-8]` of `s`
    ///
    /// Anything after the patch digit is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let b = s.strip_prefix(PREFIX)?.as_bytes();
        if b.len() < 5 || b[1] != b'.' || b[3] != b'.' {
            return None;
        }
        if !matches!(b[0], b'1' | b'2') || !b[2].is_ascii_digit() || !b[4].is_ascii_digit() {
            return None;
        }

        Self::new(b[0] - b'0', b[2] - b'0', b[4] - b'0')
    }

    /// Decode a dense index, `None` when `index >= COMP_COUNT`
    pub fn from_index(index: u32) -> Option<Self> {
        if index >= COMP_COUNT {
            return None;
        }

        Some(Self {
            major: (index / 36 + 1) as u8,
            minor: (index / 9 % 4) as u8,
            patch: (index % 9) as u8,
        })
    }

    pub fn index(self) -> u32 {
        u32::from(self.major - 1) * 36 + u32::from(self.minor) * 9 + u32::from(self.patch)
    }

    pub fn major(self) -> u8 {
        self.major
    }

    pub fn minor(self) -> u8 {
        self.minor
    }

    pub fn patch(self) -> u8 {
        self.patch
    }
}

impl fmt::Display for CompVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Ring name for a dense index, empty when out of range
pub fn comp_name(index: u32) -> String {
    CompVersion::from_index(index)
        .map(|v| v.to_string())
        .unwrap_or_default()
}
