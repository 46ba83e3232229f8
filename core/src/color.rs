//! Packed Colors
//!
//! `Rgba` is a 32-bit color using the packed layout shared with the
//! settings file and the rich-text escape bytes: red in the low byte,
//! alpha in the high byte (`A << 24 | B << 16 | G << 8 | R`).
//!
//! The HSV helpers produce the hue-spread colors used for graph rows and
//! the picker swatches.

use std::fmt;

/// Bit offset of the alpha channel
pub const ALPHA_SHIFT: u32 = 24;

/// Mask selecting the alpha channel
pub const ALPHA_MASK: u32 = 0xff00_0000;

/// Float RGBA, each component in 0.0..=1.0
pub type Vec4 = [f32; 4];

/// A packed 32-bit RGBA color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const TRANSPARENT: Rgba = Rgba(0);

    /// Pack four channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | r as u32)
    }

    /// Build from the 4 raw bytes of a color escape (R, G, B, A order)
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// The 4 channel bytes in R, G, B, A order
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    pub const fn r(self) -> u8 {
        self.0 as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn a(self) -> u8 {
        (self.0 >> ALPHA_SHIFT) as u8
    }

    /// Same color with the alpha channel replaced
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & !ALPHA_MASK) | (alpha as u32) << ALPHA_SHIFT)
    }

    pub fn to_vec4(self) -> Vec4 {
        const INV: f32 = 1.0 / 255.0;
        [
            f32::from(self.r()) * INV,
            f32::from(self.g()) * INV,
            f32::from(self.b()) * INV,
            f32::from(self.a()) * INV,
        ]
    }

    pub fn from_vec4(v: Vec4) -> Self {
        Self::new(unit_to_byte(v[0]), unit_to_byte(v[1]), unit_to_byte(v[2]), unit_to_byte(v[3]))
    }

    /// Convert hue/saturation/value (all 0.0..=1.0) to a packed color
    pub fn from_hsv(h: f32, s: f32, v: f32, a: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(h, s, v);
        Self::from_vec4([r, g, b, a])
    }

    /// Hue, saturation and value of this color
    pub fn to_hsv(self) -> (f32, f32, f32) {
        let [r, g, b, _] = self.to_vec4();
        rgb_to_hsv(r, g, b)
    }

    /// Deterministic color for a hash: hue from the low 24 bits,
    /// brightness from the top byte
    pub fn from_hash(hashval: u32) -> Self {
        let h = (hashval & 0x00ff_ffff) as f32 / 16_777_215.0;
        let v = (hashval >> 24) as f32 / (2.0 * 255.0) + 0.5;

        Self::from_hsv(h, 0.9, v, 1.0)
    }

    /// Opposite hue with the same saturation and value, fully opaque
    #[must_use]
    pub fn complement(self) -> Self {
        let (mut h, s, v) = self.to_hsv();

        h += 0.5;
        if h > 1.0 {
            h -= 1.0;
        }

        Self::from_hsv(h, s, v, 1.0)
    }
}

impl From<u32> for Rgba {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Rgba> for u32 {
    fn from(color: Rgba) -> Self {
        color.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

fn unit_to_byte(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (v, v, v);
    }

    let h = (h % 1.0) * 6.0;
    let i = h as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

fn rgb_to_hsv(mut r: f32, mut g: f32, mut b: f32) -> (f32, f32, f32) {
    let mut k = 0.0_f32;

    if g < b {
        std::mem::swap(&mut g, &mut b);
        k = -1.0;
    }
    if r < g {
        std::mem::swap(&mut r, &mut g);
        k = -2.0 / 6.0 - k;
    }

    let chroma = r - g.min(b);
    let h = (k + (g - b) / (6.0 * chroma + 1e-20)).abs();
    let s = chroma / (r + 1e-20);

    (h, s, r)
}

// ============================================================================
// Color Picker
// ============================================================================

/// Number of hue swatches offered by the picker
pub const SWATCH_COUNT: usize = 64;

/// One pickable hue
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub color: Rgba,
    /// `%08x` label shown on the swatch
    pub label: String,
}

/// A 64-hue palette at adjustable saturation, value and alpha
#[derive(Clone, Debug)]
pub struct ColorPicker {
    pub saturation: f32,
    pub value: f32,
    pub alpha: f32,
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self {
            saturation: 0.9,
            value: 0.9,
            alpha: 1.0,
        }
    }
}

impl ColorPicker {
    /// Color of swatch `index` (hue = index / 63)
    pub fn swatch_color(&self, index: usize) -> Rgba {
        let h = index as f32 / (SWATCH_COUNT - 1) as f32;
        Rgba::from_hsv(h, self.saturation, self.value, self.alpha)
    }

    pub fn swatches(&self) -> Vec<Swatch> {
        (0..SWATCH_COUNT)
            .map(|i| {
                let color = self.swatch_color(i);
                Swatch {
                    color,
                    label: color.to_string(),
                }
            })
            .collect()
    }

    /// Pick a swatch, returning `None` for an out-of-range index
    pub fn select(&self, index: usize) -> Option<Rgba> {
        (index < SWATCH_COUNT).then(|| self.swatch_color(index))
    }

    /// Nudge saturation, value or alpha, clamped to 0.0..=1.0
    pub fn adjust(&mut self, channel: PickerChannel, delta: f32) {
        let slot = match channel {
            PickerChannel::Saturation => &mut self.saturation,
            PickerChannel::Value => &mut self.value,
            PickerChannel::Alpha => &mut self.alpha,
        };
        *slot = (*slot + delta).clamp(0.0, 1.0);
    }
}

/// Adjustable picker slider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerChannel {
    Saturation,
    Value,
    Alpha,
}
