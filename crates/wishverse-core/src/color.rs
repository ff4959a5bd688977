//! Minimal RGB color handling for `#rrggbb` strings used in cake configs.
//!
//! Channels are sRGB-encoded, normalised to [0, 1]. Mixing happens in that
//! space; the shader converts to linear before lighting.

use crate::constants::DEFAULT_CAKE_COLOR;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const ORANGE: Rgb = Rgb::new(1.0, 0.647, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`, case-insensitive.
    pub fn parse(hex: &str) -> Option<Rgb> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb::from_u8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse with a fallback to the default cake color.
    pub fn parse_or_default(hex: &str) -> Rgb {
        match Rgb::parse(hex) {
            Some(c) => c,
            None => {
                log::warn!("[color] unparsable color {:?}, using {}", hex, DEFAULT_CAKE_COLOR);
                Rgb::parse(DEFAULT_CAKE_COLOR).unwrap_or(Rgb::WHITE)
            }
        }
    }

    /// sRGB bytes to normalised sRGB floats (no linearisation).
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn scaled(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn add(self, other: Rgb) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_hex(self) -> String {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
    }

    pub fn to_array4(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }
}
