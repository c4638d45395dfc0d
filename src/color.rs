//! RGB colors and `#RRGGBB` decoding

use crate::error::ColorError;

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a 6-digit hex string, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorError::Length(hex.to_string()));
        }
        // from_str_radix alone would accept a leading '+'
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::Digits(hex.to_string()));
        }

        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::Digits(hex.to_string()))
        };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
    }

    /// Pack as 0xRRGGBBAA, the vertex color layout the shaders unpack
    pub const fn to_rgba_u32(self, alpha: u8) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | alpha as u32
    }

    pub const fn opaque(self) -> u32 {
        self.to_rgba_u32(0xFF)
    }
}
