//! Editor palette
//!
//! Fixed colors for everything that is not an object type.

use crate::color::Rgb;

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub name: String,
    pub background: Rgb,
    pub grid: Rgb,
    pub panel: Rgb,
    pub text: Rgb,
    /// Fill behind the selected type button
    pub highlight: Rgb,
    /// Outline around placed objects
    pub outline: Rgb,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Rgb::new(40, 40, 40),
            grid: Rgb::new(80, 80, 80),
            panel: Rgb::new(60, 60, 60),
            text: Rgb::WHITE,
            highlight: Rgb::new(100, 100, 100),
            outline: Rgb::WHITE,
        }
    }

    /// Background as a linear wgpu clear color (the surface is sRGB)
    pub fn clear_color(&self) -> wgpu::Color {
        let channel = |c: u8| srgb_to_linear(c as f64 / 255.0);
        wgpu::Color {
            r: channel(self.background.r),
            g: channel(self.background.g),
            b: channel(self.background.b),
            a: 1.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-9);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn test_clear_color_is_opaque() {
        let clear = Theme::dark().clear_color();
        assert_eq!(clear.a, 1.0);
        assert!(clear.r > 0.0 && clear.r < 0.1);
    }
}
