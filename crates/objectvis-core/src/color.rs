//! RGBA colors as stored in per-point color buffers.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Alpha used for selected objects when a selection is shown.
pub const DEFAULT_SELECTION_OPACITY: u8 = 128;

/// Alpha used for non-selected objects when a selection is shown.
pub const DEFAULT_CONTEXT_OPACITY: u8 = 8;

/// Alpha of class colors drawn behind a selection.
pub const TRANSPARENT_ALPHA: u8 = 32;

/// Color of explicitly selected objects.
pub const SELECTED_COLOR: Rgba = Rgba::new(255, 0, 0, 255);

/// An 8-bit RGBA color; one entry per point in a color buffer.
#[repr(C)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Creates an opaque color from float channels in `[0, 1]`.
    pub fn from_rgb_f64(r: f64, g: f64, b: f64) -> Self {
        Self::rgb(channel_to_u8(r), channel_to_u8(g), channel_to_u8(b))
    }

    /// Creates an opaque color from a float RGB vector in `[0, 1]`.
    pub fn from_vec3(c: Vec3) -> Self {
        Self::from_rgb_f64(f64::from(c.x), f64::from(c.y), f64::from(c.z))
    }

    /// Returns the RGB channels as floats in `[0, 1]`.
    pub fn rgb_f64(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }
}

/// Converts a `[0, 1]` channel to a byte, truncating like an integer color cast.
pub fn channel_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_alpha_keeps_rgb() {
        let c = Rgba::rgb(10, 20, 30).with_alpha(7);
        assert_eq!(c, Rgba::new(10, 20, 30, 7));
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(Rgba::from_rgb_f64(1.0, 0.0, 0.5), Rgba::rgb(255, 0, 127));
        assert_eq!(Rgba::from_rgb_f64(2.0, -1.0, 0.0), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::from_vec3(Vec3::new(0.0, 1.0, 0.0)), Rgba::rgb(0, 255, 0));
    }

    #[test]
    fn test_byte_layout() {
        let colors = [Rgba::new(1, 2, 3, 4), Rgba::new(5, 6, 7, 8)];
        let bytes: &[u8] = bytemuck::cast_slice(&colors);
        assert_eq!(bytes, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
