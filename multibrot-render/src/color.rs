use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel `a + (b − a)·t`, truncated toward zero.
    ///
    /// Out-of-range and NaN results saturate (NaN becomes 0).
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t) as u8;
        Self {
            r: channel(a.r, b.r),
            g: channel(a.g, b.g),
            b: channel(a.b, b.b),
        }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(110, 220, 0);
        assert_eq!(Rgb::lerp(a, b, 0.0), a);
        assert_eq!(Rgb::lerp(a, b, 1.0), b);
    }

    #[test]
    fn lerp_truncates() {
        // 0 + 255 * 0.5 = 127.5 → 127
        assert_eq!(Rgb::lerp(Rgb::BLACK, Rgb::WHITE, 0.5), Rgb::new(127, 127, 127));
        // 255 + (0 - 255) * 0.5 = 127.5 → 127
        assert_eq!(Rgb::lerp(Rgb::WHITE, Rgb::BLACK, 0.5), Rgb::new(127, 127, 127));
    }

    #[test]
    fn lerp_nan_saturates_to_zero() {
        assert_eq!(Rgb::lerp(Rgb::BLACK, Rgb::WHITE, f64::NAN), Rgb::BLACK);
        assert_eq!(Rgb::lerp(Rgb::WHITE, Rgb::WHITE, f64::NAN), Rgb::BLACK);
    }
}
