use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// A rectangle of the complex plane mapped onto the output image.
///
/// Pixel `(0, 0)` is the top-left corner of the image and corresponds to
/// `(xmin, ymax)`; x grows to the right and y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRegion {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl PlaneRegion {
    /// Create a region, rejecting empty, inverted or non-finite bounds.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> crate::Result<Self> {
        let region = Self {
            xmin,
            xmax,
            ymin,
            ymax,
        };
        region.validate()?;
        Ok(region)
    }

    /// Check the `min < max` invariant on both axes.
    ///
    /// Fields are public, so the renderer re-checks before every render.
    pub fn validate(&self) -> crate::Result<()> {
        let bounds = [self.xmin, self.xmax, self.ymin, self.ymax];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidRegion {
                reason: format!("bounds must be finite, got {self}"),
            });
        }
        if self.xmin >= self.xmax {
            return Err(CoreError::InvalidRegion {
                reason: format!("xmin ({}) must be < xmax ({})", self.xmin, self.xmax),
            });
        }
        if self.ymin >= self.ymax {
            return Err(CoreError::InvalidRegion {
                reason: format!("ymin ({}) must be < ymax ({})", self.ymin, self.ymax),
            });
        }
        Ok(())
    }

    /// Map pixel `(px, py)` of a `width × height` image to the plane.
    ///
    /// Uses the left/bottom edge of each pixel cell, so the last column
    /// sits one step short of `xmax` and the top row one step short of
    /// `ymax`.
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32, width: u32, height: u32) -> Complex {
        let w = width as f64;
        let h = height as f64;
        Complex::new(
            self.xmin + px as f64 * (self.xmax - self.xmin) / w,
            self.ymin + (h - py as f64 - 1.0) * (self.ymax - self.ymin) / h,
        )
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Magnification relative to the default 4-unit wide view.
    pub fn zoom_factor(&self) -> f64 {
        4.0 / self.width().max(self.height())
    }

    /// Bit-for-bit comparison, used to decide whether cached results apply.
    pub fn same_bits(&self, other: &Self) -> bool {
        self.xmin.to_bits() == other.xmin.to_bits()
            && self.xmax.to_bits() == other.xmax.to_bits()
            && self.ymin.to_bits() == other.ymin.to_bits()
            && self.ymax.to_bits() == other.ymax.to_bits()
    }
}

impl Default for PlaneRegion {
    fn default() -> Self {
        Self {
            xmin: -2.0,
            xmax: 2.0,
            ymin: -2.0,
            ymax: 2.0,
        }
    }
}

impl std::fmt::Display for PlaneRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] × [{}, {}]",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}
