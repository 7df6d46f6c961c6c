use crate::color::Rgb;

/// An RGB pixel buffer representing a rendered image.
///
/// Row 0 is the top of the image, i.e. the maximum y of the region.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data, 3 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl RenderBuffer {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * Self::BYTES_PER_PIXEL],
        }
    }

    /// Byte length of one row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = y as usize * self.stride() + x as usize * Self::BYTES_PER_PIXEL;
        Rgb::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let i = y as usize * self.stride() + x as usize * Self::BYTES_PER_PIXEL;
        self.pixels[i..i + Self::BYTES_PER_PIXEL].copy_from_slice(&color.to_array());
    }
}
