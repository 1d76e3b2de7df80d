//! Raster target for encoded QR codes

use crate::error::Result;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;

/// An in-memory grayscale canvas.
///
/// A fresh surface is empty (0x0); encoders resize it to the rendered width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    image: GrayImage,
}

impl RasterSurface {
    /// Empty surface
    pub fn new() -> Self {
        Self {
            image: GrayImage::new(0, 0),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True when nothing has been painted
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Current pixels
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Replace the pixels wholesale
    pub fn replace(&mut self, image: GrayImage) {
        self.image = image;
    }

    /// Drop everything painted so far
    pub fn clear(&mut self) {
        self.image = GrayImage::new(0, 0);
    }

    /// Serialise the surface as PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(self.image.clone())
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_new_surface_is_empty() {
        assert!(RasterSurface::new().is_empty());
    }

    #[test]
    fn test_clear_after_replace() {
        let mut surface = RasterSurface::new();
        surface.replace(GrayImage::from_pixel(8, 8, Luma([255])));
        assert_eq!(surface.width(), 8);
        surface.clear();
        assert!(surface.is_empty());
    }

    #[test]
    fn test_png_signature() {
        let mut surface = RasterSurface::new();
        surface.replace(GrayImage::from_pixel(4, 4, Luma([0])));
        let png = surface.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
