//! QR code decoder using rqrr

use crate::error::{Error, Result};
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// QR code decoder
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode the text of the first QR code in an image
    pub fn decode(&self, img: &DynamicImage) -> Result<String> {
        self.decode_gray(&img.to_luma8())
    }

    /// Open an image file (PNG, JPEG, ...) and decode it
    pub fn decode_file(&self, path: &Path) -> Result<String> {
        let img = image::open(path)?;
        self.decode(&img)
    }

    /// Decode an encoded image held in memory
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<String> {
        let img = image::load_from_memory(bytes)?;
        self.decode(&img)
    }

    /// Decode a QR code from a grayscale image
    pub fn decode_gray(&self, img: &GrayImage) -> Result<String> {
        let mut prepared = rqrr::PreparedImage::prepare(img.clone());

        let grids = prepared.detect_grids();

        // Take the first detected QR code
        let Some(grid) = grids.first() else {
            return Err(Error::NoQrCodeFound);
        };

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );

                Ok(content)
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}
