//! QR code encoding and decoding
//!
//! The pipeline only talks to the [`QrEncoder`] trait, so the encoding backend
//! is an injected handle rather than a global. [`QrcodeEncoder`] is the
//! default backend built on the `qrcode` crate; [`QrDecoder`] reads codes back
//! out of images.

mod decoder;
mod encoder;
mod surface;

pub use decoder::QrDecoder;
pub use encoder::QrcodeEncoder;
pub use surface::RasterSurface;

use crate::error::Result;
use async_trait::async_trait;

/// Quiet zone around every rendered code, in modules
pub const QUIET_MARGIN: u32 = 2;

/// Pixels per module used when the requested width cannot fit the symbol
pub const FALLBACK_SCALE: f64 = 4.0;

/// Geometry of a single render request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output width (and height) in pixels
    pub width: u32,
    /// Quiet zone in modules
    pub margin: u32,
}

impl RenderOptions {
    /// Square render of `width` pixels with the standard quiet margin
    pub fn with_width(width: u32) -> Self {
        Self {
            width,
            margin: QUIET_MARGIN,
        }
    }
}

/// Text-to-image encoder consumed by the pipeline
#[async_trait]
pub trait QrEncoder: Send + Sync {
    /// Paint `text` as a QR code onto `surface`, replacing its contents.
    async fn encode_to_surface(
        &self,
        surface: &mut RasterSurface,
        text: &str,
        options: RenderOptions,
    ) -> Result<()>;

    /// Render `text` as standalone SVG markup.
    async fn encode_to_string(&self, text: &str, options: RenderOptions) -> Result<String>;
}
