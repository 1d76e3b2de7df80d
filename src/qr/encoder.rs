//! QR code encoder backed by the `qrcode` crate

use crate::error::Result;
use crate::qr::{FALLBACK_SCALE, QrEncoder, RasterSurface, RenderOptions};
use async_trait::async_trait;
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::fmt::Write as _;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// QR code encoder
///
/// Modules are painted by hand rather than through `qrcode`'s renderers so
/// the output is exactly `width` pixels wide with a `margin`-module quiet zone
/// at any scale, including fractional ones.
pub struct QrcodeEncoder {
    /// Error correction level
    ecc_level: EcLevel,
}

impl QrcodeEncoder {
    /// Create a new QR encoder with default settings (Medium ECC)
    pub fn new() -> Self {
        Self {
            ecc_level: EcLevel::M,
        }
    }

    /// Create a new QR encoder with a specific error correction level
    pub fn with_ecc_level(ecc_level: EcLevel) -> Self {
        Self { ecc_level }
    }

    fn modules(&self, text: &str) -> Result<ModuleGrid> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ecc_level)?;

        Ok(ModuleGrid {
            size: code.width(),
            colors: code.to_colors(),
        })
    }

    /// Encode text into a grayscale image of `options.width` pixels
    pub fn render_image(&self, text: &str, options: RenderOptions) -> Result<GrayImage> {
        Ok(self.modules(text)?.rasterize(options))
    }

    /// Encode text into SVG markup
    pub fn render_svg(&self, text: &str, options: RenderOptions) -> Result<String> {
        Ok(self.modules(text)?.to_svg(options))
    }
}

impl Default for QrcodeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QrEncoder for QrcodeEncoder {
    async fn encode_to_surface(
        &self,
        surface: &mut RasterSurface,
        text: &str,
        options: RenderOptions,
    ) -> Result<()> {
        let image = self.render_image(text, options)?;
        tracing::trace!(
            width = image.width(),
            margin = options.margin,
            "QR code painted onto surface"
        );
        surface.replace(image);
        Ok(())
    }

    async fn encode_to_string(&self, text: &str, options: RenderOptions) -> Result<String> {
        self.render_svg(text, options)
    }
}

/// Square grid of dark/light modules, row-major
struct ModuleGrid {
    size: usize,
    colors: Vec<Color>,
}

impl ModuleGrid {
    fn is_dark(&self, row: usize, col: usize) -> bool {
        self.colors[row * self.size + col] == Color::Dark
    }

    /// Side length of the symbol plus both quiet zones, in modules
    fn outer_size(&self, margin: u32) -> f64 {
        self.size as f64 + 2.0 * margin as f64
    }

    /// Pixels per module and image side: stretch to exactly `width` when the
    /// symbol fits, otherwise fall back to a fixed scale.
    fn layout(&self, options: RenderOptions) -> (f64, u32) {
        let outer = self.outer_size(options.margin);
        if options.width as f64 >= outer {
            (options.width as f64 / outer, options.width)
        } else {
            (FALLBACK_SCALE, (outer * FALLBACK_SCALE).floor() as u32)
        }
    }

    fn rasterize(&self, options: RenderOptions) -> GrayImage {
        let (scale, side) = self.layout(options);
        let offset = options.margin as f64 * scale;
        let last = self.size - 1;

        let to_module = |px: u32| -> Option<usize> {
            let px = px as f64;
            if px < offset || px >= side as f64 - offset {
                return None;
            }
            Some((((px - offset) / scale).floor() as usize).min(last))
        };

        GrayImage::from_fn(side, side, |x, y| match (to_module(y), to_module(x)) {
            (Some(row), Some(col)) if self.is_dark(row, col) => DARK,
            _ => LIGHT,
        })
    }

    fn to_svg(&self, options: RenderOptions) -> String {
        let outer = self.size as u32 + 2 * options.margin;
        let mut path = String::new();

        for row in 0..self.size {
            let mut col = 0;
            while col < self.size {
                if !self.is_dark(row, col) {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < self.size && self.is_dark(row, col) {
                    col += 1;
                }
                let x = start as u32 + options.margin;
                let y = row as u32 + options.margin;
                let _ = write!(path, "M{x} {y}.5h{}", col - start);
            }
        }

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{w}\" \
             viewBox=\"0 0 {outer} {outer}\" shape-rendering=\"crispEdges\">\
             <path fill=\"#ffffff\" d=\"M0 0h{outer}v{outer}H0z\"/>\
             <path stroke=\"#000000\" d=\"{path}\"/></svg>\n",
            w = options.width,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_image_width_matches_request() {
        let encoder = QrcodeEncoder::new();
        // Byte-mode payloads landing on versions 1, 7 and 10 at EC level M.
        let cases = [
            ("Full Name: Sara".to_string(), 21),
            ("x".repeat(111), 45),
            ("x".repeat(200), 57),
        ];
        for (text, modules) in &cases {
            assert_eq!(encoder.modules(text).unwrap().size, *modules);
            for width in [128, 256, 512, 1024] {
                let image = encoder
                    .render_image(text, RenderOptions::with_width(width))
                    .unwrap();
                assert_eq!(image.dimensions(), (width, width), "{modules} modules");
            }
        }
    }

    #[test]
    fn test_version_7_keeps_symbol_inside_margins() {
        let encoder = QrcodeEncoder::new();
        let image = encoder
            .render_image(&"x".repeat(111), RenderOptions::with_width(512))
            .unwrap();
        // 45 modules + 4 margin: 512 / 49 is just over 10.4px per module.
        assert_eq!(image.get_pixel(21, 21), &DARK);
        assert_eq!(image.get_pixel(20, 20), &LIGHT);
        assert_eq!(image.get_pixel(492, 492), &LIGHT);
        assert_eq!(image.get_pixel(511, 511), &LIGHT);
    }

    #[test]
    fn test_quiet_margin_is_light() {
        let encoder = QrcodeEncoder::new();
        let image = encoder
            .render_image("margin check", RenderOptions::with_width(256))
            .unwrap();
        // 21 modules + 4 margin at 256px is > 10px per module, so 2 modules > 20px.
        for i in 0..256 {
            for edge in 0..20 {
                assert_eq!(image.get_pixel(i, edge), &LIGHT);
                assert_eq!(image.get_pixel(edge, i), &LIGHT);
            }
        }
    }

    #[test]
    fn test_top_left_finder_is_dark() {
        let encoder = QrcodeEncoder::new();
        let image = encoder
            .render_image("finder", RenderOptions::with_width(250))
            .unwrap();
        // Version 1: 25 modules outer, exactly 10px per module; margin ends at 20.
        assert_eq!(image.get_pixel(20, 20), &DARK);
        assert_eq!(image.get_pixel(19, 19), &LIGHT);
    }

    #[test]
    fn test_small_width_falls_back_to_fixed_scale() {
        let encoder = QrcodeEncoder::new();
        let image = encoder
            .render_image("tiny", RenderOptions::with_width(10))
            .unwrap();
        assert_eq!(image.width(), 25 * 4);
    }

    #[test]
    fn test_svg_dimensions_and_viewbox() {
        let encoder = QrcodeEncoder::new();
        let svg = encoder
            .render_svg("svg check", RenderOptions::with_width(512))
            .unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"512\" height=\"512\""));
        assert!(svg.contains("viewBox=\"0 0 25 25\""));
        assert!(svg.contains("M2 2.5h7"), "finder pattern row missing: {svg}");
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_oversized_text_fails() {
        let encoder = QrcodeEncoder::new();
        let text = "x".repeat(4000);
        let err = encoder
            .render_image(&text, RenderOptions::with_width(256))
            .unwrap_err();
        assert!(matches!(err, Error::QrEncode(_)));
    }

    #[test]
    fn test_round_trip() {
        use crate::qr::QrDecoder;

        let encoder = QrcodeEncoder::new();
        let decoder = QrDecoder::new();

        let original = "Full Name: Sara\nEmail: \nPhone: \nBio: ";
        let image = encoder
            .render_image(original, RenderOptions::with_width(512))
            .unwrap();
        let decoded = decoder.decode_gray(&image).unwrap();

        assert_eq!(decoded, original);
    }
}
