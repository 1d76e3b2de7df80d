//! Error types for qrprofile operations

use thiserror::Error;

/// Result type alias using qrprofile's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrprofile operations
#[derive(Error, Debug)]
pub enum Error {
    /// QR code encoding failed (e.g. the text does not fit in any QR version)
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Decoded text does not follow the labelled profile layout
    #[error("Invalid profile text: {0}")]
    InvalidProfileText(String),

    /// Field identifier outside fullName/email/phone/bio
    #[error("Unknown profile field '{0}'")]
    UnknownField(String),

    /// Export size outside the supported set
    #[error("Unsupported export size '{0}', expected 128, 256, 512 or 1024")]
    InvalidExportSize(String),

    /// Size selection attempted while the profile is empty
    #[error("Export size selection is disabled while the profile is empty")]
    SelectionDisabled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Error::QrEncode(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
