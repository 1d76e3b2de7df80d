//! qrprofile - profile form to QR code generator
//!
//! Collects a small personal profile (full name, email, phone, bio), keeps a
//! live QR preview of it up to date, and exports the code as PNG or SVG at a
//! chosen size.
//!
//! # Features
//!
//! - **Profile form**: field-by-field updates published over a `watch` channel
//! - **Live preview**: 256px render that never shows a superseded profile
//! - **Export**: PNG and SVG at 128/256/512/1024px, named after the profile
//! - **Read-back**: decode a profile QR image into its fields again
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use qrprofile::{
//!     ConsoleNotifier, DirectorySaver, ExportSize, Labels, ProfileField, ProfileForm,
//!     QrPipeline, QrcodeEncoder,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let form = ProfileForm::new();
//!     let pipeline = QrPipeline::new(
//!         form.subscribe(),
//!         Arc::new(QrcodeEncoder::new()),
//!         Arc::new(DirectorySaver::new("cards")),
//!         Arc::new(ConsoleNotifier),
//!         Labels::english(),
//!     );
//!
//!     form.update_field(ProfileField::FullName, "Sara");
//!     pipeline.select_size(ExportSize::Large)?;
//!     let outcome = pipeline.export_png().await?;
//!
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod qr;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{ExportOptions, LocaleOptions, LogRotation, LoggingOptions, ProfileQrConfig};
pub use labels::{LabelOverrides, Labels, Locale};
pub use output::blob::{Blob, BlobRegistry, ObjectUrl};
pub use output::{
    ConsoleNotifier, DirectorySaver, FileArtifact, FileSaver, Notifier, PNG_MIME, SVG_MIME,
    SavedFile,
};
pub use pipeline::{
    ExportFormat, ExportOutcome, ExportSize, LivePreview, PREVIEW_WIDTH, PreviewOutcome,
    PreviewSnapshot, QrPipeline,
};
pub use profile::{ProfileField, ProfileForm, ProfileRecord};
pub use qr::{QUIET_MARGIN, QrDecoder, QrEncoder, QrcodeEncoder, RasterSurface, RenderOptions};
