//! On-demand PNG and SVG export

use super::{ExportSize, QrPipeline};
use crate::error::{Error, Result};
use crate::output::blob::Blob;
use crate::output::{FileArtifact, PNG_MIME, SVG_MIME, SavedFile};
use crate::qr::{RasterSurface, RenderOptions};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base name used when the profile has no full name
pub const FALLBACK_BASE_NAME: &str = "qrcode";

/// Exported file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Raster image
    Png,
    /// Vector image
    Svg,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    /// Content type of the exported file
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => PNG_MIME,
            ExportFormat::Svg => SVG_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(Error::Other(format!(
                "Unsupported export format '{other}', expected 'png' or 'svg'"
            ))),
        }
    }
}

/// Result of one export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The profile is empty; nothing was encoded
    Skipped,
    /// Encoding failed; the user was alerted and nothing was saved
    Aborted,
    /// The file was handed to the saver
    Saved(SavedFile),
}

impl ExportOutcome {
    /// The saved file, if any
    pub fn saved(&self) -> Option<&SavedFile> {
        match self {
            ExportOutcome::Saved(file) => Some(file),
            _ => None,
        }
    }
}

/// File name stem derived from the full name.
///
/// Every whitespace run becomes a single `_`; a name that is empty after
/// trimming yields `qrcode`.
pub fn file_base_name(full_name: &str) -> String {
    if full_name.trim().is_empty() {
        return FALLBACK_BASE_NAME.to_string();
    }

    let mut base = String::with_capacity(full_name.len());
    let mut in_space = false;
    for c in full_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                base.push('_');
            }
            in_space = true;
        } else {
            base.push(c);
            in_space = false;
        }
    }
    base
}

/// `<base>_<size>.<ext>`
pub fn export_file_name(full_name: &str, size: ExportSize, format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        file_base_name(full_name),
        size.pixels(),
        format.extension()
    )
}

impl QrPipeline {
    /// Export the current profile in `format` at the selected size
    pub async fn export(&self, format: ExportFormat) -> Result<ExportOutcome> {
        match format {
            ExportFormat::Png => self.export_png().await,
            ExportFormat::Svg => self.export_svg().await,
        }
    }

    /// Encode onto a private surface, serialise as PNG and save it.
    ///
    /// No-op while the profile is empty.
    pub async fn export_png(&self) -> Result<ExportOutcome> {
        let record = self.record();
        if !record.has_data() {
            return Ok(ExportOutcome::Skipped);
        }
        let size = self.export_size();
        let text = record.encoded_text(&self.labels);

        let mut surface = RasterSurface::new();
        let options = RenderOptions::with_width(size.pixels());
        if let Err(err) = self
            .encoder
            .encode_to_surface(&mut surface, &text, options)
            .await
        {
            return Ok(self.abort(ExportFormat::Png, err));
        }

        let artifact = FileArtifact {
            file_name: export_file_name(&record.full_name, size, ExportFormat::Png),
            mime: PNG_MIME,
            data: Bytes::from(surface.to_png()?),
        };
        let saved = self.saver.save(&artifact).await?;
        Ok(ExportOutcome::Saved(saved))
    }

    /// Encode to SVG markup and save it through a temporary object URL.
    ///
    /// The URL is revoked as soon as the save has been triggered. No-op while
    /// the profile is empty.
    pub async fn export_svg(&self) -> Result<ExportOutcome> {
        let record = self.record();
        if !record.has_data() {
            return Ok(ExportOutcome::Skipped);
        }
        let size = self.export_size();
        let text = record.encoded_text(&self.labels);

        let options = RenderOptions::with_width(size.pixels());
        let markup = match self.encoder.encode_to_string(&text, options).await {
            Ok(markup) => markup,
            Err(err) => return Ok(self.abort(ExportFormat::Svg, err)),
        };

        let url = self.blobs.create_object_url(Blob::new(markup, SVG_MIME));
        let blob = self.blobs.resolve(&url.href()).ok_or_else(|| {
            Error::Other(format!("object URL {} vanished before save", url.href()))
        })?;
        let artifact = FileArtifact {
            file_name: export_file_name(&record.full_name, size, ExportFormat::Svg),
            mime: blob.mime,
            data: blob.data,
        };
        let saved = self.saver.save(&artifact).await;
        drop(url);

        Ok(ExportOutcome::Saved(saved?))
    }

    fn abort(&self, format: ExportFormat, err: Error) -> ExportOutcome {
        tracing::error!(%format, "Failed to generate QR code for download: {err}");
        self.notifier.alert(&self.labels.export_failed);
        ExportOutcome::Aborted
    }
}
