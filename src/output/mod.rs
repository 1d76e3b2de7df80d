//! File save, user alerts and terminal rendering

pub mod blob;

use crate::error::Result;
use crate::labels::Labels;
use crate::profile::{ProfileField, ProfileRecord};
use crate::qr::RasterSurface;
use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::{self, FilterType};
use serde_json::{Value, json};
use std::path::{Component, Path, PathBuf};

/// MIME type of raster exports
pub const PNG_MIME: &str = "image/png";
/// MIME type of vector exports
pub const SVG_MIME: &str = "image/svg+xml";

/// A finished export waiting to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    /// Suggested file name, e.g. `Sara_512.png`
    pub file_name: String,
    /// Content type
    pub mime: &'static str,
    /// Encoded file contents
    pub data: Bytes,
}

/// Where an artifact ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Location the artifact was written to
    pub path: PathBuf,
    /// Bytes written
    pub bytes: usize,
}

/// "Trigger a file save" capability
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Persist `artifact` under its suggested name
    async fn save(&self, artifact: &FileArtifact) -> Result<SavedFile>;
}

/// Blocking user-visible alert
pub trait Notifier: Send + Sync {
    /// Show `message` to the user
    fn alert(&self, message: &str);
}

/// Saves artifacts into a fixed directory
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    /// Save into `dir`, creating it on first use
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path inside the target directory for a suggested file name.
    ///
    /// Separators and parent references are neutralised so the result never
    /// leaves the directory.
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        let flat: String = file_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();
        let flat = match Path::new(&flat).components().next() {
            Some(Component::Normal(_)) => flat,
            _ => format!("_{flat}"),
        };
        self.dir.join(flat)
    }
}

#[async_trait]
impl FileSaver for DirectorySaver {
    async fn save(&self, artifact: &FileArtifact) -> Result<SavedFile> {
        if !self.dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory {}: {e}", self.dir.display()),
                )
            })?;
        }

        let path = self.target_path(&artifact.file_name);
        tokio::fs::write(&path, &artifact.data).await.map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {e}", path.display()),
            )
        })?;

        tracing::info!(path = %path.display(), mime = artifact.mime, bytes = artifact.data.len(), "export saved");
        Ok(SavedFile {
            path,
            bytes: artifact.data.len(),
        })
    }
}

/// Prints alerts to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("⚠ {message}");
    }
}

/// Combined structured and human-readable representation of a profile
#[derive(Debug, Clone)]
pub struct RenderedProfile {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a profile into both JSON and human-readable forms.
pub fn render_profile(record: &ProfileRecord, labels: &Labels) -> RenderedProfile {
    let json = json!({
        "profile": record,
        "has_data": record.has_data(),
    });

    let mut human = Vec::with_capacity(ProfileField::ALL.len());
    for field in ProfileField::ALL {
        human.push(format!(
            "  {}: {}",
            field.form_label(labels),
            record.get(field)
        ));
    }

    RenderedProfile { json, human }
}

/// Draw a surface as half-block terminal art at most `columns` wide.
///
/// Each output character covers two vertically stacked pixels of the
/// downscaled image. An empty surface yields no lines.
pub fn terminal_art(surface: &RasterSurface, columns: u32) -> Vec<String> {
    if surface.is_empty() || columns == 0 {
        return Vec::new();
    }

    let side = columns.min(surface.width());
    let small = imageops::resize(surface.image(), side, side, FilterType::Nearest);
    let dark = |x: u32, y: u32| y < side && small.get_pixel(x, y)[0] < 128;

    (0..side)
        .step_by(2)
        .map(|y| {
            (0..side)
                .map(|x| match (dark(x, y), dark(x, y + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                })
                .collect()
        })
        .collect()
}
