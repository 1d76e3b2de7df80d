//! QR rendering and export pipeline
//!
//! [`QrPipeline`] observes the profile through a `watch` receiver, keeps the
//! [`LivePreview`] in step with it, owns the export size selection, and turns
//! the current profile into PNG or SVG files on demand.

mod export;
mod preview;
mod size;

pub use export::{ExportFormat, ExportOutcome, export_file_name, file_base_name};
pub use preview::{LivePreview, PREVIEW_WIDTH, PreviewOutcome, PreviewSnapshot};
pub use size::ExportSize;

use crate::error::{Error, Result};
use crate::labels::Labels;
use crate::output::blob::BlobRegistry;
use crate::output::{FileSaver, Notifier};
use crate::profile::ProfileRecord;
use crate::qr::QrEncoder;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Consumer of the profile form that renders and exports QR codes
pub struct QrPipeline {
    profile: watch::Receiver<ProfileRecord>,
    encoder: Arc<dyn QrEncoder>,
    saver: Arc<dyn FileSaver>,
    notifier: Arc<dyn Notifier>,
    labels: Arc<Labels>,
    blobs: BlobRegistry,
    selected: Mutex<ExportSize>,
    preview: Arc<LivePreview>,
}

impl QrPipeline {
    /// Build a pipeline over `profile` with injected collaborators
    pub fn new(
        profile: watch::Receiver<ProfileRecord>,
        encoder: Arc<dyn QrEncoder>,
        saver: Arc<dyn FileSaver>,
        notifier: Arc<dyn Notifier>,
        labels: Labels,
    ) -> Self {
        Self {
            profile,
            preview: Arc::new(LivePreview::new(encoder.clone())),
            encoder,
            saver,
            notifier,
            labels: Arc::new(labels),
            blobs: BlobRegistry::new(),
            selected: Mutex::new(ExportSize::default()),
        }
    }

    /// Start with `size` selected instead of the default
    pub fn with_export_size(self, size: ExportSize) -> Self {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = size;
        self
    }

    /// Latest profile record
    pub fn record(&self) -> ProfileRecord {
        self.profile.borrow().clone()
    }

    /// Encoded text for the latest profile
    pub fn encoded_text(&self) -> String {
        self.profile.borrow().encoded_text(&self.labels)
    }

    /// Whether the latest profile has any non-empty field
    pub fn has_data(&self) -> bool {
        self.profile.borrow().has_data()
    }

    /// Label set in use
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Registry backing temporary object URLs for SVG exports
    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// The live preview
    pub fn preview(&self) -> &Arc<LivePreview> {
        &self.preview
    }

    /// Currently selected export size
    pub fn export_size(&self) -> ExportSize {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Choose the size used by the next export.
    ///
    /// Rejected while the profile is empty. Never touches the preview.
    pub fn select_size(&self, size: ExportSize) -> Result<()> {
        if !self.has_data() {
            return Err(Error::SelectionDisabled);
        }
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = size;
        tracing::debug!(%size, "export size selected");
        Ok(())
    }

    /// Render the preview for the latest profile and wait for it
    pub async fn refresh_preview(&self) -> PreviewOutcome {
        let (text, has_data) = self.current();
        self.preview.refresh(&text, has_data).await
    }

    /// Keep the preview in step with the profile.
    ///
    /// Renders once immediately, then spawns one refresh per profile change
    /// without waiting for the previous one; generations are issued here, in
    /// change order, so renders that finish out of order are discarded. The
    /// task ends when the form is dropped.
    ///
    /// The `watch` channel keeps only the newest record, so several updates
    /// landing before the task wakes up yield a single render of the latest
    /// one. Every wakeup renders, and the displayed code is never older than
    /// the last observed record, but intermediate records may be skipped.
    pub fn spawn_preview_task(&self) -> JoinHandle<()> {
        let mut profile = self.profile.clone();
        let labels = self.labels.clone();
        let preview = self.preview.clone();

        tokio::spawn(async move {
            loop {
                let (text, has_data) = {
                    let record = profile.borrow_and_update();
                    (record.encoded_text(&labels), record.has_data())
                };
                let generation = preview.issue();
                let preview = preview.clone();
                tokio::spawn(async move {
                    preview.refresh_issued(generation, &text, has_data).await;
                });

                if profile.changed().await.is_err() {
                    tracing::debug!("profile form dropped, preview task exiting");
                    break;
                }
            }
        })
    }

    fn current(&self) -> (String, bool) {
        let record = self.profile.borrow();
        (record.encoded_text(&self.labels), record.has_data())
    }
}
