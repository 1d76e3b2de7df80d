//! Live preview surface with stale-render protection
//!
//! Every refresh takes a new generation number before it starts encoding. A
//! result is committed only if no newer refresh has been issued in the
//! meantime, so a slow render can never overwrite a later clear or render.

use crate::qr::{QrEncoder, RasterSurface, RenderOptions};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Width of the on-screen preview in pixels, independent of the export size
pub const PREVIEW_WIDTH: u32 = 256;

/// What a single refresh did to the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// A fresh code was committed
    Rendered,
    /// The surface was cleared because the profile is empty
    Cleared,
    /// A newer refresh was issued before this one finished; nothing committed
    Superseded,
    /// Encoding failed; the surface keeps its previous contents
    Failed,
}

/// Copy of the display surface at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    /// Displayed pixels, empty when cleared
    pub surface: RasterSurface,
    /// Generation of the refresh that produced `surface` (0 before any)
    pub generation: u64,
}

impl PreviewSnapshot {
    /// True while the placeholder is shown instead of a code
    pub fn is_cleared(&self) -> bool {
        self.surface.is_empty()
    }
}

#[derive(Debug, Default)]
struct Display {
    surface: RasterSurface,
    generation: u64,
}

/// Persistent preview display fed by an injected encoder
pub struct LivePreview {
    encoder: Arc<dyn QrEncoder>,
    issued: AtomicU64,
    display: Mutex<Display>,
}

impl LivePreview {
    /// Empty preview using `encoder`
    pub fn new(encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            encoder,
            issued: AtomicU64::new(0),
            display: Mutex::new(Display::default()),
        }
    }

    /// Re-render for `text`, or clear when `has_data` is false.
    pub async fn refresh(&self, text: &str, has_data: bool) -> PreviewOutcome {
        let generation = self.issue();
        self.refresh_issued(generation, text, has_data).await
    }

    /// Reserve the next generation. Anything issued earlier becomes stale.
    ///
    /// Callers that hand the render off to another task must issue first, so
    /// the generation order follows the order of profile changes rather than
    /// the order tasks happen to be polled.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Perform the refresh reserved by [`LivePreview::issue`]
    pub async fn refresh_issued(
        &self,
        generation: u64,
        text: &str,
        has_data: bool,
    ) -> PreviewOutcome {
        if !has_data {
            return if self.commit(generation, RasterSurface::clear) {
                tracing::debug!(generation, "preview cleared");
                PreviewOutcome::Cleared
            } else {
                PreviewOutcome::Superseded
            };
        }

        let mut scratch = RasterSurface::new();
        let options = RenderOptions::with_width(PREVIEW_WIDTH);
        if let Err(err) = self
            .encoder
            .encode_to_surface(&mut scratch, text, options)
            .await
        {
            tracing::error!(generation, "Error rendering preview: {err}");
            return PreviewOutcome::Failed;
        }

        if self.commit(generation, |surface| *surface = scratch) {
            tracing::debug!(generation, "preview rendered");
            PreviewOutcome::Rendered
        } else {
            tracing::debug!(generation, "stale preview render discarded");
            PreviewOutcome::Superseded
        }
    }

    /// Current display contents
    pub fn snapshot(&self) -> PreviewSnapshot {
        let display = self.lock();
        PreviewSnapshot {
            surface: display.surface.clone(),
            generation: display.generation,
        }
    }

    /// Number of refreshes issued so far
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    fn commit(&self, generation: u64, apply: impl FnOnce(&mut RasterSurface)) -> bool {
        let mut display = self.lock();
        if generation != self.issued.load(Ordering::SeqCst) {
            return false;
        }
        apply(&mut display.surface);
        display.generation = generation;
        true
    }

    fn lock(&self) -> MutexGuard<'_, Display> {
        self.display.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
