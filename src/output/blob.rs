//! Temporary reference URLs for in-memory file objects
//!
//! Mirrors the browser's `URL.createObjectURL` contract: a blob is registered
//! under a unique `blob:` URL for as long as the returned [`ObjectUrl`] lives,
//! and dropping the handle revokes it.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

const URL_SCHEME: &str = "blob:qrprofile/";

/// Immutable bytes tagged with a MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Contents
    pub data: Bytes,
    /// Content type, e.g. `image/svg+xml`
    pub mime: &'static str,
}

impl Blob {
    /// Wrap `data` as a blob of type `mime`
    pub fn new(data: impl Into<Bytes>, mime: &'static str) -> Self {
        Self {
            data: data.into(),
            mime,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    live: Mutex<HashMap<Uuid, Blob>>,
    created: AtomicU64,
}

/// Registry of live object URLs
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<Inner>,
}

impl BlobRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` and return a URL that stays valid until dropped
    pub fn create_object_url(&self, blob: Blob) -> ObjectUrl {
        let id = Uuid::new_v4();
        self.entries().insert(id, blob);
        self.inner.created.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(%id, "object URL created");
        ObjectUrl {
            id,
            registry: self.clone(),
        }
    }

    /// Look up a live URL
    pub fn resolve(&self, href: &str) -> Option<Blob> {
        let id = href.strip_prefix(URL_SCHEME)?.parse::<Uuid>().ok()?;
        self.entries().get(&id).cloned()
    }

    /// Number of URLs not yet revoked
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    /// Number of URLs ever created
    pub fn created_count(&self) -> u64 {
        self.inner.created.load(Ordering::Relaxed)
    }

    fn revoke(&self, id: &Uuid) {
        if self.entries().remove(id).is_some() {
            tracing::trace!(%id, "object URL revoked");
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Blob>> {
        self.inner
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live `blob:` URL; revoked on drop
#[derive(Debug)]
pub struct ObjectUrl {
    id: Uuid,
    registry: BlobRegistry,
}

impl ObjectUrl {
    /// The URL string
    pub fn href(&self) -> String {
        format!("{URL_SCHEME}{}", self.id)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolves_until_dropped() {
        let registry = BlobRegistry::new();
        let url = registry.create_object_url(Blob::new("<svg/>", "image/svg+xml"));
        let href = url.href();

        let blob = registry.resolve(&href).unwrap();
        assert_eq!(blob.data, Bytes::from_static(b"<svg/>"));
        assert_eq!(registry.live_count(), 1);

        drop(url);
        assert!(registry.resolve(&href).is_none());
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.created_count(), 1);
    }

    #[test]
    fn test_foreign_urls_do_not_resolve() {
        let registry = BlobRegistry::new();
        assert!(registry.resolve("https://example.com").is_none());
        assert!(registry.resolve("blob:qrprofile/not-a-uuid").is_none());
    }
}
