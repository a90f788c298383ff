//! In-process object store for watermarked image bytes.
//!
//! Successful transforms produce bytes that need a displayable handle, the
//! same role blob URLs play in a browser. The store maps opaque
//! `mem://watermark/<uuid>` references to their bytes. References are valid
//! only for the current process lifetime and are never persisted.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Scheme prefix for references minted by the store.
pub const MEMORY_REFERENCE_PREFIX: &str = "mem://watermark/";

/// Process-lifetime store of watermarked image bytes, keyed by opaque
/// references.
///
/// Entries are write-once and never evicted; the corpus of distinct images
/// is bounded by catalog size.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl ObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes and mint a fresh display reference for them.
    pub fn insert(&self, data: Bytes) -> String {
        let reference = format!("{}{}", MEMORY_REFERENCE_PREFIX, Uuid::new_v4());
        self.objects.write().insert(reference.clone(), data);
        reference
    }

    /// Dereference a display reference to its bytes.
    ///
    /// Returns `None` for references not minted by this store (including
    /// plain origin URLs from fallback resolutions).
    pub fn bytes(&self, reference: &str) -> Option<Bytes> {
        self.objects.read().get(reference).cloned()
    }

    /// Whether the reference addresses bytes held by this store.
    pub fn contains(&self, reference: &str) -> bool {
        self.objects.read().contains_key(reference)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}
