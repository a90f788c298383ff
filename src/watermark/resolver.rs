//! Watermark resolution service.
//!
//! Orchestrates the transform client, object store, resolution cache and
//! coalescer. `resolve` is the single entry point: it always terminates in
//! a [`Resolution`], never an error. Watermarking is a best-effort
//! enhancement - any failure degrades to serving the origin URL directly,
//! and that outcome is cached exactly like a success so the transform is
//! attempted at most once per URL per process lifetime.

use bytes::Bytes;
use std::sync::Arc;

use super::cache::ResolutionCache;
use super::client::ImageTransformer;
use super::coalescer::{CoalescingSlot, ResolutionCoalescer};
use super::store::ObjectStore;
use super::Resolution;

/// Resolves origin URLs to displayable references.
///
/// One resolver (with its cache and store) is constructed at the
/// composition root and shared by every consumer; it is the only writer of
/// both the cache and the store.
pub struct WatermarkResolver {
    transformer: Arc<dyn ImageTransformer>,
    cache: Arc<ResolutionCache>,
    store: Arc<ObjectStore>,
    coalescer: ResolutionCoalescer,
}

impl WatermarkResolver {
    /// Create a resolver over the given transformer, cache and store.
    pub fn new(
        transformer: Arc<dyn ImageTransformer>,
        cache: Arc<ResolutionCache>,
        store: Arc<ObjectStore>,
    ) -> Self {
        Self {
            transformer,
            cache,
            store,
            coalescer: ResolutionCoalescer::new(),
        }
    }

    /// The shared resolution cache.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Resolve an origin URL to its terminal [`Resolution`].
    ///
    /// - Empty URL: returns `Fallback("")` immediately, no network.
    /// - Cache hit: returns the cached terminal result, no network.
    /// - Cache miss: at most one caller per URL (the coalescing leader)
    ///   runs the transform; everyone else waits and receives the
    ///   leader's settlement directly.
    ///
    /// Never returns an error: transform failures settle as
    /// `Fallback(url)`.
    pub async fn resolve(&self, url: &str) -> Resolution {
        if url.is_empty() {
            return Resolution::Fallback(String::new());
        }

        if let Some(hit) = self.cache.get(url).await {
            return hit;
        }

        match self.coalescer.acquire(url).await {
            CoalescingSlot::Leader(guard) => {
                // A previous leader may have settled between our cache
                // miss and acquiring the slot
                if let Some(hit) = self.cache.get(url).await {
                    guard.settle(hit.clone()).await;
                    return hit;
                }

                let resolution = self.transform_and_cache(url).await;
                guard.settle(resolution.clone()).await;
                resolution
            }
            CoalescingSlot::Settled(resolution) => resolution,
        }
    }

    async fn transform_and_cache(&self, url: &str) -> Resolution {
        let resolution = match self.transformer.transform(url).await {
            Ok(bytes) => {
                let reference = self.store.insert(bytes);
                tracing::debug!(url, reference = %reference, "watermark transform succeeded");
                Resolution::Ready(reference)
            }
            Err(err) => {
                tracing::warn!(
                    url,
                    error = %err,
                    "watermark transform failed, serving origin image"
                );
                Resolution::Fallback(url.to_string())
            }
        };

        self.cache.put(url.to_string(), resolution.clone()).await;
        resolution
    }

    /// Dereference a `Ready` display reference to its watermarked bytes.
    pub fn bytes(&self, reference: &str) -> Option<Bytes> {
        self.store.bytes(reference)
    }
}
