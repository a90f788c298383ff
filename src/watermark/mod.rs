//! Watermarked-image delivery pipeline.
//!
//! Images in the catalog are never served straight from their origin URL.
//! Each origin URL goes through a remote transform service that applies a
//! watermark, and the result is cached for the lifetime of the process so
//! the transform runs at most once per distinct URL.
//!
//! Watermarking is best-effort: any failure along the way (origin fetch,
//! transform call) degrades to serving the untransformed origin URL, and
//! that degradation is an explicit, trackable state rather than a thrown
//! error.
//!
//! # Pipeline
//!
//! ```text
//! consumer -> ImageBinding -> WatermarkResolver -> ResolutionCache
//!                                   |                   ^
//!                                   v                   |
//!                          ResolutionCoalescer -> HttpTransformClient
//!                                                       |
//!                                                       v
//!                                                  ObjectStore
//! ```
//!
//! The resolver is the only writer of the cache and the object store;
//! bindings only ever read resolved references.

pub mod binding;
pub mod cache;
pub mod client;
pub mod coalescer;
pub mod error;
pub mod resolver;
pub mod store;

// Re-export main types for convenience
pub use binding::{BindingSnapshot, BindingState, ImageBinding, RenderState};
pub use cache::{CacheStats, ResolutionCache};
pub use client::{HttpTransformClient, ImageTransformer, TransformClientConfig};
pub use coalescer::{CoalescingSlot, ResolutionCoalescer, SettlementGuard};
pub use error::WatermarkError;
pub use resolver::WatermarkResolver;
pub use store::ObjectStore;

/// Terminal outcome of resolving one origin URL.
///
/// Both variants carry a display reference the consumer can render
/// directly. `Ready` points at watermarked bytes held in the
/// [`ObjectStore`]; `Fallback` points back at the origin URL (or is empty
/// when the URL itself was empty). Once a URL settles to one of these, the
/// same value is observed by every caller for the rest of the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Transform succeeded; the reference addresses watermarked bytes.
    Ready(String),
    /// Transform failed; the reference is the untransformed origin URL.
    Fallback(String),
}

impl Resolution {
    /// The reference the display surface should render.
    pub fn reference(&self) -> &str {
        match self {
            Resolution::Ready(reference) | Resolution::Fallback(reference) => reference,
        }
    }

    /// Whether the reference points at watermarked bytes.
    pub fn is_watermarked(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }
}
