//! Per-consumer image binding.
//!
//! Each display surface that wants a watermarked image holds one
//! `ImageBinding` per image reference. The binding tracks the
//! loading/settled state for its current URL, guards against
//! late-arriving settlements after a rebind, and layers the decode-error
//! flag (a presentation concern, separate from transform failure) on top
//! of the resolution state.
//!
//! Bindings are intentionally not shared: two consumers showing the same
//! URL each hold their own binding over the same shared resolver, and the
//! cache makes the second one settle instantly.

use std::sync::Arc;

use parking_lot::Mutex;

use super::resolver::WatermarkResolver;
use super::Resolution;

/// State of one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingState {
    /// Bound to an empty URL; nothing to load.
    Empty,
    /// Resolution in flight for the current URL.
    Loading,
    /// Resolution settled for the current URL.
    Settled(Resolution),
}

/// What the display surface should render right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    /// Resolution in flight: render a placeholder/skeleton.
    Skeleton,
    /// Render the image at this reference.
    Image(String),
    /// Nothing renderable: empty URL or the reference failed to decode.
    Unavailable,
}

/// Flat view of a binding, the shape handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSnapshot {
    /// Reference to render once settled, empty otherwise.
    pub display_reference: String,
    /// Whether a resolution is still in flight.
    pub loading: bool,
    /// Whether the display surface reported a decode failure.
    pub errored: bool,
}

struct BindingInner {
    /// Bumped on every rebind; settlements carrying a stale generation are
    /// dropped.
    generation: u64,
    state: BindingState,
    decode_error: bool,
}

/// Per-consumer adapter over the shared [`WatermarkResolver`].
#[derive(Clone)]
pub struct ImageBinding {
    resolver: Arc<WatermarkResolver>,
    inner: Arc<Mutex<BindingInner>>,
}

impl ImageBinding {
    /// Create an unbound binding (state `Empty`).
    pub fn new(resolver: Arc<WatermarkResolver>) -> Self {
        Self {
            resolver,
            inner: Arc::new(Mutex::new(BindingInner {
                generation: 0,
                state: BindingState::Empty,
                decode_error: false,
            })),
        }
    }

    /// Bind to a URL and drive resolution to a terminal state.
    ///
    /// Rebinding while an earlier resolution is still in flight does not
    /// abort it - the earlier resolution runs to completion and populates
    /// the shared cache - but its settlement is ignored here, so the
    /// binding always reflects the most recent URL.
    pub async fn bind(&self, url: &str) {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.decode_error = false;
            inner.state = if url.is_empty() {
                BindingState::Empty
            } else {
                BindingState::Loading
            };
            inner.generation
        };

        if url.is_empty() {
            return;
        }

        let resolution = self.resolver.resolve(url).await;

        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.state = BindingState::Settled(resolution);
        }
        // else: stale settlement for a superseded URL, dropped
    }

    /// Current binding state.
    pub fn state(&self) -> BindingState {
        self.inner.lock().state.clone()
    }

    /// Record that the display surface failed to decode the resolved
    /// reference.
    pub fn mark_decode_error(&self) {
        self.inner.lock().decode_error = true;
    }

    /// Clear the decode-error flag (the surface rendered successfully).
    pub fn clear_decode_error(&self) {
        self.inner.lock().decode_error = false;
    }

    /// Flat `{display_reference, loading, errored}` view for presentation.
    pub fn snapshot(&self) -> BindingSnapshot {
        let inner = self.inner.lock();
        let (display_reference, loading) = match &inner.state {
            BindingState::Empty => (String::new(), false),
            BindingState::Loading => (String::new(), true),
            BindingState::Settled(resolution) => (resolution.reference().to_string(), false),
        };
        BindingSnapshot {
            display_reference,
            loading,
            errored: inner.decode_error,
        }
    }

    /// Tri-state render contract: skeleton while loading, the image once
    /// settled, an explicit "unavailable" affordance when there is nothing
    /// renderable or the reference failed to decode.
    pub fn render_state(&self) -> RenderState {
        let inner = self.inner.lock();
        match &inner.state {
            BindingState::Loading => RenderState::Skeleton,
            BindingState::Empty => RenderState::Unavailable,
            BindingState::Settled(_) if inner.decode_error => RenderState::Unavailable,
            BindingState::Settled(resolution) => {
                RenderState::Image(resolution.reference().to_string())
            }
        }
    }
}
