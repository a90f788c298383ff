// End-to-end tests of the watermarked-image delivery pipeline through the
// public API: resolver + cache + store + binding, with a scripted
// transformer standing in for the two-stage network operation.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use birdmark::watermark::{
    BindingState, ImageBinding, ImageTransformer, ObjectStore, RenderState, Resolution,
    ResolutionCache, WatermarkError, WatermarkResolver,
};

/// Scripted transformer: per-URL responses with optional delay, counting
/// every invocation.
struct ScriptedTransformer {
    responses: HashMap<String, Result<Bytes, WatermarkError>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedTransformer {
    fn new(responses: Vec<(&str, Result<Bytes, WatermarkError>)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(url, response)| (url.to_string(), response))
                .collect(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageTransformer for ScriptedTransformer {
    async fn transform(&self, url: &str) -> Result<Bytes, WatermarkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| panic!("unscripted url: {url}"))
    }
}

fn resolver_over(transformer: Arc<ScriptedTransformer>) -> Arc<WatermarkResolver> {
    Arc::new(WatermarkResolver::new(
        transformer,
        Arc::new(ResolutionCache::new()),
        Arc::new(ObjectStore::new()),
    ))
}

#[tokio::test]
async fn successful_transform_yields_ready_with_the_transform_bytes() {
    let transformer = Arc::new(ScriptedTransformer::new(vec![(
        "https://example.com/bird.jpg",
        Ok(Bytes::from_static(b"B")),
    )]));
    let resolver = resolver_over(Arc::clone(&transformer));

    let resolution = resolver.resolve("https://example.com/bird.jpg").await;

    match &resolution {
        Resolution::Ready(reference) => {
            assert_eq!(resolver.bytes(reference), Some(Bytes::from_static(b"B")));
        }
        Resolution::Fallback(_) => panic!("expected Ready, got {resolution:?}"),
    }
}

#[tokio::test]
async fn origin_404_yields_fallback_to_the_origin_url() {
    let transformer = Arc::new(ScriptedTransformer::new(vec![(
        "https://example.com/missing.jpg",
        Err(WatermarkError::Fetch {
            status: Some(404),
            message: "Not Found".to_string(),
        }),
    )]));
    let resolver = resolver_over(transformer);

    let resolution = resolver.resolve("https://example.com/missing.jpg").await;
    assert_eq!(
        resolution,
        Resolution::Fallback("https://example.com/missing.jpg".to_string())
    );
}

#[tokio::test]
async fn transform_500_yields_fallback_not_an_error() {
    let transformer = Arc::new(ScriptedTransformer::new(vec![(
        "https://example.com/bird.jpg",
        Err(WatermarkError::Transform {
            status: Some(500),
            message: "Internal Server Error".to_string(),
        }),
    )]));
    let resolver = resolver_over(transformer);

    let resolution = resolver.resolve("https://example.com/bird.jpg").await;
    assert_eq!(
        resolution,
        Resolution::Fallback("https://example.com/bird.jpg".to_string())
    );
}

#[tokio::test]
async fn repeated_resolve_is_served_from_cache() {
    let transformer = Arc::new(ScriptedTransformer::new(vec![(
        "https://example.com/bird.jpg",
        Ok(Bytes::from_static(b"wm")),
    )]));
    let resolver = resolver_over(Arc::clone(&transformer));

    let first = resolver.resolve("https://example.com/bird.jpg").await;
    let second = resolver.resolve("https://example.com/bird.jpg").await;

    assert_eq!(first, second);
    assert_eq!(transformer.call_count(), 1, "second resolve must not hit the network");
}

#[tokio::test]
async fn empty_url_short_circuits_to_empty_fallback() {
    let transformer = Arc::new(ScriptedTransformer::new(vec![]));
    let resolver = resolver_over(Arc::clone(&transformer));

    let resolution = resolver.resolve("").await;

    assert_eq!(resolution, Resolution::Fallback(String::new()));
    assert_eq!(transformer.call_count(), 0);
}

#[tokio::test]
async fn concurrent_resolves_coalesce_into_one_transform() {
    let transformer = Arc::new(
        ScriptedTransformer::new(vec![(
            "https://example.com/bird.jpg",
            Ok(Bytes::from_static(b"wm")),
        )])
        .with_delay(Duration::from_millis(40)),
    );
    let resolver = resolver_over(Arc::clone(&transformer));

    let mut handles = vec![];
    for _ in 0..10 {
        let resolver = Arc::clone(&resolver);
        handles.push(tokio::spawn(async move {
            resolver.resolve("https://example.com/bird.jpg").await
        }));
    }

    let mut resolutions = vec![];
    for handle in handles {
        resolutions.push(handle.await.unwrap());
    }

    assert_eq!(transformer.call_count(), 1);
    for resolution in &resolutions {
        assert_eq!(resolution, &resolutions[0]);
        assert!(resolution.is_watermarked());
        assert_eq!(
            resolver.bytes(resolution.reference()),
            Some(Bytes::from_static(b"wm"))
        );
    }

    resolver.cache().run_pending().await;
    assert_eq!(resolver.cache().entry_count(), 1);
}

#[tokio::test]
async fn binding_rebound_mid_flight_reflects_the_newer_url() {
    let transformer = Arc::new(
        ScriptedTransformer::new(vec![
            ("https://example.com/uA.jpg", Ok(Bytes::from_static(b"a"))),
            ("https://example.com/uB.jpg", Ok(Bytes::from_static(b"b"))),
        ])
        .with_delay(Duration::from_millis(40)),
    );
    let resolver = resolver_over(transformer);
    let binding = ImageBinding::new(Arc::clone(&resolver));

    let first = {
        let binding = binding.clone();
        tokio::spawn(async move { binding.bind("https://example.com/uA.jpg").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = {
        let binding = binding.clone();
        tokio::spawn(async move { binding.bind("https://example.com/uB.jpg").await })
    };

    first.await.unwrap();
    second.await.unwrap();

    match binding.state() {
        BindingState::Settled(resolution) => {
            assert_eq!(
                resolver.bytes(resolution.reference()),
                Some(Bytes::from_static(b"b")),
                "binding must reflect uB's result, never uA's"
            );
        }
        other => panic!("expected settled binding, got {other:?}"),
    }
}

#[tokio::test]
async fn binding_tri_state_render_contract() {
    let transformer = Arc::new(
        ScriptedTransformer::new(vec![(
            "https://example.com/bird.jpg",
            Ok(Bytes::from_static(b"wm")),
        )])
        .with_delay(Duration::from_millis(50)),
    );
    let resolver = resolver_over(transformer);
    let binding = ImageBinding::new(resolver);

    // Unbound: nothing renderable
    assert_eq!(binding.render_state(), RenderState::Unavailable);

    let background = {
        let binding = binding.clone();
        tokio::spawn(async move { binding.bind("https://example.com/bird.jpg").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // In flight: skeleton
    assert_eq!(binding.render_state(), RenderState::Skeleton);

    background.await.unwrap();

    // Settled: the image itself
    let RenderState::Image(reference) = binding.render_state() else {
        panic!("expected image render state");
    };
    assert!(reference.starts_with("mem://watermark/"));

    // A decode failure reported by the display surface flips the binding
    // to the explicit unavailable affordance
    binding.mark_decode_error();
    assert_eq!(binding.render_state(), RenderState::Unavailable);
}

#[tokio::test]
async fn two_bindings_on_one_url_share_the_resolution() {
    let transformer = Arc::new(ScriptedTransformer::new(vec![(
        "https://example.com/bird.jpg",
        Ok(Bytes::from_static(b"wm")),
    )]));
    let resolver = resolver_over(Arc::clone(&transformer));

    let grid_card = ImageBinding::new(Arc::clone(&resolver));
    let detail_view = ImageBinding::new(Arc::clone(&resolver));

    grid_card.bind("https://example.com/bird.jpg").await;
    detail_view.bind("https://example.com/bird.jpg").await;

    assert_eq!(transformer.call_count(), 1);
    assert_eq!(
        grid_card.snapshot().display_reference,
        detail_view.snapshot().display_reference
    );

    // Decode errors stay per-consumer
    grid_card.mark_decode_error();
    assert!(grid_card.snapshot().errored);
    assert!(!detail_view.snapshot().errored);
}
