use clap::Parser;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use birdmark::catalog::{filter_birds, format_timestamp, Bird, CatalogClient};
use birdmark::config::Config;
use birdmark::watermark::{
    BindingState, HttpTransformClient, ImageBinding, ObjectStore, RenderState, Resolution,
    ResolutionCache, WatermarkResolver,
};

/// Birdmark - watermarked image delivery for the bird catalog
#[derive(Parser, Debug)]
#[command(name = "birdmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Filter the bird list by name (case-insensitive substring)
    #[arg(short, long)]
    search: Option<String>,

    /// Show one bird's detail (high-res image and notes) instead of the list
    #[arg(short, long)]
    bird: Option<String>,

    /// Write watermarked images into this directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging subsystem
    birdmark::logging::init_subscriber(args.json_logs)
        .expect("Failed to initialize logging subsystem");

    // Load configuration; a missing default file falls back to built-in
    // defaults so the CLI works out of the box
    let config = if args.config.exists() {
        Config::from_file(&args.config).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        })
    } else {
        tracing::info!(
            config_file = %args.config.display(),
            "config file not found, using defaults"
        );
        Config::default()
    };

    tracing::info!(
        transform_endpoint = %config.watermark.transform_endpoint,
        catalog_endpoint = %config.catalog.endpoint,
        resolve_concurrency = config.watermark.resolve_concurrency,
        "Configuration loaded"
    );

    // Composition root: the one process-wide cache, store and resolver
    let transformer = HttpTransformClient::new(config.watermark.client_config())
        .unwrap_or_else(|e| {
            eprintln!("Failed to create transform client: {}", e);
            std::process::exit(1);
        });
    let resolver = Arc::new(WatermarkResolver::new(
        Arc::new(transformer),
        Arc::new(ResolutionCache::new()),
        Arc::new(ObjectStore::new()),
    ));

    let catalog = CatalogClient::new(config.catalog.client_config()).unwrap_or_else(|e| {
        eprintln!("Failed to create catalog client: {}", e);
        std::process::exit(1);
    });

    let outcome = match &args.bird {
        Some(id) => show_bird(&catalog, &resolver, id, args.out.as_deref()).await,
        None => list_birds(
            &catalog,
            &resolver,
            args.search.as_deref(),
            config.watermark.resolve_concurrency,
            args.out.as_deref(),
        )
        .await,
    };

    if let Err(e) = outcome {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let stats = resolver.cache().stats();
    tracing::info!(
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        "Done"
    );
}

/// List birds (optionally filtered) with their watermark resolutions.
async fn list_birds(
    catalog: &CatalogClient,
    resolver: &Arc<WatermarkResolver>,
    search: Option<&str>,
    concurrency: usize,
    out: Option<&Path>,
) -> Result<(), String> {
    let birds = catalog
        .birds()
        .await
        .map_err(|e| format!("Failed to list birds: {}", e))?;

    let selected: Vec<Bird> = match search {
        Some(query) => filter_birds(&birds, query).into_iter().cloned().collect(),
        None => birds,
    };

    tracing::info!(birds = selected.len(), "Resolving watermarked thumbnails");

    let resolutions: Vec<(Bird, Resolution)> = stream::iter(selected)
        .map(|bird| {
            let resolver = Arc::clone(resolver);
            async move {
                let resolution = resolver.resolve(&bird.thumb_url).await;
                (bird, resolution)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for (bird, resolution) in &resolutions {
        let marker = if resolution.is_watermarked() {
            "watermarked"
        } else {
            "fallback"
        };
        println!(
            "{:<28} {:<26} [{}] {}",
            bird.english_name,
            bird.latin_name,
            marker,
            resolution.reference()
        );

        if let Some(dir) = out {
            write_resolution(resolver, dir, &bird.id, &bird.thumb_url, resolution)?;
        }
    }

    Ok(())
}

/// Show one bird's detail through a consumption binding.
async fn show_bird(
    catalog: &CatalogClient,
    resolver: &Arc<WatermarkResolver>,
    id: &str,
    out: Option<&Path>,
) -> Result<(), String> {
    let bird = catalog
        .bird(id)
        .await
        .map_err(|e| format!("Failed to fetch bird {}: {}", id, e))?;

    println!("{} ({})", bird.english_name, bird.latin_name);

    let binding = ImageBinding::new(Arc::clone(resolver));
    binding.bind(&bird.image_url).await;

    match binding.render_state() {
        RenderState::Image(reference) => println!("image: {}", reference),
        RenderState::Unavailable => println!("image: unavailable"),
        // bind() drives resolution to a terminal state before returning
        RenderState::Skeleton => unreachable!("binding settled"),
    }

    if bird.notes.is_empty() {
        println!("no notes");
    } else {
        for note in &bird.notes {
            println!("- {} ({})", note.comment, format_timestamp(note.timestamp));
        }
    }

    if let Some(dir) = out {
        if let BindingState::Settled(resolution) = binding.state() {
            write_resolution(resolver, dir, &bird.id, &bird.image_url, &resolution)?;
        }
    }

    Ok(())
}

/// Write the watermarked bytes behind a `Ready` resolution to
/// `<dir>/<bird id>.<ext>`. Fallback resolutions have no local bytes and
/// are skipped.
fn write_resolution(
    resolver: &WatermarkResolver,
    dir: &Path,
    bird_id: &str,
    source_url: &str,
    resolution: &Resolution,
) -> Result<(), String> {
    let Some(bytes) = resolver.bytes(resolution.reference()) else {
        tracing::debug!(bird = %bird_id, "no local bytes for fallback resolution, skipping write");
        return Ok(());
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create output directory: {}", e))?;

    let path = dir.join(format!("{}.{}", bird_id, extension_of(source_url)));
    std::fs::write(&path, &bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote watermarked image");
    Ok(())
}

/// Best-effort file extension from an origin URL path.
fn extension_of(url: &str) -> &str {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 4 && !ext.contains('/') => ext,
        _ => "img",
    }
}
