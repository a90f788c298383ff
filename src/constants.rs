// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Watermark transform defaults
// =============================================================================

/// Default watermark transform endpoint
pub const DEFAULT_TRANSFORM_ENDPOINT: &str =
    "https://us-central1-copilot-take-home.cloudfunctions.net/watermark";

/// Default timeout for a single transform HTTP call in seconds
pub const DEFAULT_TRANSFORM_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Catalog API defaults
// =============================================================================

/// Default catalog GraphQL endpoint
pub const DEFAULT_CATALOG_ENDPOINT: &str = "https://takehome.graphql.copilot.money/";

/// Default timeout for a catalog request in seconds
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// Search defaults
// =============================================================================

/// Default debounce delay for search-as-you-type in milliseconds
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;

// =============================================================================
// Resolution defaults
// =============================================================================

/// Default number of watermark resolutions driven concurrently by the CLI
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;
