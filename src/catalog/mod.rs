//! Bird catalog collaborator layer.
//!
//! The catalog itself lives behind a GraphQL API; this module consumes it
//! (listing birds, fetching one bird with its notes, attaching a note) and
//! carries the two small pure utilities the catalog views need: the
//! search filter with its debounce and the note-timestamp formatter.

pub mod client;
pub mod format;
pub mod search;

pub use client::{Bird, CatalogClient, CatalogClientConfig, CatalogError, Note};
pub use format::format_timestamp;
pub use search::{filter_birds, SearchDebouncer};
