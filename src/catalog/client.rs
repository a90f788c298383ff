//! GraphQL catalog client.
//!
//! Thin request/response client over the catalog's GraphQL endpoint. The
//! list query fetches only what the grid needs (thumbnail and names); the
//! detail query adds the high-resolution image and notes.
//!
//! Note timestamps are epoch seconds carried as a GraphQL `Int!`, which is
//! 32-bit on the wire. `add_note` takes an `i32` for that reason.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::constants::{DEFAULT_CATALOG_ENDPOINT, DEFAULT_CATALOG_TIMEOUT_SECS};

const GET_BIRDS_QUERY: &str = r#"
query GetBirds {
  birds {
    id
    thumb_url
    english_name
    latin_name
  }
}
"#;

const GET_BIRD_QUERY: &str = r#"
query GetBird($id: ID!) {
  bird(id: $id) {
    id
    thumb_url
    image_url
    english_name
    latin_name
    notes {
      id
      comment
      timestamp
    }
  }
}
"#;

const ADD_NOTE_MUTATION: &str = r#"
mutation AddNote($birdId: ID!, $comment: String!, $timestamp: Int!) {
  addNote(birdId: $birdId, comment: $comment, timestamp: $timestamp)
}
"#;

/// One bird in the catalog.
///
/// `image_url` and `notes` are only populated by the detail query; the
/// list query leaves them at their defaults.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Bird {
    pub id: String,
    pub thumb_url: String,
    #[serde(default)]
    pub image_url: String,
    pub english_name: String,
    pub latin_name: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// A free-text note attached to a bird.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub comment: String,
    /// Epoch seconds (32-bit on the wire).
    pub timestamp: i64,
}

/// Error type for catalog operations
#[derive(Debug)]
pub enum CatalogError {
    /// Transport-level failure (connect, timeout, non-2xx status)
    Http(String),
    /// The API answered with GraphQL errors
    Api(String),
    /// The response body could not be interpreted
    InvalidResponse(String),
    /// Invalid client configuration
    Config(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Http(msg) => write!(f, "Catalog request failed: {msg}"),
            CatalogError::Api(msg) => write!(f, "Catalog API error: {msg}"),
            CatalogError::InvalidResponse(msg) => write!(f, "Invalid catalog response: {msg}"),
            CatalogError::Config(msg) => write!(f, "Catalog configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct BirdsData {
    birds: Vec<Bird>,
}

#[derive(Debug, Deserialize)]
struct BirdData {
    bird: Bird,
}

#[derive(Deserialize)]
struct AddNoteData {
    #[serde(rename = "addNote")]
    #[allow(dead_code)]
    add_note: serde_json::Value,
}

#[derive(Serialize)]
struct BirdVariables<'a> {
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddNoteVariables<'a> {
    bird_id: &'a str,
    comment: &'a str,
    timestamp: i32,
}

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CATALOG_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the catalog GraphQL API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl CatalogClient {
    /// Create a new catalog client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Config` if the endpoint is empty or the HTTP
    /// client cannot be created.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogError> {
        if config.endpoint.is_empty() {
            return Err(CatalogError::Config(
                "catalog endpoint must not be empty".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint,
            http_client,
        })
    }

    /// List all birds (thumbnail and names only).
    pub async fn birds(&self) -> Result<Vec<Bird>, CatalogError> {
        let data: BirdsData = self.execute(GET_BIRDS_QUERY, serde_json::json!({})).await?;
        Ok(data.birds)
    }

    /// Fetch one bird with its high-resolution image and notes.
    pub async fn bird(&self, id: &str) -> Result<Bird, CatalogError> {
        let data: BirdData = self
            .execute(GET_BIRD_QUERY, BirdVariables { id })
            .await?;
        Ok(data.bird)
    }

    /// Attach a free-text note to a bird.
    ///
    /// `timestamp` is epoch seconds; the API's `Int!` is 32-bit, so that
    /// is what goes on the wire.
    pub async fn add_note(
        &self,
        bird_id: &str,
        comment: &str,
        timestamp: i32,
    ) -> Result<(), CatalogError> {
        let _: AddNoteData = self
            .execute(
                ADD_NOTE_MUTATION,
                AddNoteVariables {
                    bird_id,
                    comment,
                    timestamp,
                },
            )
            .await?;
        Ok(())
    }

    async fn execute<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<T, CatalogError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Http(format!(
                "unexpected status {status} from catalog endpoint"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Http(format!("Failed to read response body: {e}")))?;

        parse_response(&body)
    }
}

/// Interpret a GraphQL response body: surface API errors, then unwrap
/// `data`.
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    let response: GraphqlResponse<T> = serde_json::from_str(body)
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(CatalogError::Api(messages.join("; ")));
    }

    response
        .data
        .ok_or_else(|| CatalogError::InvalidResponse("response carried no data".to_string()))
}
