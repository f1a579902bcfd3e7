use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label recorded when an indexing request does not name one.
pub const DEFAULT_SOURCE: &str = "unknown";

/// A unit of document text produced by the upstream splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub page: Option<u32>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            text: text.into(),
            page,
        }
    }
}

/// Everything stored for one collection. Replaced wholesale on every indexing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionIndex {
    pub source: String,
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

impl CollectionIndex {
    /// Build an index, falling back to [`DEFAULT_SOURCE`] for a missing or blank source.
    #[must_use]
    pub fn new(
        source: Option<String>,
        chunks: Vec<Chunk>,
        total_pages: Option<u32>,
        processed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let source = source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_owned());
        Self {
            source,
            chunks,
            total_pages,
            processed_at,
        }
    }
}
