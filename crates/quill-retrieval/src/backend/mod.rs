mod elasticsearch;
mod memory;

pub use elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
pub use memory::InMemoryBackend;

use async_trait::async_trait;
use chrono::NaiveDate;
use quill_types::RetrievedDoc;

use crate::error::Result;

/// A document-search service holding journal entries.
///
/// Implementations only read; they must be `Send + Sync` to be shared across
/// request handlers.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short name used in logs, e.g. `"elasticsearch"`.
    fn name(&self) -> &str;

    /// Top `limit` entries by similarity to `query`.
    async fn similar(&self, query: &str, limit: usize) -> Result<Vec<RetrievedDoc>>;

    /// The `n` newest entries.
    async fn newest(&self, n: usize) -> Result<Vec<RetrievedDoc>>;

    /// Entries dated within `[start, end]`, oldest first.
    async fn date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RetrievedDoc>>;
}
