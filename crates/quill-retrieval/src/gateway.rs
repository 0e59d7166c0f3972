use std::sync::Arc;

use chrono::NaiveDate;
use quill_types::{JournalEntry, RetrievedDoc, DEFAULT_TOP_K};

use crate::backend::SearchBackend;

const MAX_TOP_K: usize = 50;
const DEFAULT_RECENT_COUNT: usize = 7;

/// Where a [`Retrieval`]'s documents came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalSource {
    Backend,
    /// The backend failed and canned entries were substituted.
    Fallback { reason: String },
}

/// Documents returned by the gateway, tagged with their provenance.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub docs: Vec<RetrievedDoc>,
    pub source: RetrievalSource,
}

impl Retrieval {
    fn backend(docs: Vec<RetrievedDoc>) -> Self {
        Self {
            docs,
            source: RetrievalSource::Backend,
        }
    }

    fn fallback(docs: Vec<RetrievedDoc>, reason: String) -> Self {
        Self {
            docs,
            source: RetrievalSource::Fallback { reason },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, RetrievalSource::Fallback { .. })
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.docs.iter().map(|d| d.entry.clone()).collect()
    }
}

/// Front door to the search backend.
///
/// Backend failures never propagate: they are logged and replaced with a
/// small deterministic result set so the conversation keeps working.
#[derive(Clone)]
pub struct RetrievalGateway {
    backend: Arc<dyn SearchBackend>,
    default_top_k: usize,
    max_top_k: usize,
    recent_count: usize,
}

impl RetrievalGateway {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: MAX_TOP_K,
            recent_count: DEFAULT_RECENT_COUNT,
        }
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k.max(1);
        self
    }

    pub fn with_max_top_k(mut self, max: usize) -> Self {
        self.max_top_k = max.max(1);
        self
    }

    pub fn with_recent_count(mut self, n: usize) -> Self {
        self.recent_count = n.max(1);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn recent_count(&self) -> usize {
        self.recent_count
    }

    /// `0` means "use the default"; anything else is clamped to `1..=max`.
    pub fn effective_limit(&self, top_k: usize) -> usize {
        let requested = if top_k == 0 { self.default_top_k } else { top_k };
        requested.clamp(1, self.max_top_k)
    }

    pub async fn search(&self, query: &str, top_k: usize) -> Retrieval {
        let limit = self.effective_limit(top_k);

        match self.backend.similar(query, limit).await {
            Ok(mut docs) => {
                docs.truncate(limit);
                tracing::debug!(backend = self.backend.name(), limit, count = docs.len(), "Similarity search");
                Retrieval::backend(docs)
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "Similarity search failed, using fallback entries");
                Retrieval::fallback(fallback_search(), e.to_string())
            }
        }
    }

    /// Newest entries, sorted by descending date and capped to `n`.
    pub async fn recent(&self, n: Option<usize>) -> Retrieval {
        let n = n.filter(|n| *n > 0).unwrap_or(self.recent_count);

        match self.backend.newest(n).await {
            Ok(mut docs) => {
                sort_newest_first(&mut docs);
                docs.truncate(n);
                tracing::debug!(backend = self.backend.name(), n, count = docs.len(), "Recent entries");
                Retrieval::backend(docs)
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "Recent lookup failed, using fallback entries");
                Retrieval::fallback(fallback_recent(), e.to_string())
            }
        }
    }

    pub async fn date_range(&self, start: NaiveDate, end: NaiveDate, limit: usize) -> Retrieval {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let limit = self.effective_limit(limit);

        match self.backend.date_range(start, end, limit).await {
            Ok(mut docs) => {
                docs.truncate(limit);
                tracing::debug!(backend = self.backend.name(), %start, %end, count = docs.len(), "Date range lookup");
                Retrieval::backend(docs)
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "Date range lookup failed");
                Retrieval::fallback(Vec::new(), e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for RetrievalGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalGateway")
            .field("backend", &self.backend.name())
            .field("default_top_k", &self.default_top_k)
            .field("max_top_k", &self.max_top_k)
            .field("recent_count", &self.recent_count)
            .finish()
    }
}

/// Parsed dates first (newest to oldest), then anything unparseable.
fn sort_newest_first(docs: &mut [RetrievedDoc]) {
    docs.sort_by(|a, b| {
        b.entry
            .day()
            .cmp(&a.entry.day())
            .then_with(|| b.entry.date.cmp(&a.entry.date))
    });
}

fn fallback_search() -> Vec<RetrievedDoc> {
    let entry = JournalEntry::new(
        "mock-1",
        "sample journal entry",
        "this is a sample journal entry for testing",
        "2024-01-01",
    )
    .with_tags(["test"])
    .with_score(0.95);
    vec![RetrievedDoc::from(entry)]
}

fn fallback_recent() -> Vec<RetrievedDoc> {
    let entry = JournalEntry::new(
        "recent-1",
        "recent entry 1",
        "this is a recent journal entry",
        "2024-01-15",
    )
    .with_tags(["recent"])
    .with_score(1.0);
    vec![RetrievedDoc::from(entry)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn gateway() -> RetrievalGateway {
        RetrievalGateway::new(Arc::new(InMemoryBackend::default()))
    }

    #[test]
    fn test_effective_limit() {
        let gw = gateway();
        assert_eq!(gw.effective_limit(0), DEFAULT_TOP_K);
        assert_eq!(gw.effective_limit(3), 3);
        assert_eq!(gw.effective_limit(500), MAX_TOP_K);
    }

    #[test]
    fn test_sort_newest_first_puts_undated_last() {
        let mut docs: Vec<RetrievedDoc> = vec![
            JournalEntry::new("a", "a", "", "unknown").into(),
            JournalEntry::new("b", "b", "", "2024-01-01").into(),
            JournalEntry::new("c", "c", "", "2024-02-01").into(),
        ];

        sort_newest_first(&mut docs);

        let ids: Vec<_> = docs.iter().map(|d| d.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
