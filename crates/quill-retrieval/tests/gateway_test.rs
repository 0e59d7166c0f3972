use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use quill_retrieval::{
    InMemoryBackend, RetrievalError, RetrievalGateway, RetrievalSource, SearchBackend,
};
use quill_types::{JournalEntry, RetrievedDoc};

struct DownBackend;

#[async_trait]
impl SearchBackend for DownBackend {
    fn name(&self) -> &str {
        "down"
    }

    async fn similar(&self, _query: &str, _limit: usize) -> Result<Vec<RetrievedDoc>, RetrievalError> {
        Err(RetrievalError::Unavailable("connection refused".into()))
    }

    async fn newest(&self, _n: usize) -> Result<Vec<RetrievedDoc>, RetrievalError> {
        Err(RetrievalError::Unavailable("connection refused".into()))
    }

    async fn date_range(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
        _limit: usize,
    ) -> Result<Vec<RetrievedDoc>, RetrievalError> {
        Err(RetrievalError::Unavailable("connection refused".into()))
    }
}

/// Returns entries in whatever order they were given, ignoring `n`.
struct UnsortedBackend(Vec<JournalEntry>);

#[async_trait]
impl SearchBackend for UnsortedBackend {
    fn name(&self) -> &str {
        "unsorted"
    }

    async fn similar(&self, _query: &str, _limit: usize) -> Result<Vec<RetrievedDoc>, RetrievalError> {
        Ok(self.0.iter().cloned().map(RetrievedDoc::from).collect())
    }

    async fn newest(&self, _n: usize) -> Result<Vec<RetrievedDoc>, RetrievalError> {
        Ok(self.0.iter().cloned().map(RetrievedDoc::from).collect())
    }

    async fn date_range(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
        _limit: usize,
    ) -> Result<Vec<RetrievedDoc>, RetrievalError> {
        Ok(Vec::new())
    }
}

fn dated(id: &str, date: &str) -> JournalEntry {
    JournalEntry::new(id, format!("entry {id}"), "text", date)
}

#[tokio::test]
async fn test_search_failure_degrades_to_fallback() {
    let gateway = RetrievalGateway::new(Arc::new(DownBackend));

    let retrieval = gateway.search("how was my week", 5).await;

    assert!(retrieval.is_fallback());
    assert_eq!(retrieval.docs.len(), 1);
    assert_eq!(retrieval.docs[0].entry.id, "mock-1");
    assert!(matches!(
        retrieval.source,
        RetrievalSource::Fallback { ref reason } if reason.contains("connection refused")
    ));
}

#[tokio::test]
async fn test_recent_failure_degrades_to_fallback() {
    let gateway = RetrievalGateway::new(Arc::new(DownBackend));

    let retrieval = gateway.recent(None).await;

    assert!(retrieval.is_fallback());
    assert_eq!(retrieval.docs[0].entry.id, "recent-1");
}

#[tokio::test]
async fn test_recent_resorts_and_caps() {
    let entries: Vec<JournalEntry> = (1..=10)
        .map(|day| dated(&day.to_string(), &format!("2024-03-{day:02}")))
        .collect();
    let gateway = RetrievalGateway::new(Arc::new(UnsortedBackend(entries)));

    let retrieval = gateway.recent(None).await;

    assert_eq!(retrieval.source, RetrievalSource::Backend);
    assert_eq!(retrieval.docs.len(), 7);
    let dates: Vec<_> = retrieval.docs.iter().map(|d| d.entry.date.clone()).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
    assert_eq!(dates[0], "2024-03-10");
}

#[tokio::test]
async fn test_search_truncates_to_effective_limit() {
    let entries: Vec<JournalEntry> = (1..=8).map(|i| dated(&i.to_string(), "2024-01-01")).collect();
    let gateway = RetrievalGateway::new(Arc::new(UnsortedBackend(entries)));

    assert_eq!(gateway.search("anything", 3).await.docs.len(), 3);
    assert_eq!(gateway.search("anything", 0).await.docs.len(), 5);
}

#[tokio::test]
async fn test_in_memory_search_through_gateway() {
    let backend = InMemoryBackend::new(vec![
        dated("a", "2024-01-01"),
        JournalEntry::new("b", "Garden", "planted tomatoes", "2024-01-02"),
    ]);
    let gateway = RetrievalGateway::new(Arc::new(backend));

    let retrieval = gateway.search("tomatoes in the garden", 5).await;

    assert!(!retrieval.is_fallback());
    assert_eq!(retrieval.entries()[0].id, "b");
}
