//! Fixture-backed [`SearchBackend`] for local development and tests.
//!
//! Similarity is keyword overlap between the query and an entry's title,
//! text and tags.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use quill_types::{JournalEntry, RetrievedDoc};

use super::SearchBackend;
use crate::error::{Result, RetrievalError};

pub struct InMemoryBackend {
    entries: RwLock<Vec<JournalEntry>>,
}

impl InMemoryBackend {
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Load entries from a JSON array file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<JournalEntry> = serde_json::from_str(&raw)?;
        Ok(Self::new(entries))
    }

    pub fn insert(&self, entry: JournalEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| RetrievalError::Unavailable("entry store lock poisoned".into()))?
            .push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Vec<JournalEntry>> {
        self.entries
            .read()
            .map(|e| e.clone())
            .map_err(|_| RetrievalError::Unavailable("entry store lock poisoned".into()))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
        .map(str::to_lowercase)
        .collect()
}

fn overlap_score(query_terms: &[String], entry: &JournalEntry) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let haystack = format!("{} {} {}", entry.title, entry.text, entry.tags.join(" ")).to_lowercase();
    let hits = query_terms.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits as f32 / query_terms.len() as f32
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn similar(&self, query: &str, limit: usize) -> Result<Vec<RetrievedDoc>> {
        let query_terms = terms(query);
        let mut scored: Vec<(f32, JournalEntry)> = self
            .snapshot()?
            .into_iter()
            .map(|entry| (overlap_score(&query_terms, &entry), entry))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, entry)| RetrievedDoc::new(entry.with_score(score), Some(1.0 - score)))
            .collect())
    }

    async fn newest(&self, n: usize) -> Result<Vec<RetrievedDoc>> {
        let mut entries = self.snapshot()?;
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries.into_iter().take(n).map(RetrievedDoc::from).collect())
    }

    async fn date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RetrievedDoc>> {
        let mut entries: Vec<JournalEntry> = self
            .snapshot()?
            .into_iter()
            .filter(|e| e.day().is_some_and(|d| d >= start && d <= end))
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(entries.into_iter().take(limit).map(RetrievedDoc::from).collect())
    }
}
