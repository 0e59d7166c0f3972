use std::collections::HashSet;

use chrono::NaiveDate;
use quill_types::{RetrievedDoc, SearchIteration};

/// Running, de-duplicated entry set for one turn.
///
/// Entries keep the order they were first seen; a later duplicate (by
/// [`identity`](quill_types::JournalEntry::identity)) is dropped even if its
/// score differs.
#[derive(Debug, Clone, Default)]
pub struct SearchAccumulator {
    seen: HashSet<String>,
    docs: Vec<RetrievedDoc>,
    iterations: Vec<SearchIteration>,
    explored_ranges: Vec<(NaiveDate, NaiveDate)>,
}

impl SearchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a round's results. Returns how many were new.
    pub fn absorb(&mut self, docs: impl IntoIterator<Item = RetrievedDoc>) -> usize {
        let before = self.docs.len();
        for doc in docs {
            if self.seen.insert(doc.entry.identity()) {
                self.docs.push(doc);
            }
        }
        self.docs.len() - before
    }

    pub fn record(&mut self, iteration: SearchIteration) {
        self.iterations.push(iteration);
    }

    pub fn mark_explored(&mut self, start: NaiveDate, end: NaiveDate) {
        self.explored_ranges.push((start, end));
    }

    pub fn is_explored(&self, day: NaiveDate) -> bool {
        self.explored_ranges
            .iter()
            .any(|(start, end)| day >= *start && day <= *end)
    }

    /// Highest-scored dated entry whose day has not been explored yet.
    pub fn best_unexplored_day(&self) -> Option<NaiveDate> {
        self.docs
            .iter()
            .filter_map(|doc| Some((doc.entry.score.unwrap_or(0.0), doc.entry.day()?)))
            .filter(|(_, day)| !self.is_explored(*day))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, day)| day)
    }

    pub fn rounds_with_tool(&self, tool: &str) -> usize {
        self.iterations.iter().filter(|i| i.tool == tool).count()
    }

    pub fn docs(&self) -> &[RetrievedDoc] {
        &self.docs
    }

    pub fn iterations(&self) -> &[SearchIteration] {
        &self.iterations
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn into_docs(self) -> Vec<RetrievedDoc> {
        self.docs
    }
}
