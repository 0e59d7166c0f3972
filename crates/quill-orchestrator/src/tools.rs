use chrono::NaiveDate;
use quill_retrieval::{Retrieval, RetrievalGateway};
use serde::Serialize;

/// One retrieval action the agentic loop can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum SearchTool {
    VectorSearch { query: String, top_k: usize },
    RecentEntries { n: usize },
    DateRange {
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    },
}

impl SearchTool {
    pub const VECTOR_SEARCH: &'static str = "vector_search";
    pub const RECENT_ENTRIES: &'static str = "recent_entries";
    pub const DATE_RANGE: &'static str = "date_range";

    pub fn name(&self) -> &'static str {
        match self {
            Self::VectorSearch { .. } => Self::VECTOR_SEARCH,
            Self::RecentEntries { .. } => Self::RECENT_ENTRIES,
            Self::DateRange { .. } => Self::DATE_RANGE,
        }
    }

    /// Value reported as `query` in the iteration record.
    pub fn query_label(&self) -> Option<String> {
        match self {
            Self::VectorSearch { query, .. } => Some(query.clone()),
            Self::RecentEntries { .. } => None,
            Self::DateRange { start, end, .. } => Some(format!("{start}..{end}")),
        }
    }

    pub async fn execute(&self, gateway: &RetrievalGateway) -> Retrieval {
        match self {
            Self::VectorSearch { query, top_k } => gateway.search(query, *top_k).await,
            Self::RecentEntries { n } => gateway.recent(Some(*n)).await,
            Self::DateRange { start, end, limit } => gateway.date_range(*start, *end, *limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_labels() {
        let range = SearchTool::DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            limit: 5,
        };

        assert_eq!(range.name(), "date_range");
        assert_eq!(range.query_label().as_deref(), Some("2024-01-01..2024-01-07"));
        assert_eq!(SearchTool::RecentEntries { n: 7 }.query_label(), None);
    }
}
