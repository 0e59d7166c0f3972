use serde::{Deserialize, Serialize};

/// Substrings that turn a query into a recency lookup.
pub const RECENCY_MARKERS: [&str; 6] = ["recent", "lately", "last", "this week", "today", "yesterday"];

const MIN_QUERY_LEN: usize = 3;

/// Retrieval strategy chosen for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    Vector,
    Recent,
    None,
}

impl SearchIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Recent => "recent",
            Self::None => "none",
        }
    }
}

/// Map a raw query to a retrieval strategy. Total over all strings.
///
/// Recency markers win over the length check, so `"today"` is `Recent`.
pub fn classify(query: &str) -> SearchIntent {
    let lowered = query.to_lowercase();
    if RECENCY_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return SearchIntent::Recent;
    }

    if query.trim().chars().count() < MIN_QUERY_LEN {
        return SearchIntent::None;
    }

    SearchIntent::Vector
}
