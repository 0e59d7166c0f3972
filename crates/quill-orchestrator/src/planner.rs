use chrono::Days;
use quill_retrieval::SearchIntent;

use crate::accumulator::SearchAccumulator;
use crate::tools::SearchTool;

const DATE_WINDOW_DAYS: u64 = 3;

/// Everything a planner may look at when picking the next round.
#[derive(Debug)]
pub struct PlanContext<'a> {
    pub query: &'a str,
    pub intent: SearchIntent,
    /// 1-based number of the round being planned.
    pub round: usize,
    pub top_k: usize,
    pub recent_count: usize,
    pub last_tool: Option<&'a SearchTool>,
    pub accumulator: &'a SearchAccumulator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub tool: SearchTool,
    pub reasoning: String,
}

impl PlannedStep {
    fn new(tool: SearchTool, reasoning: impl Into<String>) -> Self {
        Self {
            tool,
            reasoning: reasoning.into(),
        }
    }
}

/// Decides which retrieval tool runs next. `None` ends the loop.
pub trait SearchPlanner: Send + Sync {
    fn next(&self, ctx: &PlanContext<'_>) -> Option<PlannedStep>;
}

/// Rule-based planner:
/// - round 1 follows the intent (`recent` → newest entries, `vector` → similarity search)
/// - after a similarity search, look at the days around the strongest unexplored hit
/// - after a date-range look, widen the similarity search (top-k doubles each time)
/// - recency turns stop after the newest entries so results stay date-ordered
pub struct HeuristicPlanner;

impl SearchPlanner for HeuristicPlanner {
    fn next(&self, ctx: &PlanContext<'_>) -> Option<PlannedStep> {
        match (ctx.intent, ctx.last_tool) {
            (SearchIntent::None, _) => None,

            (SearchIntent::Recent, None) => Some(PlannedStep::new(
                SearchTool::RecentEntries { n: ctx.recent_count },
                format!("the question is about a recent period, reading the newest {} entries", ctx.recent_count),
            )),
            (SearchIntent::Recent, Some(_)) => None,

            (SearchIntent::Vector, None) => Some(PlannedStep::new(
                SearchTool::VectorSearch {
                    query: ctx.query.to_string(),
                    top_k: ctx.top_k,
                },
                "searching for entries similar to the question",
            )),
            (SearchIntent::Vector, Some(SearchTool::VectorSearch { .. })) => {
                let day = ctx.accumulator.best_unexplored_day()?;
                let start = day.checked_sub_days(Days::new(DATE_WINDOW_DAYS)).unwrap_or(day);
                let end = day.checked_add_days(Days::new(DATE_WINDOW_DAYS)).unwrap_or(day);
                Some(PlannedStep::new(
                    SearchTool::DateRange {
                        start,
                        end,
                        limit: ctx.top_k,
                    },
                    format!("the strongest match is from {day}, checking the surrounding days for context"),
                ))
            }
            (SearchIntent::Vector, Some(_)) => {
                let widenings = ctx.accumulator.rounds_with_tool(SearchTool::VECTOR_SEARCH);
                let top_k = ctx.top_k.saturating_mul(1 << widenings.min(5));
                Some(PlannedStep::new(
                    SearchTool::VectorSearch {
                        query: ctx.query.to_string(),
                        top_k,
                    },
                    format!("widening the similarity search to {top_k} results"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_types::{JournalEntry, RetrievedDoc, SearchIteration};

    fn ctx<'a>(
        intent: SearchIntent,
        last_tool: Option<&'a SearchTool>,
        accumulator: &'a SearchAccumulator,
    ) -> PlanContext<'a> {
        PlanContext {
            query: "running",
            intent,
            round: 1,
            top_k: 5,
            recent_count: 7,
            last_tool,
            accumulator,
        }
    }

    #[test]
    fn test_first_round_follows_intent() {
        let acc = SearchAccumulator::new();

        let recent = HeuristicPlanner.next(&ctx(SearchIntent::Recent, None, &acc)).unwrap();
        assert_eq!(recent.tool, SearchTool::RecentEntries { n: 7 });

        let vector = HeuristicPlanner.next(&ctx(SearchIntent::Vector, None, &acc)).unwrap();
        assert_eq!(vector.tool.name(), "vector_search");

        assert!(HeuristicPlanner.next(&ctx(SearchIntent::None, None, &acc)).is_none());
    }

    #[test]
    fn test_vector_then_date_range_around_best_hit() {
        let mut acc = SearchAccumulator::new();
        acc.absorb(vec![
            RetrievedDoc::from(JournalEntry::new("a", "a", "", "2024-01-10").with_score(0.9)),
            RetrievedDoc::from(JournalEntry::new("b", "b", "", "2024-03-01").with_score(0.2)),
        ]);
        let last = SearchTool::VectorSearch {
            query: "running".into(),
            top_k: 5,
        };

        let step = HeuristicPlanner.next(&ctx(SearchIntent::Vector, Some(&last), &acc)).unwrap();

        assert_eq!(step.tool.query_label().as_deref(), Some("2024-01-07..2024-01-13"));
    }

    #[test]
    fn test_date_range_then_widened_vector_search() {
        let mut acc = SearchAccumulator::new();
        acc.record(SearchIteration {
            iteration: 1,
            tool: "vector_search".into(),
            reasoning: String::new(),
            query: None,
            results_count: 0,
            new_entries_added: 0,
        });
        let last = SearchTool::RecentEntries { n: 7 };

        let step = HeuristicPlanner.next(&ctx(SearchIntent::Vector, Some(&last), &acc)).unwrap();

        assert_eq!(
            step.tool,
            SearchTool::VectorSearch {
                query: "running".into(),
                top_k: 10
            }
        );
    }

    #[test]
    fn test_recency_turns_stop_after_first_round() {
        let acc = SearchAccumulator::new();
        let last = SearchTool::RecentEntries { n: 7 };
        assert!(HeuristicPlanner.next(&ctx(SearchIntent::Recent, Some(&last), &acc)).is_none());
    }
}
