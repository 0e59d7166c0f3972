use std::fmt::Write;

use anyhow::Result;
use quill_types::{JournalEntry, Message, RetrievedDoc};

use crate::budget::TokenBudget;
use crate::templates::{CURRENT_CONVERSATION_HEADER, PREVIOUS_CONVERSATION_HEADER, REUSED_ENTRIES_LEAD_IN};

/// Entries to format, and which formatting variant applies.
#[derive(Debug, Clone, Copy)]
pub enum EntryBlock<'a> {
    /// Fresh results from this turn: index, score, title, text, date, tags.
    Retrieved(&'a [RetrievedDoc]),
    /// Entries carried over from an earlier turn: prose lead-in, title, content.
    Reused(&'a [JournalEntry]),
}

impl EntryBlock<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Retrieved(docs) => docs.len(),
            Self::Reused(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render(&self, take: usize) -> String {
        match self {
            Self::Retrieved(docs) => format_retrieved(&docs[..take.min(docs.len())]),
            Self::Reused(entries) => format_reused(&entries[..take.min(entries.len())]),
        }
    }
}

/// Result of a budgeted assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    pub text: String,
    /// How many leading entries made it into `text`.
    pub entries_used: usize,
}

/// Builds the grounding block: entries, then thread history, then the
/// in-flight history. Output is a pure function of the inputs.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    budget: Option<TokenBudget>,
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_budget(max_tokens: usize) -> Result<Self> {
        Ok(Self {
            budget: Some(TokenBudget::new(max_tokens)?),
        })
    }

    pub fn budget(&self) -> Option<&TokenBudget> {
        self.budget.as_ref()
    }

    pub fn assemble(
        &self,
        entries: EntryBlock<'_>,
        thread_history: &[Message],
        temp_history: &[Message],
    ) -> String {
        let history = render_histories(thread_history, temp_history);
        entries.render(entries.len()) + &history
    }

    /// Like [`assemble`](Self::assemble), but drops trailing entries until the
    /// block fits the token budget. History is never trimmed.
    pub fn assemble_within_budget(
        &self,
        entries: EntryBlock<'_>,
        thread_history: &[Message],
        temp_history: &[Message],
    ) -> AssembledContext {
        let history = render_histories(thread_history, temp_history);
        let total = entries.len();

        let Some(budget) = &self.budget else {
            return AssembledContext {
                text: entries.render(total) + &history,
                entries_used: total,
            };
        };

        for take in (0..=total).rev() {
            let text = entries.render(take) + &history;
            if take == 0 || budget.fits(&text) {
                if take < total {
                    tracing::debug!(
                        dropped = total - take,
                        max_tokens = budget.max_tokens(),
                        "Trimmed entries to fit context budget"
                    );
                }
                return AssembledContext {
                    text,
                    entries_used: take,
                };
            }
        }

        AssembledContext {
            text: history,
            entries_used: 0,
        }
    }
}

fn format_retrieved(docs: &[RetrievedDoc]) -> String {
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        let entry = &doc.entry;
        let _ = writeln!(out, "entry {} (score: {}):", i + 1, entry.score.unwrap_or(0.0));
        let _ = writeln!(out, "  title: {}", entry.title);
        let _ = writeln!(out, "  text: {}", entry.text);
        let _ = writeln!(out, "  date: {}", entry.date);
        if !entry.tags.is_empty() {
            let _ = writeln!(out, "  tags: {}", entry.tags.join(", "));
        }
        out.push('\n');
    }
    out
}

fn format_reused(entries: &[JournalEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut out = String::from(REUSED_ENTRIES_LEAD_IN);
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "entry {}:", i + 1);
        let _ = writeln!(out, "  title: {}", entry.title);
        let _ = writeln!(out, "  content: {}\n", entry.text);
    }
    out
}

fn format_history(header: &str, messages: &[Message]) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let mut out = String::from(header);
    for msg in messages {
        let _ = writeln!(out, "{}: {}", msg.role, msg.content);
    }
    out
}

fn render_histories(thread_history: &[Message], temp_history: &[Message]) -> String {
    format_history(PREVIOUS_CONVERSATION_HEADER, thread_history)
        + &format_history(CURRENT_CONVERSATION_HEADER, temp_history)
}
