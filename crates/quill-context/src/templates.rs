/// Lead-in used when entries from an earlier turn are reused.
pub const REUSED_ENTRIES_LEAD_IN: &str = "here are the relevant journal entries from our previous conversation:\n";

/// Header for persisted thread history.
pub const PREVIOUS_CONVERSATION_HEADER: &str = "\n\nprevious conversation:\n";

/// Header for unsaved, in-flight history sent with the request.
pub const CURRENT_CONVERSATION_HEADER: &str = "\n\ncurrent conversation:\n";

/// Wrap the grounding context and the user's question into the final prompt.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "\ni am giving you access to some of my journal entries in order to help answer the following question:\n{query}\n\nhere are the journal entries:\n{context}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_places_query_before_context() {
        let prompt = build_prompt("how did i sleep?", "entry 1 (score: 0):\n");

        let q = prompt.find("how did i sleep?").unwrap();
        let c = prompt.find("entry 1").unwrap();
        assert!(q < c);
        assert!(prompt.ends_with("entry 1 (score: 0):\n\n"));
    }
}
