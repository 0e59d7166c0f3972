use std::sync::Arc;

use anyhow::Result;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Token ceiling for the grounding block, counted with `cl100k_base`.
#[derive(Clone)]
pub struct TokenBudget {
    max_tokens: usize,
    bpe: Arc<CoreBPE>,
}

impl TokenBudget {
    pub fn new(max_tokens: usize) -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| anyhow::anyhow!("Tokenizer error: {}", e))?;
        Ok(Self {
            max_tokens,
            bpe: Arc::new(bpe),
        })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    pub fn fits(&self, text: &str) -> bool {
        self.count(text) <= self.max_tokens
    }
}

impl std::fmt::Debug for TokenBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBudget")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
