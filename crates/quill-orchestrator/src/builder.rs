use std::sync::Arc;

use anyhow::{anyhow, Result};
use quill_context::ContextAssembler;
use quill_llm::ProviderRegistry;
use quill_persist::ThreadStore;
use quill_retrieval::{RetrievalGateway, SearchBackend};
use quill_types::OrchestratorConfig;

use crate::orchestrator::Orchestrator;
use crate::planner::{HeuristicPlanner, SearchPlanner};

/// Builder for constructing an [`Orchestrator`] with optional components
pub struct OrchestratorBuilder {
    backend: Option<Arc<dyn SearchBackend>>,
    llm: Option<Arc<ProviderRegistry>>,
    threads: Option<Arc<dyn ThreadStore>>,
    planner: Option<Arc<dyn SearchPlanner>>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            llm: None,
            threads: None,
            planner: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// Set the search backend
    pub fn search_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the model providers
    pub fn providers(mut self, registry: Arc<ProviderRegistry>) -> Self {
        self.llm = Some(registry);
        self
    }

    /// Read persisted thread history from this store
    pub fn thread_store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.threads = Some(store);
        self
    }

    /// Replace the default [`HeuristicPlanner`]
    pub fn planner(mut self, planner: Arc<dyn SearchPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        let backend = self
            .backend
            .ok_or_else(|| anyhow!("Search backend is required"))?;
        let llm = self
            .llm
            .ok_or_else(|| anyhow!("Provider registry is required"))?;

        if llm.providers().is_empty() {
            return Err(anyhow!("At least one model provider must be registered"));
        }

        let gateway = RetrievalGateway::new(backend)
            .with_default_top_k(self.config.default_top_k)
            .with_max_top_k(self.config.max_top_k)
            .with_recent_count(self.config.recent_count);

        let assembler = match self.config.max_context_tokens {
            Some(max_tokens) => ContextAssembler::with_token_budget(max_tokens)?,
            None => ContextAssembler::new(),
        };

        let planner = self
            .planner
            .unwrap_or_else(|| Arc::new(HeuristicPlanner));

        Ok(Orchestrator::new(
            gateway,
            llm,
            self.threads,
            assembler,
            planner,
            self.config,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
