use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use quill_llm::{ChatOptions, ProviderConfig, ProviderRegistry};
use quill_orchestrator::{Orchestrator, OrchestratorBuilder};
use quill_persist::{InMemoryThreadStore, ThreadStore};
use quill_retrieval::{ElasticsearchBackend, ElasticsearchConfig, InMemoryBackend, SearchBackend};

use crate::config::{Config, SearchBackendKind, ThreadBackendKind};

/// Shared application state passed to all handlers
///
/// The orchestrator holds no per-request state, so a single instance is
/// created at startup and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
    pub threads: Arc<dyn ThreadStore>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Orchestrator, threads: Arc<dyn ThreadStore>) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            threads,
        }
    }

    /// Wire up search, model providers and thread storage from `config`.
    pub async fn from_config(config: Config) -> Result<Self> {
        let backend = search_backend(&config)?;
        let registry = provider_registry(&config)?;
        let threads = thread_store(&config).await?;

        tracing::info!(
            search = backend.name(),
            providers = ?registry.providers(),
            mode = %config.orchestrator.mode,
            "Initializing orchestrator"
        );

        let orchestrator = OrchestratorBuilder::new()
            .search_backend(backend)
            .providers(Arc::new(registry))
            .thread_store(Arc::clone(&threads))
            .config(config.orchestrator.clone())
            .build()?;

        Ok(Self::new(config, orchestrator, threads))
    }

    /// Name of the configured thread storage, for health reporting.
    pub fn thread_backend(&self) -> &'static str {
        match self.config.threads.backend {
            ThreadBackendKind::Memory => "memory",
            ThreadBackendKind::Mongodb => "mongodb",
        }
    }
}

fn search_backend(config: &Config) -> Result<Arc<dyn SearchBackend>> {
    match config.search.backend {
        SearchBackendKind::Elasticsearch => {
            let es = ElasticsearchConfig {
                url: config.search.url.clone(),
                index: config.search.index.clone(),
                timeout_ms: config.search.timeout_ms,
            };
            Ok(Arc::new(ElasticsearchBackend::new(es)?))
        }
        SearchBackendKind::Memory => match &config.search.fixtures_path {
            Some(path) => {
                let backend = InMemoryBackend::from_file(path)
                    .with_context(|| format!("Failed to load journal fixtures from {path}"))?;
                tracing::info!(entries = backend.len(), path = %path, "Loaded journal fixtures");
                Ok(Arc::new(backend))
            }
            None => {
                tracing::warn!("No fixtures_path configured, in-memory search starts empty");
                Ok(Arc::new(InMemoryBackend::new(Vec::new())))
            }
        },
    }
}

fn provider_registry(config: &Config) -> Result<ProviderRegistry> {
    let mut providers = Vec::new();

    if let Some(key) = &config.openai_api_key {
        let mut provider = ProviderConfig::openai(key.clone());
        if let Some(url) = &config.llm.openai_base_url {
            provider = provider.with_base_url(url.clone());
        }
        providers.push(provider);
    }
    if let Some(key) = &config.anthropic_api_key {
        let mut provider = ProviderConfig::anthropic(key.clone());
        if let Some(url) = &config.llm.anthropic_base_url {
            provider = provider.with_base_url(url.clone());
        }
        providers.push(provider);
    }

    if providers.is_empty() {
        return Err(anyhow!("No model provider API key configured"));
    }

    let mut options = ChatOptions::new();
    if let Some(max_tokens) = config.llm.max_tokens {
        options = options.max_tokens(max_tokens);
    }
    if let Some(temperature) = config.llm.temperature {
        options = options.temperature(temperature);
    }

    Ok(ProviderRegistry::from_configs(providers)?.with_options(options))
}

async fn thread_store(config: &Config) -> Result<Arc<dyn ThreadStore>> {
    match config.threads.backend {
        ThreadBackendKind::Memory => Ok(Arc::new(InMemoryThreadStore::new())),
        #[cfg(feature = "mongodb")]
        ThreadBackendKind::Mongodb => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| anyhow!("MONGODB_URI is required for the mongodb thread store"))?;
            tracing::info!(database = %config.threads.database, "Connecting to MongoDB");
            let store =
                quill_persist::MongoThreadStore::connect(uri, &config.threads.database).await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        ThreadBackendKind::Mongodb => Err(anyhow!(
            "threads.backend = \"mongodb\" requires the `mongodb` feature"
        )),
    }
}
