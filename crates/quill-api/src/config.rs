use config::builder::DefaultState;
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File, Map, Source};
use quill_types::OrchestratorConfig;
use serde::Deserialize;
use std::path::Path;

/// Environment prefixes and the config section each one overrides,
/// e.g. `SERVER_PORT` → `server.port`, `ORCHESTRATOR_MAX_ROUNDS` → `orchestrator.max_rounds`.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("SERVER", "server"),
    ("SEARCH", "search"),
    ("ORCHESTRATOR", "orchestrator"),
    ("LLM", "llm"),
    ("LOG", "logging"),
    ("THREADS", "threads"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub threads: ThreadsConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds allowed until response headers are sent. A streamed body is
    /// not cut off once its headers are out.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    Elasticsearch,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub backend: SearchBackendKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub index: String,
    /// JSON fixture file for the `memory` backend.
    #[serde(default)]
    pub fixtures_path: Option<String>,
    #[serde(default = "default_search_timeout")]
    pub timeout_ms: u64,
}

fn default_search_timeout() -> u64 {
    5_000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    /// Completion token cap sent to the vendor. Vendor default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature sent to the vendor. Vendor default when unset.
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub anthropic_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadBackendKind {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadsConfig {
    #[serde(default)]
    pub backend: ThreadBackendKind,
    #[serde(default = "default_database")]
    pub database: String,
    /// Append the user's question and the answer to the thread after each turn.
    #[serde(default = "default_record_turns")]
    pub record_turns: bool,
}

fn default_database() -> String {
    "quill".to_string()
}

fn default_record_turns() -> bool {
    true
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        Self {
            backend: ThreadBackendKind::default(),
            database: default_database(),
            record_turns: default_record_turns(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (with SERVER_, SEARCH_, ORCHESTRATOR_, LLM_, LOG_, THREADS_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));
        let builder = with_env_sections(builder, None)?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets come from ENV only, never from TOML
        cfg.openai_api_key = secret("OPENAI_API_KEY");
        cfg.anthropic_api_key = secret("ANTHROPIC_API_KEY");
        cfg.mongodb_uri = secret("MONGODB_URI");

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Cross-field checks that TOML deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.is_none() && self.anthropic_api_key.is_none() {
            return Err(ConfigError::Message(
                "At least one of OPENAI_API_KEY or ANTHROPIC_API_KEY is required".to_string(),
            ));
        }
        if self.threads.backend == ThreadBackendKind::Mongodb && self.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required when threads.backend = \"mongodb\""
                    .to_string(),
            ));
        }
        if self.search.backend == SearchBackendKind::Elasticsearch && self.search.url.is_empty() {
            return Err(ConfigError::Message(
                "search.url is required for the elasticsearch backend".to_string(),
            ));
        }
        Ok(())
    }
}

fn secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Apply `PREFIX_KEY` variables as overrides of `section.key`.
///
/// `source` replaces the process environment, for tests.
fn with_env_sections(
    mut builder: ConfigBuilder<DefaultState>,
    source: Option<Map<String, String>>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (prefix, section) in ENV_SECTIONS {
        let vars = ConfigLoader::builder()
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .try_parsing(true)
                    .source(source.clone()),
            )
            .build()?
            .collect()?;

        for (key, value) in vars {
            builder = builder.set_override(format!("{section}.{key}"), value)?;
        }
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_types::RetrievalMode;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:5173"]

        [search]
        backend = "elasticsearch"
        url = "http://localhost:9200"
        index = "journal"

        [orchestrator]
        mode = "single_shot"
        max_rounds = 3

        [threads]
        backend = "memory"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert_eq!(config.search.backend, SearchBackendKind::Elasticsearch);
        assert_eq!(config.search.timeout_ms, 5_000);
        assert_eq!(config.orchestrator.mode, RetrievalMode::SingleShot);
        assert_eq!(config.orchestrator.max_rounds, 3);
        assert_eq!(config.orchestrator.recent_count, 7);
        assert!(config.threads.record_turns);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_env_sections_override_toml() {
        let env: Map<String, String> = [
            ("SERVER_PORT", "9000"),
            ("ORCHESTRATOR_MAX_ROUNDS", "2"),
            ("LOG_LEVEL", "warn"),
            ("UNRELATED", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let builder = ConfigLoader::builder()
            .add_source(config::File::from_str(TOML, config::FileFormat::Toml));
        let config: Config = with_env_sections(builder, Some(env))
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.orchestrator.max_rounds, 2);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_llm_sampling_options_load_from_env() {
        let env: Map<String, String> = [("LLM_TEMPERATURE", "0.2"), ("LLM_MAX_TOKENS", "512")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let builder = ConfigLoader::builder()
            .add_source(config::File::from_str(TOML, config::FileFormat::Toml));
        let config: Config = with_env_sections(builder, Some(env))
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.llm.temperature, Some(0.2));
        assert_eq!(config.llm.max_tokens, Some(512));

        let unset: Config = toml::from_str(TOML).unwrap();
        assert!(unset.llm.temperature.is_none());
    }

    #[test]
    fn test_validate_requires_a_provider_key() {
        let mut config: Config = toml::from_str(TOML).unwrap();
        assert!(config.validate().is_err());

        config.anthropic_api_key = Some("key".into());
        assert!(config.validate().is_ok());

        config.threads.backend = ThreadBackendKind::Mongodb;
        assert!(config.validate().is_err());
    }
}
