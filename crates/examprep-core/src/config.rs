//! ExamPrep configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ExamPrepError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamPrepConfig {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl ExamPrepConfig {
    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExamPrepError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ExamPrepError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ExamPrepError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.ingestion.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(ExamPrepError::Config("retrieval.top_k must be at least 1".into()));
        }
        if self.generation.max_count == 0 {
            return Err(ExamPrepError::Config(
                "generation.max_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ExamPrep home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".examprep")
    }
}

/// Which model provider to use and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider")]
    pub name: String,
    /// Empty means "look up the provider's env vars".
    #[serde(default)]
    pub api_key: String,
    /// Overrides the registry base URL when set.
    #[serde(default)]
    pub endpoint: String,
    /// Empty means the provider's default chat model.
    #[serde(default)]
    pub chat_model: String,
    /// Empty means the provider's default embedding model.
    #[serde(default)]
    pub embedding_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Additional provider names tried in order when the primary fails.
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

fn default_provider() -> String { "openai".into() }
fn default_temperature() -> f32 { 0.3 }
fn default_timeout_secs() -> u64 { 60 }

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: default_provider(),
            api_key: String::new(),
            endpoint: String::new(),
            chat_model: String::new(),
            embedding_model: String::new(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            fallbacks: Vec::new(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Where the database and raw uploads live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

fn default_db_path() -> String { "~/.examprep/examprep.db".into() }
fn default_upload_dir() -> String { "~/.examprep/uploads/documents".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            upload_dir: default_upload_dir(),
        }
    }
}

/// Chunking parameters, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize { 500 }
fn default_chunk_overlap() -> usize { 100 }

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl IngestionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ExamPrepError::Config("chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ExamPrepError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize { 5 }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: default_top_k() }
    }
}

/// Question generation limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_count")]
    pub default_count: usize,
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
    /// Hard cap on the context handed to the model, in characters.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_count() -> usize { 10 }
fn default_max_count() -> usize { 30 }
fn default_max_chunks() -> usize { 20 }
fn default_max_context_chars() -> usize { 12_000 }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            max_count: default_max_count(),
            max_chunks: default_max_chunks(),
            max_context_chars: default_max_context_chars(),
        }
    }
}
