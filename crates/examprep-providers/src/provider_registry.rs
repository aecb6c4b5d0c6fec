//! Provider registry: maps provider names to endpoint configurations.
//!
//! Every supported backend speaks the OpenAI wire format for both chat
//! completions and embeddings, so a static table is enough to reach any of them.

use examprep_core::types::{ModelInfo, ModelKind};

/// How to attach auth credentials to requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// No authentication required (local servers).
    None,
}

/// Static model definition for a provider.
#[derive(Debug, Clone)]
pub struct ModelDef {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ModelKind,
}

impl ModelDef {
    pub fn to_model_info(&self, provider: &str) -> ModelInfo {
        ModelInfo {
            id: self.id.into(),
            name: self.name.into(),
            provider: provider.into(),
            kind: self.kind,
        }
    }
}

/// Configuration for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub base_url: &'static str,
    pub chat_path: &'static str,
    pub embeddings_path: &'static str,
    pub models_path: &'static str,
    /// Environment variable names to try for the API key (in order).
    pub env_keys: &'static [&'static str],
    pub auth_style: AuthStyle,
    /// Environment variable to override the base URL (e.g., OLLAMA_HOST).
    pub base_url_env: Option<&'static str>,
    pub default_models: &'static [ModelDef],
}

impl ProviderConfig {
    /// First embedding model in the static list, if any.
    pub fn default_embedding_model(&self) -> Option<&'static str> {
        self.default_models
            .iter()
            .find(|m| m.kind == ModelKind::Embedding)
            .map(|m| m.id)
    }

    pub fn default_chat_model(&self) -> Option<&'static str> {
        self.default_models
            .iter()
            .find(|m| m.kind == ModelKind::Chat)
            .map(|m| m.id)
    }
}

// ─── Provider Definitions ────────────────────────────────────────────────────

static OPENAI_MODELS: &[ModelDef] = &[
    ModelDef {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
        kind: ModelKind::Chat,
    },
    ModelDef {
        id: "gpt-4o",
        name: "GPT-4o",
        kind: ModelKind::Chat,
    },
    ModelDef {
        id: "text-embedding-3-small",
        name: "Text Embedding 3 Small",
        kind: ModelKind::Embedding,
    },
];

static GEMINI_MODELS: &[ModelDef] = &[
    ModelDef {
        id: "gemini-2.5-flash",
        name: "Gemini 2.5 Flash",
        kind: ModelKind::Chat,
    },
    ModelDef {
        id: "gemini-2.5-pro",
        name: "Gemini 2.5 Pro",
        kind: ModelKind::Chat,
    },
    ModelDef {
        id: "text-embedding-004",
        name: "Text Embedding 004",
        kind: ModelKind::Embedding,
    },
];

static OPENROUTER_MODELS: &[ModelDef] = &[ModelDef {
    id: "openai/gpt-4o-mini",
    name: "GPT-4o Mini (OpenRouter)",
    kind: ModelKind::Chat,
}];

static OLLAMA_MODELS: &[ModelDef] = &[
    ModelDef {
        id: "llama3.2",
        name: "Llama 3.2 (Ollama)",
        kind: ModelKind::Chat,
    },
    ModelDef {
        id: "nomic-embed-text",
        name: "Nomic Embed Text (Ollama)",
        kind: ModelKind::Embedding,
    },
];

static LLAMACPP_MODELS: &[ModelDef] = &[ModelDef {
    id: "local-model",
    name: "Local llama.cpp Model",
    kind: ModelKind::Chat,
}];

// ─── Registry ────────────────────────────────────────────────────────────────

static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &["OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: Some("OPENAI_API_BASE"),
        default_models: OPENAI_MODELS,
    },
    ProviderConfig {
        name: "gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        default_models: GEMINI_MODELS,
    },
    ProviderConfig {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &["OPENROUTER_API_KEY", "OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        default_models: OPENROUTER_MODELS,
    },
    ProviderConfig {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("OLLAMA_HOST"),
        default_models: OLLAMA_MODELS,
    },
    ProviderConfig {
        name: "llamacpp",
        base_url: "http://localhost:8080/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("LLAMACPP_HOST"),
        default_models: LLAMACPP_MODELS,
    },
];

/// Look up a provider config by name.
pub fn get_provider_config(name: &str) -> Option<&'static ProviderConfig> {
    let lookup = match name {
        "google" => "gemini",
        "llama.cpp" => "llamacpp",
        other => other,
    };
    PROVIDERS.iter().find(|p| p.name == lookup)
}

/// List all known provider names.
pub fn all_provider_names() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.name).collect()
}
