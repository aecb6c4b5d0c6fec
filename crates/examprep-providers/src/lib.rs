//! # ExamPrep Providers
//!
//! Embedding and chat model providers for ExamPrep.
//!
//! All supported backends (OpenAI, Gemini, OpenRouter, Ollama, llama.cpp and
//! custom endpoints) are handled by a single `OpenAiCompatibleProvider`,
//! optionally chained through `FailoverProvider` and always bounded by
//! `TimeoutProvider`.

pub mod failover;
pub mod openai_compatible;
pub mod provider_registry;
pub mod timeout;

use examprep_core::config::{ExamPrepConfig, ProviderSettings};
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::traits::ModelProvider;
use std::sync::Arc;
use std::time::Duration;

use failover::FailoverProvider;
use openai_compatible::OpenAiCompatibleProvider;
use timeout::TimeoutProvider;

/// Build the provider stack described by `config.provider`.
pub fn create_provider(config: &ExamPrepConfig) -> Result<Arc<dyn ModelProvider>> {
    let settings = &config.provider;
    let primary = build_single(&settings.name, settings)?;

    let chain: Box<dyn ModelProvider> = if settings.fallbacks.is_empty() {
        primary
    } else {
        // Fallbacks only share the temperature; keys, endpoints and models
        // come from their own registry entries and env vars.
        let fallback_settings = ProviderSettings {
            temperature: settings.temperature,
            ..ProviderSettings::default()
        };
        let fallbacks = settings
            .fallbacks
            .iter()
            .map(|name| build_single(name, &fallback_settings))
            .collect::<Result<Vec<_>>>()?;
        Box::new(FailoverProvider::new(primary, fallbacks))
    };

    tracing::info!(
        "🧠 Provider: {} (fallbacks: {}, timeout: {}s)",
        settings.name,
        settings.fallbacks.len(),
        settings.timeout_secs
    );

    Ok(Arc::new(TimeoutProvider::new(
        chain,
        Duration::from_secs(settings.timeout_secs),
    )))
}

fn build_single(name: &str, settings: &ProviderSettings) -> Result<Box<dyn ModelProvider>> {
    if name.starts_with("custom:") {
        return Ok(Box::new(OpenAiCompatibleProvider::custom(name, settings)?));
    }
    let registry = provider_registry::get_provider_config(name)
        .ok_or_else(|| {
            ExamPrepError::ProviderNotFound(format!(
                "{name} (known: {}, or custom:<url>)",
                provider_registry::all_provider_names().join(", ")
            ))
        })?;
    Ok(Box::new(OpenAiCompatibleProvider::from_registry(
        registry, settings,
    )?))
}
