//! Unified OpenAI-compatible provider.
//!
//! A single struct that handles chat completions and embeddings for every
//! OpenAI-compatible API. Providers differ only by endpoint URL, auth style,
//! API key and model names.

use async_trait::async_trait;
use examprep_core::config::ProviderSettings;
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::traits::ModelProvider;
use examprep_core::types::{Message, ModelInfo, ModelKind};
use serde_json::{Value, json};

use crate::provider_registry::{AuthStyle, ProviderConfig};

/// A unified provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "openai", "gemini", "ollama").
    name: String,
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    chat_path: String,
    embeddings_path: String,
    models_path: String,
    auth_style: AuthStyle,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
    /// Returned from `list_models` when the API listing is unavailable.
    default_models: Vec<ModelInfo>,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a known provider config plus user settings.
    ///
    /// Resolution order:
    /// - API key: `settings.api_key` > env vars > empty
    /// - Base URL: `settings.endpoint` > env override > registry default
    /// - Models: `settings.*_model` > registry default
    pub fn from_registry(registry: &ProviderConfig, settings: &ProviderSettings) -> Result<Self> {
        let api_key = if !settings.api_key.is_empty() {
            settings.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };

        let base_url = if !settings.endpoint.is_empty() {
            settings.endpoint.trim_end_matches('/').to_string()
        } else {
            registry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // OLLAMA_HOST / LLAMACPP_HOST usually omit the /v1 suffix
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| registry.base_url.to_string())
        };

        let chat_model = pick_model(&settings.chat_model, registry.default_chat_model())
            .ok_or_else(|| {
                ExamPrepError::Config(format!("No chat model configured for {}", registry.name))
            })?;
        let embedding_model =
            pick_model(&settings.embedding_model, registry.default_embedding_model())
                .ok_or_else(|| {
                    ExamPrepError::Config(format!(
                        "No embedding model configured for {}",
                        registry.name
                    ))
                })?;

        let default_models = registry
            .default_models
            .iter()
            .map(|m| m.to_model_info(registry.name))
            .collect();

        Ok(Self {
            name: registry.name.to_string(),
            api_key,
            base_url,
            chat_path: registry.chat_path.to_string(),
            embeddings_path: registry.embeddings_path.to_string(),
            models_path: registry.models_path.to_string(),
            auth_style: registry.auth_style,
            chat_model,
            embedding_model,
            temperature: settings.temperature,
            default_models,
            client: reqwest::Client::new(),
        })
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    /// Both model names must be set explicitly.
    pub fn custom(endpoint: &str, settings: &ProviderSettings) -> Result<Self> {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        if settings.chat_model.is_empty() || settings.embedding_model.is_empty() {
            return Err(ExamPrepError::Config(
                "custom providers need provider.chat_model and provider.embedding_model".into(),
            ));
        }

        let api_key = if !settings.api_key.is_empty() {
            settings.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Ok(Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            embeddings_path: "/embeddings".to_string(),
            models_path: "/models".to_string(),
            auth_style,
            chat_model: settings.chat_model.clone(),
            embedding_model: settings.embedding_model.clone(),
            temperature: settings.temperature,
            default_models: vec![],
            client: reqwest::Client::new(),
        })
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

    fn check_key(&self) -> Result<()> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(ExamPrepError::ApiKeyMissing(self.name.clone()));
        }
        Ok(())
    }

    /// POST a JSON body and return the parsed JSON response.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.check_key()?;

        let url = format!("{}{}", self.base_url, path);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        let req = self.apply_auth(req);

        let resp = req.send().await.map_err(|e| {
            ExamPrepError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ExamPrepError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        resp.json()
            .await
            .map_err(|e| ExamPrepError::Http(e.to_string()))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });
        let json = self.post_json(&self.embeddings_path, &body).await?;
        let vectors = parse_embeddings(&json)
            .ok_or_else(|| ExamPrepError::Provider(format!("{}: malformed embeddings response", self.name)))?;
        if vectors.len() != inputs.len() {
            return Err(ExamPrepError::Provider(format!(
                "{} returned {} embeddings for {} inputs",
                self.name,
                vectors.len(),
                inputs.len()
            )));
        }
        Ok(vectors)
    }
}

fn pick_model(configured: &str, fallback: Option<&'static str>) -> Option<String> {
    if configured.is_empty() {
        fallback.map(String::from)
    } else {
        Some(configured.to_string())
    }
}

/// Extract vectors from an OpenAI embeddings response, ordered by `index`.
pub fn parse_embeddings(json: &Value) -> Option<Vec<Vec<f32>>> {
    let data = json["data"].as_array()?;
    let mut rows: Vec<(u64, Vec<f32>)> = data
        .iter()
        .enumerate()
        .map(|(pos, item)| {
            let index = item["index"].as_u64().unwrap_or(pos as u64);
            let vector = item["embedding"]
                .as_array()?
                .iter()
                .map(|v| v.as_f64().map(|f| f as f32))
                .collect::<Option<Vec<f32>>>()?;
            Some((index, vector))
        })
        .collect::<Option<Vec<_>>>()?;
    rows.sort_by_key(|(index, _)| *index);
    Some(rows.into_iter().map(|(_, v)| v).collect())
}

/// Extract the assistant text from a chat completion response.
pub fn parse_chat_content(json: &Value) -> Option<String> {
    let choice = json["choices"].get(0)?;
    match &choice["message"]["content"] {
        Value::String(s) => Some(s.clone()),
        // Some gateways return content as an array of text parts.
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join(""),
        ),
        _ => None,
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ExamPrepError::Provider(format!("{}: empty embeddings response", self.name)))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        tracing::debug!("🧮 {}: embedding {} texts", self.name, texts.len());
        self.embed(texts).await
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        let body = json!({
            "model": self.chat_model,
            "temperature": self.temperature,
            "messages": messages,
        });
        let json = self.post_json(&self.chat_path, &body).await?;
        parse_chat_content(&json)
            .ok_or_else(|| ExamPrepError::Provider(format!("{}: no choices in response", self.name)))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}{}", self.base_url, self.models_path);
        let req = self.apply_auth(self.client.get(&url));

        match req.send().await {
            Ok(r) if r.status().is_success() => {
                let json: Value = r.json().await.unwrap_or_default();
                let models: Vec<ModelInfo> = json["data"]
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|m| {
                                let id = m["id"].as_str()?;
                                let kind = if id.contains("embed") {
                                    ModelKind::Embedding
                                } else {
                                    ModelKind::Chat
                                };
                                Some(ModelInfo {
                                    id: id.to_string(),
                                    name: id.to_string(),
                                    provider: self.name.clone(),
                                    kind,
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                if models.is_empty() {
                    Ok(self.default_models.clone())
                } else {
                    Ok(models)
                }
            }
            _ => Ok(self.default_models.clone()),
        }
    }
}
