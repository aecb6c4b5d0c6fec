//! Model provider contract.
//!
//! Retrieval, ingestion and question generation receive an
//! `Arc<dyn ModelProvider>` at construction; nothing looks providers up at
//! request time.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ModelInfo};

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. Output order matches input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Run a chat completion and return the assistant text.
    async fn invoke(&self, messages: &[Message]) -> Result<String>;

    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}
