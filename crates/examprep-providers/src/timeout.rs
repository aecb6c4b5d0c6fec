//! Deadline wrapper so a stalled upstream cannot hold a request open.

use async_trait::async_trait;
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::traits::ModelProvider;
use examprep_core::types::{Message, ModelInfo};
use std::future::Future;
use std::time::Duration;

/// Bounds every call of the inner provider by a fixed deadline.
pub struct TimeoutProvider {
    inner: Box<dyn ModelProvider>,
    limit: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Box<dyn ModelProvider>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("⏱️ {} exceeded {:?}", self.inner.name(), self.limit);
                Err(ExamPrepError::ProviderTimeout {
                    provider: self.inner.name().to_string(),
                    secs: self.limit.as_secs(),
                })
            }
        }
    }
}

#[async_trait]
impl ModelProvider for TimeoutProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.bounded(self.inner.embed_query(text)).await
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.bounded(self.inner.embed_documents(texts)).await
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        self.bounded(self.inner.invoke(messages)).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.bounded(self.inner.list_models()).await
    }
}
