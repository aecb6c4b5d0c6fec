//! Provider Failover: automatic fallback when the primary provider fails.
//!
//! Lightweight failover chain: try primary → fallback₁ → fallback₂.
//! Embeddings are pinned to the primary: vectors from different models are
//! not comparable, so only chat calls move down the chain.

use async_trait::async_trait;
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::traits::ModelProvider;
use examprep_core::types::{Message, ModelInfo};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Per-provider health tracking.
struct ProviderSlot {
    provider: Box<dyn ModelProvider>,
    /// Consecutive failure count.
    failures: AtomicU32,
    /// Timestamp of last failure (unix secs, 0 = never failed).
    last_failure: AtomicU64,
    max_failures: u32,
    /// Seconds before a tripped provider is tried again.
    cooldown_secs: u64,
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl ProviderSlot {
    fn new(provider: Box<dyn ModelProvider>) -> Self {
        Self {
            provider,
            failures: AtomicU32::new(0),
            last_failure: AtomicU64::new(0),
            max_failures: 3,
            cooldown_secs: 60,
        }
    }

    fn is_healthy(&self) -> bool {
        let fails = self.failures.load(Ordering::Relaxed);
        if fails < self.max_failures {
            return true;
        }
        let last = self.last_failure.load(Ordering::Relaxed);
        now_secs().saturating_sub(last) > self.cooldown_secs
    }

    fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.last_failure.store(now_secs(), Ordering::Relaxed);
    }
}

/// Failover provider: tries chat providers in order, skipping unhealthy ones.
pub struct FailoverProvider {
    slots: Vec<ProviderSlot>,
}

impl FailoverProvider {
    /// Create a failover chain. The first provider is primary.
    pub fn new(primary: Box<dyn ModelProvider>, fallbacks: Vec<Box<dyn ModelProvider>>) -> Self {
        let slots = std::iter::once(primary)
            .chain(fallbacks)
            .map(ProviderSlot::new)
            .collect();
        Self { slots }
    }

    fn primary(&self) -> &dyn ModelProvider {
        self.slots[0].provider.as_ref()
    }
}

#[async_trait]
impl ModelProvider for FailoverProvider {
    fn name(&self) -> &str {
        self.primary().name()
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.primary().embed_query(text).await
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.primary().embed_documents(texts).await
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        let mut last_error = None;

        for (idx, slot) in self.slots.iter().enumerate() {
            if !slot.is_healthy() {
                tracing::debug!(
                    "⏭️ Skipping unhealthy provider: {} ({} failures)",
                    slot.provider.name(),
                    slot.failures.load(Ordering::Relaxed)
                );
                continue;
            }

            match slot.provider.invoke(messages).await {
                Ok(response) => {
                    if idx > 0 {
                        tracing::info!(
                            "🔄 Failover: {} → {} (success)",
                            self.primary().name(),
                            slot.provider.name()
                        );
                    }
                    slot.record_success();
                    return Ok(response);
                }
                Err(e) => {
                    slot.record_failure();
                    tracing::warn!(
                        "⚠️ Provider {} failed (attempt {}): {}",
                        slot.provider.name(),
                        slot.failures.load(Ordering::Relaxed),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ExamPrepError::Provider("All providers unhealthy".into())))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let mut all = Vec::new();
        for slot in &self.slots {
            if slot.is_healthy()
                && let Ok(models) = slot.provider.list_models().await
            {
                all.extend(models);
            }
        }
        Ok(all)
    }
}
