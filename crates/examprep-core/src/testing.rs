//! In-process provider for tests. Enabled with the `testing` feature.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ExamPrepError, Result};
use crate::traits::ModelProvider;
use crate::types::{Message, ModelInfo, ModelKind};

/// Deterministic provider that replays scripted chat replies and derives
/// embeddings from text.
///
/// Embeddings default to a small bag-of-letters vector so that texts sharing
/// words land close to each other. Use [`ScriptedProvider::with_embedding`] to
/// pin an exact vector for a given text.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    pinned: Mutex<Vec<(String, Vec<f32>)>>,
    fail_embeddings: bool,
    short_batches: bool,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful chat reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failing chat call.
    pub fn fail_next(self, message: impl Into<String>) -> Self {
        self.push(Err(ExamPrepError::Provider(message.into())))
    }

    /// Make every embedding call fail.
    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    /// Drop the last vector of every batch embedding call.
    pub fn short_batches(mut self) -> Self {
        self.short_batches = true;
        self
    }

    pub fn with_embedding(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        if let Ok(mut pinned) = self.pinned.lock() {
            pinned.push((text.into(), vector));
        }
        self
    }

    /// Chat requests received so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(self, reply: Result<String>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        if let Ok(pinned) = self.pinned.lock() {
            if let Some((_, v)) = pinned.iter().find(|(t, _)| t == text) {
                return v.clone();
            }
        }
        letter_histogram(text)
    }
}

/// 26-dimensional lowercase letter histogram.
pub fn letter_histogram(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 26];
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    v
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_embeddings {
            return Err(ExamPrepError::Provider("embedding backend unavailable".into()));
        }
        Ok(self.embed(text))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail_embeddings {
            return Err(ExamPrepError::Provider("embedding backend unavailable".into()));
        }
        let mut out: Vec<Vec<f32>> = texts.iter().map(|t| self.embed(t)).collect();
        if self.short_batches {
            out.pop();
        }
        Ok(out)
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        next.unwrap_or_else(|| Err(ExamPrepError::Provider("no scripted reply left".into())))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![
            ModelInfo {
                id: "scripted-chat".into(),
                name: "Scripted Chat".into(),
                provider: "scripted".into(),
                kind: ModelKind::Chat,
            },
            ModelInfo {
                id: "scripted-embed".into(),
                name: "Scripted Embeddings".into(),
                provider: "scripted".into(),
                kind: ModelKind::Embedding,
            },
        ])
    }
}
