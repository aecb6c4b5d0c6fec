//! Question generation: context → one chat call → validated, persisted MCQs.

use examprep_core::config::GenerationConfig;
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::traits::ModelProvider;
use examprep_core::types::{Mcq, Message};
use examprep_db::StudyDb;
use std::sync::Arc;

use crate::context::build_context;
use crate::parse::ResponseParser;

const SYSTEM_PROMPT: &str = r#"You are an expert exam-setter for Indian competitive exams (UPSC/SSC etc.).
Generate high-quality MCQs ONLY from the provided context. Follow these rules strictly:
- Each question must have EXACTLY 4 options (A, B, C, D) but return options as an array of 4 strings.
- Provide the correctAnswer as a zero-based index (0..3).
- Provide a short, precise explanation citing the context.
- Balance difficulty across easy/medium/hard, default medium.
- Do not include content outside the context. Avoid ambiguous questions.
Return ONLY valid JSON with the following shape: { "mcqs": [ { "question": string, "options": string[4], "correctAnswer": number, "explanation": string, "difficulty": "easy"|"medium"|"hard" } ] }"#;

pub const NO_CHUNKS_MESSAGE: &str =
    "No chunks found for this document. Please ensure processing completed.";

pub struct QuestionGenerator {
    db: Arc<StudyDb>,
    provider: Arc<dyn ModelProvider>,
    config: GenerationConfig,
    parser: ResponseParser,
}

impl QuestionGenerator {
    pub fn new(
        db: Arc<StudyDb>,
        provider: Arc<dyn ModelProvider>,
        config: GenerationConfig,
    ) -> Result<Self> {
        Ok(Self {
            db,
            provider,
            config,
            parser: ResponseParser::new()?,
        })
    }

    /// Number of questions actually requested for a caller's `count`.
    pub fn effective_count(&self, count: Option<i64>) -> usize {
        let max = self.config.max_count.max(1) as i64;
        count
            .unwrap_or(self.config.default_count as i64)
            .clamp(1, max) as usize
    }

    pub async fn generate(
        &self,
        document_id: i64,
        count: Option<i64>,
        max_chunks: Option<i64>,
    ) -> Result<Vec<Mcq>> {
        if self.db.get_document(document_id)?.is_none() {
            return Err(ExamPrepError::not_found("Document not found"));
        }
        let chunks = self.db.chunks_for_document(document_id)?;
        if chunks.is_empty() {
            return Err(ExamPrepError::validation(NO_CHUNKS_MESSAGE));
        }

        let count = self.effective_count(count);
        let max_chunks = max_chunks
            .map(|m| m.max(1) as usize)
            .unwrap_or(self.config.max_chunks);
        let context = build_context(&chunks, max_chunks, self.config.max_context_chars);
        tracing::info!(
            "📝 Generating {count} MCQs for document {document_id} ({} context chars)",
            context.chars().count()
        );

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("Context:\n{context}\n\nGenerate {count} MCQs.")),
        ];
        let raw = self.provider.invoke(&messages).await.inspect_err(|e| {
            tracing::error!("❌ MCQ generation call failed: {e}");
        })?;

        let drafts = self.parser.parse_questions(&raw, count)?;
        let stored = self.db.insert_mcqs(document_id, &drafts)?;
        tracing::info!("✅ Stored {} MCQs for document {document_id}", stored.len());
        Ok(stored)
    }

    pub fn list(&self, document_id: i64) -> Result<Vec<Mcq>> {
        self.db.mcqs_for_document(document_id)
    }
}
