//! Study-assistant answers grounded in retrieved excerpts.

use examprep_core::error::Result;
use examprep_core::traits::ModelProvider;
use examprep_core::types::{Document, Message};
use serde::Serialize;
use std::sync::Arc;

use crate::retrieval::{RankedChunk, RetrievalOutcome, Retriever};

pub const NO_ACCESS_ANSWER: &str = "I don't have access to any study materials yet. \
     Please ask your trainer to upload documents or grant you access.";
pub const PROCESSING_ANSWER: &str =
    "The documents are still being processed. Please try again in a moment.";
pub const STALE_EMBEDDINGS_ANSWER: &str = "The documents are still being processed \
     (embedding format update). Please re-upload the documents to refresh embeddings.";
pub const MODEL_ERROR_ANSWER: &str = "I could not generate an answer due to an AI model error. \
     Here are the most relevant excerpts from your documents.";

const EXCERPT_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = "You are a helpful study assistant for competitive exam preparation (UPSC, SSC, etc.).
Answer the student's question based ONLY on the provided context from their study materials.
If the context doesn't contain enough information to answer the question, say so clearly.
Be concise, accurate, and educational in your responses.
When relevant, cite the page numbers from the source material.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub id: i64,
    pub file_name: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
}

impl From<&Document> for SourceRef {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            file_name: doc.file_name.clone(),
            subject: doc.subject.clone(),
            topic: doc.topic.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Excerpt {
    pub content: String,
    pub similarity: f64,
    pub page_number: Option<i64>,
}

impl From<&RankedChunk> for Excerpt {
    fn from(ranked: &RankedChunk) -> Self {
        let head: String = ranked.chunk.content.chars().take(EXCERPT_CHARS).collect();
        Self {
            content: format!("{head}..."),
            similarity: ranked.similarity,
            page_number: ranked.chunk.page_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnswer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub relevant_chunks: Vec<Excerpt>,
}

impl SearchAnswer {
    fn canned(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            sources: Vec::new(),
            relevant_chunks: Vec::new(),
        }
    }
}

pub struct StudyAssistant {
    retriever: Retriever,
    provider: Arc<dyn ModelProvider>,
}

impl StudyAssistant {
    pub fn new(retriever: Retriever, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            retriever,
            provider,
        }
    }

    /// Retrieve excerpts for the student and synthesize an answer.
    ///
    /// A failed chat call still returns the excerpts with a fixed answer;
    /// embedding and storage failures propagate.
    pub async fn answer(
        &self,
        query: &str,
        student_id: &str,
        top_k: usize,
    ) -> Result<SearchAnswer> {
        tracing::info!("💬 Search for student {student_id}: \"{query}\"");
        let outcome = self.retriever.retrieve(query, student_id, top_k).await?;
        let (sources, chunks, context) = match outcome {
            RetrievalOutcome::NoAccessibleDocuments => {
                return Ok(SearchAnswer::canned(NO_ACCESS_ANSWER));
            }
            RetrievalOutcome::NoChunks => return Ok(SearchAnswer::canned(PROCESSING_ANSWER)),
            RetrievalOutcome::NoUsableChunks => {
                return Ok(SearchAnswer::canned(STALE_EMBEDDINGS_ANSWER));
            }
            RetrievalOutcome::Ranked {
                sources,
                chunks,
                context,
            } => (sources, chunks, context),
        };

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(format!(
                "Context from study materials:\n\n{context}\n\n---\n\nStudent's Question: {query}\n\n\
                 Please provide a clear and helpful answer based on the context above."
            )),
        ];
        let answer = match self.provider.invoke(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("❌ Answer synthesis failed: {e}");
                MODEL_ERROR_ANSWER.to_string()
            }
        };

        Ok(SearchAnswer {
            answer,
            sources: sources.iter().map(SourceRef::from).collect(),
            relevant_chunks: chunks.iter().map(Excerpt::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examprep_core::ExamPrepError;
    use examprep_core::testing::ScriptedProvider;
    use examprep_core::types::{ChunkDraft, NewDocument, Visibility};
    use examprep_db::StudyDb;

    fn seeded_db() -> Arc<StudyDb> {
        let db = Arc::new(StudyDb::open_in_memory().unwrap());
        db.insert_document_with_chunks(
            &NewDocument {
                trainer_id: "t1".into(),
                file_name: "history.txt".into(),
                file_type: "txt".into(),
                file_url: "/uploads/documents/1-h.txt".into(),
                file_size: None,
                subject: Some("History".into()),
                topic: Some("Mughals".into()),
                description: None,
                visibility: Visibility::Public,
            },
            &[ChunkDraft {
                content: "Akbar ruled from 1556 to 1605.".repeat(10),
                embedding: vec![1.0, 0.0],
                page_number: Some(7),
                chunk_index: 0,
            }],
        )
        .unwrap();
        db
    }

    fn assistant(db: Arc<StudyDb>, provider: ScriptedProvider) -> StudyAssistant {
        let provider: Arc<dyn ModelProvider> =
            Arc::new(provider.with_embedding("When did Akbar rule?", vec![1.0, 0.0]));
        StudyAssistant::new(Retriever::new(db, provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_answer_with_sources() {
        let a = assistant(seeded_db(), ScriptedProvider::new().reply("1556 to 1605 (page 7)."));
        let out = a.answer("When did Akbar rule?", "s1", 5).await.unwrap();
        assert_eq!(out.answer, "1556 to 1605 (page 7).");
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].file_name, "history.txt");
        assert_eq!(out.relevant_chunks.len(), 1);
        assert_eq!(out.relevant_chunks[0].content.chars().count(), 203);
        assert!(out.relevant_chunks[0].content.ends_with("..."));
        assert_eq!(out.relevant_chunks[0].page_number, Some(7));
    }

    #[tokio::test]
    async fn test_model_failure_keeps_excerpts() {
        let a = assistant(seeded_db(), ScriptedProvider::new().fail_next("quota"));
        let out = a.answer("When did Akbar rule?", "s1", 5).await.unwrap();
        assert_eq!(out.answer, MODEL_ERROR_ANSWER);
        assert_eq!(out.relevant_chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_no_documents_canned() {
        let db = Arc::new(StudyDb::open_in_memory().unwrap());
        let a = assistant(db, ScriptedProvider::new());
        let out = a.answer("When did Akbar rule?", "s1", 5).await.unwrap();
        assert_eq!(out.answer, NO_ACCESS_ANSWER);
        assert!(out.sources.is_empty());
        assert!(out.relevant_chunks.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let a = assistant(seeded_db(), ScriptedProvider::new().failing_embeddings());
        let err = a.answer("anything", "s1", 5).await.unwrap_err();
        assert!(matches!(err, ExamPrepError::Provider(_)));
    }
}
