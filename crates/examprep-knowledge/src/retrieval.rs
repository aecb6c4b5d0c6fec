//! Access-filtered semantic retrieval over stored chunks.
//!
//! A linear scan: every chunk of every readable document is scored against
//! the query embedding.

use examprep_core::error::Result;
use examprep_core::traits::ModelProvider;
use examprep_core::types::{Document, DocumentChunk};
use examprep_db::StudyDb;
use std::collections::HashSet;
use std::sync::Arc;

use crate::access::filter_accessible;
use crate::similarity::cosine_similarity;

pub const NO_CONTEXT: &str = "No relevant context found.";
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct RankedChunk {
    pub chunk: DocumentChunk,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// The student cannot read any document.
    NoAccessibleDocuments,
    /// Readable documents exist but none has chunks yet.
    NoChunks,
    /// Chunks exist but none has an embedding matching the query's dimension.
    NoUsableChunks,
    Ranked {
        /// Readable documents that contributed at least one result.
        sources: Vec<Document>,
        chunks: Vec<RankedChunk>,
        context: String,
    },
}

pub struct Retriever {
    db: Arc<StudyDb>,
    provider: Arc<dyn ModelProvider>,
}

impl Retriever {
    pub fn new(db: Arc<StudyDb>, provider: Arc<dyn ModelProvider>) -> Self {
        Self { db, provider }
    }

    pub async fn retrieve(
        &self,
        query: &str,
        student_id: &str,
        top_k: usize,
    ) -> Result<RetrievalOutcome> {
        let query_embedding = self.provider.embed_query(query).await?;
        let dim = query_embedding.len();
        tracing::debug!("🔎 Query embedding dimension: {dim}");

        let records = self.db.access_records_for_student(student_id)?;
        let accessible = filter_accessible(self.db.list_documents()?, student_id, &records);
        if accessible.is_empty() {
            return Ok(RetrievalOutcome::NoAccessibleDocuments);
        }

        let ids: Vec<i64> = accessible.iter().map(|d| d.id).collect();
        let chunks = self.db.chunks_for_documents(&ids)?;
        tracing::debug!(
            "📄 {} accessible documents, {} chunks",
            accessible.len(),
            chunks.len()
        );
        if chunks.is_empty() {
            return Ok(RetrievalOutcome::NoChunks);
        }

        let chunks = rank_chunks(&query_embedding, chunks, top_k);
        let Some(chunks) = chunks else {
            return Ok(RetrievalOutcome::NoUsableChunks);
        };

        let used: HashSet<i64> = chunks.iter().map(|c| c.chunk.document_id).collect();
        let sources = accessible
            .into_iter()
            .filter(|d| used.contains(&d.id))
            .collect();
        let context = format_context(&chunks);
        Ok(RetrievalOutcome::Ranked {
            sources,
            chunks,
            context,
        })
    }
}

/// Score candidates against the query and keep the best `top_k`.
///
/// Chunks without an embedding of the query's dimension are skipped with a
/// warning. Returns `None` when no candidate survives. The sort is stable, so
/// equal scores keep their original order.
pub fn rank_chunks(
    query: &[f32],
    chunks: Vec<DocumentChunk>,
    top_k: usize,
) -> Option<Vec<RankedChunk>> {
    let total = chunks.len();
    let mut scored: Vec<RankedChunk> = chunks
        .into_iter()
        .filter(|c| c.embedding.as_ref().is_some_and(|e| e.len() == query.len()))
        .map(|chunk| {
            let similarity = chunk
                .embedding
                .as_deref()
                .map(|e| cosine_similarity(query, e))
                .unwrap_or(0.0);
            RankedChunk { chunk, similarity }
        })
        .collect();

    let skipped = total - scored.len();
    if skipped > 0 {
        tracing::warn!(
            "⚠️ Skipping {skipped} chunk(s) with missing or mismatched embeddings (expected dimension {})",
            query.len()
        );
    }
    if scored.is_empty() {
        return None;
    }

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(top_k);
    Some(scored)
}

/// Render ranked chunks as the context block handed to the model.
pub fn format_context(chunks: &[RankedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }
    chunks
        .iter()
        .enumerate()
        .map(|(i, ranked)| {
            let meta = match ranked.chunk.page_number {
                Some(page) => format!(
                    " (Page {page}, Relevance: {:.1}%)",
                    ranked.similarity * 100.0
                ),
                None => String::new(),
            };
            format!("[Context {}]{meta}\n{}", i + 1, ranked.chunk.content)
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
