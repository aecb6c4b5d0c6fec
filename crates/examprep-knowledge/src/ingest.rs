//! Ingestion pipeline: pages → chunks → embeddings → stored rows.

use examprep_core::config::IngestionConfig;
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::traits::ModelProvider;
use examprep_core::types::{ChunkDraft, Document, NewDocument};
use examprep_db::StudyDb;
use std::sync::Arc;

use crate::chunker::RecursiveChunker;
use crate::extract::ExtractedPage;

/// A freshly stored document and how many chunks it produced.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub chunks_count: usize,
}

pub struct IngestionPipeline {
    provider: Arc<dyn ModelProvider>,
    chunker: RecursiveChunker,
}

impl IngestionPipeline {
    pub fn new(provider: Arc<dyn ModelProvider>, config: IngestionConfig) -> Result<Self> {
        Ok(Self {
            provider,
            chunker: RecursiveChunker::new(config)?,
        })
    }

    /// Chunk every page and embed all chunks in a single batch call.
    ///
    /// Chunk indices run across pages starting at 0.
    pub async fn ingest(&self, pages: &[ExtractedPage]) -> Result<Vec<ChunkDraft>> {
        let mut spans: Vec<(String, Option<i64>)> = Vec::new();
        for page in pages {
            for content in self.chunker.split(&page.text) {
                spans.push((content, page.page_number));
            }
        }
        if spans.is_empty() {
            return Err(ExamPrepError::validation("no extractable text"));
        }

        let texts: Vec<String> = spans.iter().map(|(c, _)| c.clone()).collect();
        let embeddings = self.provider.embed_documents(&texts).await?;
        if embeddings.len() != spans.len() {
            return Err(ExamPrepError::Provider(format!(
                "expected {} embeddings, got {}",
                spans.len(),
                embeddings.len()
            )));
        }

        Ok(spans
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, ((content, page_number), embedding))| ChunkDraft {
                content,
                embedding,
                page_number,
                chunk_index: i as i64,
            })
            .collect())
    }

    /// Ingest pages and persist the document with its chunks atomically.
    /// Nothing is written when chunking or embedding fails.
    pub async fn ingest_document(
        &self,
        db: &StudyDb,
        document: &NewDocument,
        pages: &[ExtractedPage],
    ) -> Result<IngestedDocument> {
        let chunks = self.ingest(pages).await?;
        let stored = db.insert_document_with_chunks(document, &chunks)?;
        tracing::info!(
            "📚 Ingested '{}' as document {} ({} chunks)",
            stored.file_name,
            stored.id,
            chunks.len()
        );
        Ok(IngestedDocument {
            document: stored,
            chunks_count: chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examprep_core::testing::ScriptedProvider;
    use examprep_core::types::Visibility;

    fn pipeline(provider: ScriptedProvider) -> IngestionPipeline {
        IngestionPipeline::new(Arc::new(provider), IngestionConfig::default()).unwrap()
    }

    fn new_doc() -> NewDocument {
        NewDocument {
            trainer_id: "t1".into(),
            file_name: "notes.txt".into(),
            file_type: "txt".into(),
            file_url: "/uploads/documents/1-x.txt".into(),
            file_size: Some(10),
            subject: None,
            topic: None,
            description: None,
            visibility: Visibility::Public,
        }
    }

    #[tokio::test]
    async fn test_indices_run_across_pages() {
        let p = pipeline(ScriptedProvider::new());
        let pages = vec![
            ExtractedPage::new("First page text.", Some(1)),
            ExtractedPage::new("   ", Some(2)),
            ExtractedPage::new("Third page text.", Some(3)),
        ];
        let drafts = p.ingest(&pages).await.unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].chunk_index, 0);
        assert_eq!(drafts[1].chunk_index, 1);
        assert_eq!(drafts[1].page_number, Some(3));
        assert_eq!(drafts[0].embedding.len(), 26);
    }

    #[tokio::test]
    async fn test_empty_text_is_validation_error() {
        let p = pipeline(ScriptedProvider::new());
        let err = p.ingest(&[ExtractedPage::new("\n\n", None)]).await.unwrap_err();
        assert!(matches!(err, ExamPrepError::Validation(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_persists_nothing() {
        let db = StudyDb::open_in_memory().unwrap();
        let p = pipeline(ScriptedProvider::new().failing_embeddings());
        let err = p
            .ingest_document(&db, &new_doc(), &[ExtractedPage::new("Some text", None)])
            .await
            .unwrap_err();
        assert!(err.is_provider_failure());
        assert!(db.list_documents().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_embedding_batch_rejected() {
        let db = StudyDb::open_in_memory().unwrap();
        let p = pipeline(ScriptedProvider::new().short_batches());
        let err = p
            .ingest_document(&db, &new_doc(), &[ExtractedPage::new("Some text", None)])
            .await
            .unwrap_err();
        assert!(matches!(err, ExamPrepError::Provider(_)));
        assert!(db.list_documents().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_document_stores_chunks() {
        let db = StudyDb::open_in_memory().unwrap();
        let p = pipeline(ScriptedProvider::new());
        let text = "Photosynthesis converts light into chemical energy. ".repeat(30);
        let ingested = p
            .ingest_document(&db, &new_doc(), &[ExtractedPage::new(text, None)])
            .await
            .unwrap();
        assert!(ingested.chunks_count > 1);
        let stored = db.chunks_for_document(ingested.document.id).unwrap();
        assert_eq!(stored.len(), ingested.chunks_count);
        assert!(stored.iter().all(|c| c.embedding.as_ref().is_some_and(|e| e.len() == 26)));
    }

    #[tokio::test]
    async fn test_pdf_pages_reach_stored_chunks() {
        use crate::TextExtractor;
        use crate::extract::DocumentExtractor;
        use crate::testing::sample_pdf;

        let db = StudyDb::open_in_memory().unwrap();
        let p = pipeline(ScriptedProvider::new());
        let bytes = sample_pdf(&["The Preamble was adopted in 1949.", "It came into force in 1950."]);
        let pages = DocumentExtractor.extract("pdf", &bytes).unwrap();
        let doc = NewDocument {
            file_name: "polity.pdf".into(),
            file_type: "pdf".into(),
            ..new_doc()
        };
        let ingested = p.ingest_document(&db, &doc, &pages).await.unwrap();
        assert_eq!(ingested.chunks_count, 2);
        let stored = db.chunks_for_document(ingested.document.id).unwrap();
        assert_eq!(stored[0].page_number, Some(1));
        assert_eq!(stored[1].page_number, Some(2));
        assert_eq!(stored[1].content, "It came into force in 1950.");
    }
}
