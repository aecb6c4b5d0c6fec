//! # ExamPrep Knowledge
//!
//! Turns uploaded study material into searchable chunks and answers student
//! questions from them.
//!
//! ## How it works
//! ```text
//! Trainer uploads notes.pdf
//!   ↓ DocumentExtractor (pdf pages, docx body, plain text)
//! Pages
//!   ↓ RecursiveChunker (500 chars, 100 overlap)
//! Chunks → embed_documents (one batch) → SQLite (one transaction)
//!
//! Student: "When did Akbar rule?"
//!   ↓ embed_query
//! Readable documents (public, or granted) → chunks of matching dimension
//!   ↓ cosine similarity, top-K
//! Context → chat model → grounded answer with page citations
//! ```

pub mod access;
pub mod chunker;
pub mod docx;
pub mod extract;
pub mod ingest;
pub mod pdf;
pub mod retrieval;
pub mod search;
pub mod similarity;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use docx::DocxExtractor;
pub use extract::{DocumentExtractor, ExtractedPage, PlainTextExtractor, TextExtractor};
pub use pdf::PdfExtractor;
pub use ingest::{IngestedDocument, IngestionPipeline};
pub use retrieval::{RetrievalOutcome, Retriever};
pub use search::{SearchAnswer, StudyAssistant};
