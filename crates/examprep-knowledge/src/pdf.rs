//! PDF text extraction, one [`ExtractedPage`] per page.

use examprep_core::error::{ExamPrepError, Result};
use lopdf::Document;

use crate::extract::{ExtractedPage, TextExtractor};

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<Vec<ExtractedPage>> {
        if file_type != "pdf" {
            return Err(ExamPrepError::Extraction(format!(
                "PDF extractor cannot read {file_type} files"
            )));
        }
        let doc = Document::load_mem(bytes)
            .map_err(|e| ExamPrepError::Extraction(format!("Could not read PDF: {e}")))?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().into_keys() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => pages.push(ExtractedPage::new(text, Some(i64::from(page_number)))),
                Err(e) => tracing::warn!("⚠️ Skipping unreadable PDF page {page_number}: {e}"),
            }
        }
        if pages.is_empty() {
            return Err(ExamPrepError::Extraction(
                "PDF has no readable pages".into(),
            ));
        }
        tracing::debug!("📄 Extracted {} PDF pages", pages.len());
        Ok(pages)
    }
}
