//! Text extraction seam.
//!
//! Each format sits behind [`TextExtractor`]. [`DocumentExtractor`] picks
//! the right one by file extension.

use examprep_core::error::{ExamPrepError, Result};

use crate::docx::DocxExtractor;
use crate::pdf::PdfExtractor;

/// File extensions accepted for upload.
pub const ALLOWED_FILE_TYPES: &[&str] = &["pdf", "docx", "txt"];

/// One page (or the whole text, when the format has no pages).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub text: String,
    /// 1-based page number, when the source format has pages.
    pub page_number: Option<i64>,
}

impl ExtractedPage {
    pub fn new(text: impl Into<String>, page_number: Option<i64>) -> Self {
        Self {
            text: text.into(),
            page_number,
        }
    }
}

pub trait TextExtractor: Send + Sync {
    /// Extract pages from raw file bytes. `file_type` is a lowercase extension.
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<Vec<ExtractedPage>>;
}

/// Decodes `txt` uploads. Form feeds split the text into numbered pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<Vec<ExtractedPage>> {
        match file_type {
            "txt" => {
                let text = String::from_utf8_lossy(bytes);
                if !text.contains('\x0c') {
                    return Ok(vec![ExtractedPage::new(text, None)]);
                }
                Ok(text
                    .split('\x0c')
                    .enumerate()
                    .map(|(i, page)| ExtractedPage::new(page, Some(i as i64 + 1)))
                    .collect())
            }
            other => Err(ExamPrepError::Extraction(format!(
                "Unsupported file type: {other}"
            ))),
        }
    }
}

/// Dispatches on the extension: `pdf`, `docx`, otherwise plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<Vec<ExtractedPage>> {
        match file_type {
            "pdf" => PdfExtractor.extract(file_type, bytes),
            "docx" => DocxExtractor.extract(file_type, bytes),
            _ => PlainTextExtractor.extract(file_type, bytes),
        }
    }
}

/// Lowercase extension after the last dot, or empty when there is none.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Validate an upload name and return its normalized extension.
pub fn validate_file_type(file_name: &str) -> Result<String> {
    let ext = file_extension(file_name);
    if ALLOWED_FILE_TYPES.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ExamPrepError::validation(
            "Invalid file type. Only PDF, DOCX, and TXT files are allowed.",
        ))
    }
}
