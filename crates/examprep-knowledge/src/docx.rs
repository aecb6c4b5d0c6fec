//! DOCX text extraction from `word/document.xml`.
//!
//! Paragraphs become lines; tabs and breaks are kept. Word documents carry
//! no page layout, so the whole body is one page without a number.

use examprep_core::error::{ExamPrepError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};

use crate::extract::{ExtractedPage, TextExtractor};

const BODY_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<Vec<ExtractedPage>> {
        if file_type != "docx" {
            return Err(ExamPrepError::Extraction(format!(
                "DOCX extractor cannot read {file_type} files"
            )));
        }
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExamPrepError::Extraction(format!("Could not read DOCX: {e}")))?;
        let mut xml = String::new();
        archive
            .by_name(BODY_PART)
            .map_err(|e| ExamPrepError::Extraction(format!("DOCX has no {BODY_PART}: {e}")))?
            .read_to_string(&mut xml)
            .map_err(|e| ExamPrepError::Extraction(format!("Could not read {BODY_PART}: {e}")))?;

        Ok(vec![ExtractedPage::new(body_text(&xml)?, None)])
    }
}

fn body_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExamPrepError::Extraction(format!("Malformed DOCX XML: {e}")))?;
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" | b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let decoded = t
                    .unescape()
                    .map_err(|e| ExamPrepError::Extraction(format!("Malformed DOCX text: {e}")))?;
                text.push_str(&decoded);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}
