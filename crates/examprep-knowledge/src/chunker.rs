//! Recursive character chunker.
//!
//! Splits on the coarsest separator present, recurses into pieces that are
//! still too long, then merges neighbours back into windows of at most
//! `chunk_size` characters that share up to `chunk_overlap` characters.
//! Separators stay attached to the end of the piece they close, so a
//! sentence keeps its full stop.
//! All lengths are counted in Unicode scalar values.

use examprep_core::config::IngestionConfig;
use examprep_core::error::Result;
use std::collections::VecDeque;

const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Fails when `chunk_size` is 0 or the overlap is not smaller than it.
    pub fn new(config: IngestionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        })
    }

    /// Split text into trimmed, non-empty windows.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut remaining: Option<&[&str]> = None;
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = Some(&separators[i + 1..]);
                break;
            }
        }

        let mut out = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                out.extend(self.merge(&pending));
                pending.clear();
            }
            match remaining {
                Some(next) => out.extend(self.split_with(piece, next)),
                None => out.push(piece.to_string()),
            }
        }
        if !pending.is_empty() {
            out.extend(self.merge(&pending));
        }
        out
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_window(&mut windows, &current);
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        push_window(&mut windows, &current);
        windows
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_window(windows: &mut Vec<String>, parts: &VecDeque<&str>) {
    let joined: String = parts.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

/// Split after every occurrence of `separator`; an empty separator splits
/// into single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, sep) in text.match_indices(separator) {
        let end = idx + sep.len();
        pieces.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
