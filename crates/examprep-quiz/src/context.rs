//! Bounded context assembly for question generation.

use examprep_core::types::DocumentChunk;

/// Concatenate chunks in `chunk_index` order until the character budget is
/// reached.
///
/// At most `max_chunks` chunks are considered (at least one). An entry that
/// would push the total past `max_chars` ends the scan and is omitted whole.
pub fn build_context(chunks: &[DocumentChunk], max_chunks: usize, max_chars: usize) -> String {
    let mut ordered: Vec<&DocumentChunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.chunk_index);
    let limit = max_chunks.clamp(1, ordered.len().max(1));

    let mut context = String::new();
    let mut used = 0usize;
    for chunk in ordered.into_iter().take(limit) {
        let page = chunk
            .page_number
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        let entry = format!(
            "\n\n[Page {page} | Chunk {}]\n{}",
            chunk.chunk_index, chunk.content
        );
        let len = entry.chars().count();
        if used + len > max_chars {
            break;
        }
        context.push_str(&entry);
        used += len;
    }
    context
}
