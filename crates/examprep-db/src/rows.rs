//! Row mappers and column codecs.

use chrono::{DateTime, SecondsFormat, Utc};
use examprep_core::types::{
    AccessRecord, Difficulty, Document, DocumentChunk, Mcq, StudySession, embedding_from_json,
};
use rusqlite::Row;
use rusqlite::types::Type;

pub const DOCUMENT_COLUMNS: &str = "id, trainer_id, file_name, file_type, file_url, file_size, \
     subject, topic, description, visibility, access_groups, uploaded_at, updated_at";

pub const CHUNK_COLUMNS: &str = "id, document_id, content, embedding, page_number, chunk_index";

pub const ACCESS_COLUMNS: &str =
    "id, document_id, student_id, access_level, granted_at, granted_by";

pub const MCQ_COLUMNS: &str =
    "id, document_id, question, options, correct_answer, explanation, difficulty, created_at";

pub const SESSION_COLUMNS: &str = "id, student_id, document_id, session_type, \
     questions_attempted, correct_answers, incorrect_answers, score, started_at, completed_at, duration";

/// Fixed-width RFC3339 so text ordering matches time ordering.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn opt_ts(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => ts(row, idx).map(Some),
        None => Ok(None),
    }
}

fn string_list(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(text) => serde_json::from_str(&text).map_err(|e| conversion_error(idx, e)),
        None => Ok(Vec::new()),
    }
}

pub fn document(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        trainer_id: row.get(1)?,
        file_name: row.get(2)?,
        file_type: row.get(3)?,
        file_url: row.get(4)?,
        file_size: row.get(5)?,
        subject: row.get(6)?,
        topic: row.get(7)?,
        description: row.get(8)?,
        visibility_raw: row.get(9)?,
        access_groups: string_list(row, 10)?,
        uploaded_at: ts(row, 11)?,
        updated_at: ts(row, 12)?,
    })
}

/// Malformed embedding text loads as `None` rather than failing the row.
pub fn chunk(row: &Row) -> rusqlite::Result<DocumentChunk> {
    let raw: Option<String> = row.get(3)?;
    let embedding = raw
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|value| embedding_from_json(&value));
    Ok(DocumentChunk {
        id: row.get(0)?,
        document_id: row.get(1)?,
        content: row.get(2)?,
        embedding,
        page_number: row.get(4)?,
        chunk_index: row.get(5)?,
    })
}

pub fn access(row: &Row) -> rusqlite::Result<AccessRecord> {
    Ok(AccessRecord {
        id: row.get(0)?,
        document_id: row.get(1)?,
        student_id: row.get(2)?,
        access_level: row.get(3)?,
        granted_at: ts(row, 4)?,
        granted_by: row.get(5)?,
    })
}

pub fn mcq(row: &Row) -> rusqlite::Result<Mcq> {
    let difficulty: String = row.get(6)?;
    Ok(Mcq {
        id: row.get(0)?,
        document_id: row.get(1)?,
        question: row.get(2)?,
        options: string_list(row, 3)?,
        correct_answer: row.get(4)?,
        explanation: row.get(5)?,
        difficulty: Difficulty::parse_or_default(&difficulty),
        created_at: ts(row, 7)?,
    })
}

pub fn session(row: &Row) -> rusqlite::Result<StudySession> {
    Ok(StudySession {
        id: row.get(0)?,
        student_id: row.get(1)?,
        document_id: row.get(2)?,
        session_type: row.get(3)?,
        questions_attempted: row.get(4)?,
        correct_answers: row.get(5)?,
        incorrect_answers: row.get(6)?,
        score: row.get(7)?,
        started_at: ts(row, 8)?,
        completed_at: opt_ts(row, 9)?,
        duration: row.get(10)?,
    })
}
