//! Study session lifecycle: start empty, submit once.

use examprep_core::error::{ExamPrepError, Result};
use examprep_core::types::{ScoreResult, StudySession};
use examprep_db::StudyDb;
use serde_json::Value;
use std::sync::Arc;

use crate::scoring::{normalize_duration, parse_answers, score};

pub const NO_VALID_ANSWERS: &str = "No valid answers provided";

pub struct SessionService {
    db: Arc<StudyDb>,
}

impl SessionService {
    pub fn new(db: Arc<StudyDb>) -> Self {
        Self { db }
    }

    pub fn start(&self, student_id: &str, document_id: i64) -> Result<StudySession> {
        if self.db.get_document(document_id)?.is_none() {
            return Err(ExamPrepError::not_found("Document not found"));
        }
        let session = self.db.create_session(student_id, document_id)?;
        tracing::info!(
            "🎯 Session {} started: student {student_id}, document {document_id}",
            session.id
        );
        Ok(session)
    }

    /// Score raw answer entries and finalize the session.
    pub fn submit(
        &self,
        session_id: i64,
        raw_answers: &[Value],
        duration: Option<&Value>,
    ) -> Result<ScoreResult> {
        let answers = parse_answers(raw_answers);
        if answers.is_empty() {
            return Err(ExamPrepError::validation(NO_VALID_ANSWERS));
        }
        if raw_answers.len() > answers.len() {
            tracing::warn!(
                "⚠️ Ignored {} malformed answer(s) for session {session_id}",
                raw_answers.len() - answers.len()
            );
        }

        let mut ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let correct = self.db.correct_answers(&ids)?;

        let result = score(&answers, &correct);
        self.db
            .complete_session(session_id, &result, normalize_duration(duration))?;
        tracing::info!(
            "🏁 Session {session_id} submitted: {}/{} correct ({}%)",
            result.correct,
            result.attempted,
            result.score
        );
        Ok(result)
    }
}
