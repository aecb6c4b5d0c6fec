//! `StudyDb`: the single SQLite store behind every pipeline.

use chrono::Utc;
use examprep_core::error::{ExamPrepError, Result};
use examprep_core::types::{
    AccessRecord, ChunkDraft, Document, DocumentChunk, Mcq, McqDraft, NewDocument,
    SESSION_TYPE_MCQ, ScoreResult, StudySession,
};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::rows::{self, timestamp};

pub struct StudyDb {
    conn: Mutex<Connection>,
}

impl StudyDb {
    /// Open or create the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| ExamPrepError::Database(format!("DB open error: {e}")))?;
        // WAL helps concurrent readers; in-memory databases ignore it
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ExamPrepError::Database(format!("DB open error: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(ExamPrepError::database)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ExamPrepError::Database(format!("Lock: {e}")))
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trainer_id TEXT NOT NULL,
                file_name TEXT NOT NULL,
                file_type TEXT NOT NULL,
                file_url TEXT NOT NULL,
                file_size INTEGER,
                subject TEXT,
                topic TEXT,
                description TEXT,
                visibility TEXT NOT NULL DEFAULT 'public',
                access_groups TEXT NOT NULL DEFAULT '[]',
                uploaded_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_trainer ON documents(trainer_id);

            CREATE TABLE IF NOT EXISTS document_access (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                student_id TEXT NOT NULL,
                access_level TEXT NOT NULL DEFAULT 'view',
                granted_at TEXT NOT NULL,
                granted_by TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_access_student ON document_access(student_id);

            CREATE TABLE IF NOT EXISTS document_chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                embedding TEXT,
                page_number INTEGER,
                chunk_index INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chunks_document ON document_chunks(document_id);

            CREATE TABLE IF NOT EXISTS mcqs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                question TEXT NOT NULL,
                options TEXT NOT NULL,
                correct_answer INTEGER NOT NULL,
                explanation TEXT,
                difficulty TEXT NOT NULL DEFAULT 'medium',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_mcqs_document ON mcqs(document_id);

            CREATE TABLE IF NOT EXISTS study_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                session_type TEXT NOT NULL,
                questions_attempted INTEGER NOT NULL DEFAULT 0,
                correct_answers INTEGER NOT NULL DEFAULT 0,
                incorrect_answers INTEGER NOT NULL DEFAULT 0,
                score INTEGER NOT NULL DEFAULT 0,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                duration INTEGER
            );
            ",
        )
        .map_err(|e| ExamPrepError::Database(format!("Migration error: {e}")))?;
        Ok(())
    }

    // ── Documents ──────────────────────────────

    /// Insert a document and all of its chunks in one transaction.
    pub fn insert_document_with_chunks(
        &self,
        doc: &NewDocument,
        chunks: &[ChunkDraft],
    ) -> Result<Document> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(ExamPrepError::database)?;
        let now = timestamp(Utc::now());

        tx.execute(
            "INSERT INTO documents (trainer_id, file_name, file_type, file_url, file_size,
                 subject, topic, description, visibility, access_groups, uploaded_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '[]', ?10, ?10)",
            params![
                doc.trainer_id,
                doc.file_name,
                doc.file_type,
                doc.file_url,
                doc.file_size,
                doc.subject,
                doc.topic,
                doc.description,
                doc.visibility.as_str(),
                now,
            ],
        )
        .map_err(|e| ExamPrepError::Database(format!("Insert document: {e}")))?;
        let document_id = tx.last_insert_rowid();

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO document_chunks (document_id, content, embedding, page_number, chunk_index)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(ExamPrepError::database)?;
            for chunk in chunks {
                let embedding = serde_json::to_string(&chunk.embedding)?;
                stmt.execute(params![
                    document_id,
                    chunk.content,
                    embedding,
                    chunk.page_number,
                    chunk.chunk_index,
                ])
                .map_err(|e| ExamPrepError::Database(format!("Insert chunk: {e}")))?;
            }
        }

        let document = tx
            .query_row(
                &format!("SELECT {} FROM documents WHERE id=?1", rows::DOCUMENT_COLUMNS),
                params![document_id],
                rows::document,
            )
            .map_err(ExamPrepError::database)?;
        tx.commit().map_err(ExamPrepError::database)?;

        tracing::debug!(
            "💾 Stored document {} with {} chunks",
            document_id,
            chunks.len()
        );
        Ok(document)
    }

    pub fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM documents WHERE id=?1", rows::DOCUMENT_COLUMNS),
            params![id],
            rows::document,
        )
        .optional()
        .map_err(ExamPrepError::database)
    }

    /// All documents, newest upload first.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM documents ORDER BY uploaded_at DESC, id DESC",
                rows::DOCUMENT_COLUMNS
            ))
            .map_err(ExamPrepError::database)?;
        let docs = stmt
            .query_map([], rows::document)
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(ExamPrepError::database)?;
        Ok(docs)
    }

    /// Documents owned by a trainer, newest upload first.
    pub fn list_documents_by_trainer(&self, trainer_id: &str) -> Result<Vec<Document>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM documents WHERE trainer_id=?1 ORDER BY uploaded_at DESC, id DESC",
                rows::DOCUMENT_COLUMNS
            ))
            .map_err(ExamPrepError::database)?;
        let docs = stmt
            .query_map(params![trainer_id], rows::document)
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(ExamPrepError::database)?;
        Ok(docs)
    }

    /// Chunk count per document id, one aggregated query.
    pub fn chunk_counts(&self) -> Result<HashMap<i64, i64>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT document_id, COUNT(*) FROM document_chunks GROUP BY document_id")
            .map_err(ExamPrepError::database)?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(ExamPrepError::database)?;
        Ok(counts)
    }

    /// Delete a document and, through cascades, everything hanging off it.
    /// Returns false when nothing was deleted.
    pub fn delete_document(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let n = conn
            .execute("DELETE FROM documents WHERE id=?1", params![id])
            .map_err(|e| ExamPrepError::Database(format!("Delete document: {e}")))?;
        Ok(n > 0)
    }

    // ── Chunks ──────────────────────────────

    /// Chunks of one document, in chunk order.
    pub fn chunks_for_document(&self, document_id: i64) -> Result<Vec<DocumentChunk>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM document_chunks WHERE document_id=?1 ORDER BY chunk_index, id",
                rows::CHUNK_COLUMNS
            ))
            .map_err(ExamPrepError::database)?;
        let chunks = stmt
            .query_map(params![document_id], rows::chunk)
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(ExamPrepError::database)?;
        Ok(chunks)
    }

    /// Chunks of several documents, in insertion order.
    pub fn chunks_for_documents(&self, document_ids: &[i64]) -> Result<Vec<DocumentChunk>> {
        if document_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; document_ids.len()].join(", ");
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM document_chunks WHERE document_id IN ({placeholders}) ORDER BY id",
                rows::CHUNK_COLUMNS
            ))
            .map_err(ExamPrepError::database)?;
        let chunks = stmt
            .query_map(params_from_iter(document_ids.iter()), rows::chunk)
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(ExamPrepError::database)?;
        Ok(chunks)
    }

    // ── Access ──────────────────────────────

    pub fn grant_access(
        &self,
        document_id: i64,
        student_id: &str,
        access_level: &str,
        granted_by: Option<&str>,
    ) -> Result<AccessRecord> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO document_access (document_id, student_id, access_level, granted_at, granted_by)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                document_id,
                student_id,
                access_level,
                timestamp(Utc::now()),
                granted_by
            ],
        )
        .map_err(|e| ExamPrepError::Database(format!("Grant access: {e}")))?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {} FROM document_access WHERE id=?1", rows::ACCESS_COLUMNS),
            params![id],
            rows::access,
        )
        .map_err(ExamPrepError::database)
    }

    pub fn access_records_for_student(&self, student_id: &str) -> Result<Vec<AccessRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM document_access WHERE student_id=?1 ORDER BY id",
                rows::ACCESS_COLUMNS
            ))
            .map_err(ExamPrepError::database)?;
        let records = stmt
            .query_map(params![student_id], rows::access)
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(ExamPrepError::database)?;
        Ok(records)
    }

    // ── Questions ──────────────────────────────

    /// Persist a validated batch in one transaction and return the stored rows.
    pub fn insert_mcqs(&self, document_id: i64, drafts: &[McqDraft]) -> Result<Vec<Mcq>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(ExamPrepError::database)?;
        let now = timestamp(Utc::now());
        let mut ids = Vec::with_capacity(drafts.len());

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO mcqs (document_id, question, options, correct_answer, explanation, difficulty, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(ExamPrepError::database)?;
            for draft in drafts {
                let options = serde_json::to_string(&draft.options)?;
                stmt.execute(params![
                    document_id,
                    draft.question,
                    options,
                    draft.correct_answer,
                    draft.explanation,
                    draft.difficulty.as_str(),
                    now,
                ])
                .map_err(|e| ExamPrepError::Database(format!("Insert mcq: {e}")))?;
                ids.push(tx.last_insert_rowid());
            }
        }

        let mut stored = Vec::with_capacity(ids.len());
        {
            let mut stmt = tx
                .prepare(&format!("SELECT {} FROM mcqs WHERE id=?1", rows::MCQ_COLUMNS))
                .map_err(ExamPrepError::database)?;
            for id in ids {
                stored.push(
                    stmt.query_row(params![id], rows::mcq)
                        .map_err(ExamPrepError::database)?,
                );
            }
        }
        tx.commit().map_err(ExamPrepError::database)?;
        Ok(stored)
    }

    pub fn mcqs_for_document(&self, document_id: i64) -> Result<Vec<Mcq>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM mcqs WHERE document_id=?1 ORDER BY id",
                rows::MCQ_COLUMNS
            ))
            .map_err(ExamPrepError::database)?;
        let mcqs = stmt
            .query_map(params![document_id], rows::mcq)
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(ExamPrepError::database)?;
        Ok(mcqs)
    }

    /// Correct option index for each known question id.
    pub fn correct_answers(&self, mcq_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if mcq_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; mcq_ids.len()].join(", ");
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, correct_answer FROM mcqs WHERE id IN ({placeholders})"
            ))
            .map_err(ExamPrepError::database)?;
        let answers = stmt
            .query_map(params_from_iter(mcq_ids.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(ExamPrepError::database)?
            .collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(ExamPrepError::database)?;
        Ok(answers)
    }

    // ── Sessions ──────────────────────────────

    pub fn create_session(&self, student_id: &str, document_id: i64) -> Result<StudySession> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO study_sessions (student_id, document_id, session_type, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                student_id,
                document_id,
                SESSION_TYPE_MCQ,
                timestamp(Utc::now())
            ],
        )
        .map_err(|e| ExamPrepError::Database(format!("Create session: {e}")))?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {} FROM study_sessions WHERE id=?1", rows::SESSION_COLUMNS),
            params![id],
            rows::session,
        )
        .map_err(ExamPrepError::database)
    }

    pub fn get_session(&self, id: i64) -> Result<Option<StudySession>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM study_sessions WHERE id=?1", rows::SESSION_COLUMNS),
            params![id],
            rows::session,
        )
        .optional()
        .map_err(ExamPrepError::database)
    }

    /// Record a score exactly once. A second call for the same session is a
    /// `Conflict`; an unknown id is `NotFound`.
    pub fn complete_session(
        &self,
        id: i64,
        result: &ScoreResult,
        duration: Option<i64>,
    ) -> Result<StudySession> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE study_sessions
                 SET questions_attempted=?2, correct_answers=?3, incorrect_answers=?4,
                     score=?5, completed_at=?6, duration=?7
                 WHERE id=?1 AND completed_at IS NULL",
                params![
                    id,
                    result.attempted,
                    result.correct,
                    result.incorrect,
                    result.score,
                    timestamp(Utc::now()),
                    duration,
                ],
            )
            .map_err(|e| ExamPrepError::Database(format!("Complete session: {e}")))?;

        let session = conn
            .query_row(
                &format!("SELECT {} FROM study_sessions WHERE id=?1", rows::SESSION_COLUMNS),
                params![id],
                rows::session,
            )
            .optional()
            .map_err(ExamPrepError::database)?
            .ok_or_else(|| ExamPrepError::not_found(format!("session {id}")))?;

        if updated == 0 {
            return Err(ExamPrepError::Conflict(format!(
                "session {id} was already submitted"
            )));
        }
        Ok(session)
    }
}
