//! Domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ─── Chat ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message sent to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// What a provider reports about one of its models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub kind: ModelKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Chat,
    Embedding,
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Access policy tier of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Group,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Group => "group",
            Self::Private => "private",
        }
    }

    /// Group and private documents both require an explicit grant.
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Self::Public)
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "group" => Ok(Self::Group),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown visibility: {other}")),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded study artifact.
///
/// `visibility` holds the persisted text; use [`Document::visibility`] to get
/// the parsed policy. Rows written by older tooling may carry values outside
/// the enum, which callers must treat as inaccessible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub trainer_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "visibility")]
    pub visibility_raw: String,
    pub access_groups: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility_raw.parse().ok()
    }
}

/// Fields needed to insert a document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub trainer_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub visibility: Visibility,
}

/// A document together with its stored chunk count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    #[serde(flatten)]
    pub document: Document,
    pub chunks_count: i64,
}

/// A bounded text span of a document with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    pub id: i64,
    pub document_id: i64,
    pub content: String,
    /// `None` when the stored value is missing or not an array.
    #[serde(skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    pub page_number: Option<i64>,
    pub chunk_index: i64,
}

/// A chunk produced by ingestion, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub content: String,
    pub embedding: Vec<f32>,
    pub page_number: Option<i64>,
    pub chunk_index: i64,
}

/// Explicit grant of a student to a non-public document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
    pub id: i64,
    pub document_id: i64,
    pub student_id: String,
    pub access_level: String,
    pub granted_at: DateTime<Utc>,
    pub granted_by: Option<String>,
}

// ─── Questions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse a difficulty label, falling back to `Medium`.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }
}

/// A validated multiple-choice item, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct McqDraft {
    pub question: String,
    pub options: [String; 4],
    pub correct_answer: u8,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
}

/// A persisted multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mcq {
    pub id: i64,
    pub document_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// Kind of study session. Only question practice is produced today.
pub const SESSION_TYPE_MCQ: &str = "mcq";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: i64,
    pub student_id: String,
    pub document_id: i64,
    pub session_type: String,
    pub questions_attempted: i64,
    pub correct_answers: i64,
    pub incorrect_answers: i64,
    pub score: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
}

/// Outcome of scoring a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub attempted: i64,
    pub correct: i64,
    pub incorrect: i64,
    pub score: i64,
}

// ─── Embedding coercion ──────────────────────────────────────────────────────

/// Coerce a stored JSON embedding into a flat numeric vector.
///
/// Returns `None` for anything that is not an array. One level of nesting is
/// flattened. Elements that are not numbers (or numeric strings) become NaN so
/// the similarity accumulator can skip them while the length still counts.
pub fn embedding_from_json(value: &Value) -> Option<Vec<f32>> {
    let items = value.as_array()?;
    let flat: Vec<&Value> = if items.first().is_some_and(Value::is_array) {
        items
            .iter()
            .flat_map(|v| match v {
                Value::Array(inner) => inner.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .collect()
    } else {
        items.iter().collect()
    };

    Some(
        flat.into_iter()
            .map(|v| match v {
                Value::Number(n) => n.as_f64().map(|f| f as f32).unwrap_or(f32::NAN),
                Value::String(s) => s.trim().parse::<f32>().unwrap_or(f32::NAN),
                Value::Bool(b) => {
                    if *b {
                        1.0
                    } else {
                        0.0
                    }
                }
                _ => f32::NAN,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visibility_parse() {
        assert_eq!("public".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("group".parse::<Visibility>(), Ok(Visibility::Group));
        assert!("secret".parse::<Visibility>().is_err());
        assert!(Visibility::Private.is_restricted());
        assert!(!Visibility::Public.is_restricted());
    }

    #[test]
    fn test_difficulty_default() {
        assert_eq!(Difficulty::parse_or_default("hard"), Difficulty::Hard);
        assert_eq!(Difficulty::parse_or_default("HARD"), Difficulty::Medium);
        assert_eq!(Difficulty::parse_or_default(""), Difficulty::Medium);
    }

    #[test]
    fn test_embedding_from_json() {
        assert_eq!(embedding_from_json(&json!([1, 2.5])), Some(vec![1.0, 2.5]));
        assert_eq!(embedding_from_json(&json!({"a": 1})), None);
        assert_eq!(embedding_from_json(&Value::Null), None);
        assert_eq!(embedding_from_json(&json!([[1, 2], [3]])), Some(vec![1.0, 2.0, 3.0]));

        let coerced = embedding_from_json(&json!(["0.5", "x", null])).unwrap();
        assert_eq!(coerced.len(), 3);
        assert_eq!(coerced[0], 0.5);
        assert!(coerced[1].is_nan());
        assert!(coerced[2].is_nan());
    }

    #[test]
    fn test_document_serializes_visibility_key() {
        let doc = Document {
            id: 1,
            trainer_id: "t1".into(),
            file_name: "notes.txt".into(),
            file_type: "txt".into(),
            file_url: "/uploads/documents/a.txt".into(),
            file_size: Some(10),
            subject: None,
            topic: None,
            description: None,
            visibility_raw: "public".into(),
            access_groups: vec![],
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["fileName"], "notes.txt");
    }
}
