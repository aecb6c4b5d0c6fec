//! Parsing and validation of model-generated question payloads.
//!
//! Model output is untrusted: every item is checked field by field and items
//! that fail are dropped individually.

use examprep_core::error::{ExamPrepError, Result};
use examprep_core::types::{Difficulty, McqDraft};
use regex::Regex;
use serde_json::Value;

pub struct ResponseParser {
    fence: Regex,
}

impl ResponseParser {
    pub fn new() -> Result<Self> {
        let fence = Regex::new(r"(?i)```(?:json)?\n([\s\S]*?)\n```")
            .map_err(|e| ExamPrepError::Config(format!("fence pattern: {e}")))?;
        Ok(Self { fence })
    }

    /// Parse raw model text as JSON, falling back to the first fenced block.
    pub fn parse_json(&self, raw: &str) -> Option<Value> {
        if let Ok(value) = serde_json::from_str(raw) {
            return Some(value);
        }
        let inner = self.fence.captures(raw)?.get(1)?.as_str();
        serde_json::from_str(inner).ok()
    }

    /// Extract up to `limit` valid questions from the raw model output.
    ///
    /// Unparseable output, a payload without an `mcqs` array, or zero valid
    /// items is a `Format` error carrying the raw text.
    pub fn parse_questions(&self, raw: &str, limit: usize) -> Result<Vec<McqDraft>> {
        let payload = self
            .parse_json(raw)
            .ok_or_else(|| ExamPrepError::format("Model returned invalid format", Some(raw.into())))?;
        let items = payload
            .get("mcqs")
            .and_then(Value::as_array)
            .ok_or_else(|| ExamPrepError::format("Model returned invalid format", Some(raw.into())))?;

        let mut drafts: Vec<McqDraft> = items.iter().filter_map(clean_item).collect();
        let dropped = items.len() - drafts.len();
        if dropped > 0 {
            tracing::warn!("⚠️ Dropped {dropped} malformed question item(s)");
        }
        drafts.truncate(limit);
        if drafts.is_empty() {
            return Err(ExamPrepError::format(
                "No valid MCQs generated",
                Some(raw.into()),
            ));
        }
        Ok(drafts)
    }
}

/// Validate a single item. Returns `None` when the item must be dropped.
pub fn clean_item(item: &Value) -> Option<McqDraft> {
    let question = item.get("question")?.as_str()?.trim().to_string();
    let options: Vec<String> = item
        .get("options")?
        .as_array()?
        .iter()
        .take(4)
        .map(stringify)
        .collect();
    let options: [String; 4] = options.try_into().ok()?;

    let correct = item.get("correctAnswer").and_then(integral).unwrap_or(0);
    let correct_answer = u8::try_from(correct).ok().filter(|c| *c <= 3)?;

    let explanation = item
        .get("explanation")
        .filter(|v| truthy(v))
        .map(|v| stringify(v).trim().to_string())
        .filter(|s| !s.is_empty());

    let difficulty = item
        .get("difficulty")
        .and_then(Value::as_str)
        .map(Difficulty::parse_or_default)
        .unwrap_or_default();

    Some(McqDraft {
        question,
        options,
        correct_answer,
        explanation,
        difficulty,
    })
}

/// Integer value of a JSON number with no fractional part.
pub fn integral(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
