//! Answer parsing and score arithmetic.

use examprep_core::types::ScoreResult;
use serde_json::Value;
use std::collections::HashMap;

use crate::parse::integral;

/// One well-formed submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub question_id: i64,
    pub selected_index: i64,
}

/// Keep the entries whose question id (`questionId`, else `mcqId`) and
/// `selectedIndex` are integral numbers.
pub fn parse_answers(raw: &[Value]) -> Vec<Answer> {
    raw.iter()
        .filter_map(|entry| {
            let id = entry
                .get("questionId")
                .filter(|v| !v.is_null())
                .or_else(|| entry.get("mcqId"))?;
            Some(Answer {
                question_id: integral(id)?,
                selected_index: integral(entry.get("selectedIndex")?)?,
            })
        })
        .collect()
}

/// Score answers against the known correct indices.
///
/// Unknown question ids are not attempted. Repeated ids count each time.
pub fn score(answers: &[Answer], correct: &HashMap<i64, i64>) -> ScoreResult {
    let mut attempted = 0i64;
    let mut right = 0i64;
    for answer in answers {
        let Some(expected) = correct.get(&answer.question_id) else {
            continue;
        };
        attempted += 1;
        if *expected == answer.selected_index {
            right += 1;
        }
    }
    ScoreResult {
        attempted,
        correct: right,
        incorrect: attempted - right,
        score: percentage(right, attempted),
    }
}

/// `round(correct / attempted * 100)` with halves rounded up; 0 when nothing
/// was attempted.
pub fn percentage(correct: i64, attempted: i64) -> i64 {
    if attempted <= 0 {
        return 0;
    }
    (correct * 200 + attempted) / (2 * attempted)
}

/// Whole seconds for a finite, non-negative duration; anything else is `None`.
pub fn normalize_duration(value: Option<&Value>) -> Option<i64> {
    let secs = value?.as_f64()?;
    secs.is_finite().then(|| secs.floor().max(0.0) as i64)
}
