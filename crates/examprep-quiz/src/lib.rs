//! # ExamPrep Quiz
//!
//! Multiple-choice practice built on ingested chunks.
//!
//! ```text
//! chunks (by chunk_index) → bounded context → chat model
//!   → JSON (or fenced JSON) → per-item validation → SQLite
//!
//! start session → submit answers → attempted / correct / score
//! ```

pub mod context;
pub mod generator;
pub mod parse;
pub mod scoring;
pub mod session;

pub use generator::QuestionGenerator;
pub use parse::ResponseParser;
pub use scoring::{Answer, normalize_duration, parse_answers, score};
pub use session::SessionService;
