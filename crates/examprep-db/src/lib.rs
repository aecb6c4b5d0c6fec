//! # ExamPrep DB
//!
//! SQLite persistence for documents, chunks, access grants, questions and
//! study sessions. A single connection is shared behind a `Mutex`; callers
//! never hold it across an `.await`.

mod rows;
pub mod store;

pub use store::StudyDb;
