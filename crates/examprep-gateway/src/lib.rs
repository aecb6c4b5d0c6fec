//! # ExamPrep Gateway
//!
//! HTTP API over the study pipelines: uploads, search, question generation
//! and practice sessions.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, build_router, start};
