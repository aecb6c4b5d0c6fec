//! # ExamPrep Core
//!
//! Shared building blocks for the ExamPrep workspace:
//! - **config**: TOML configuration with serde defaults
//! - **error**: the workspace-wide error enum and `Result` alias
//! - **types**: documents, chunks, questions, sessions, chat messages
//! - **traits**: the model provider capability contract

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::ExamPrepConfig;
pub use error::{ExamPrepError, Result};
pub use traits::ModelProvider;
