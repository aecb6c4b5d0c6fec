//! Capability contracts implemented outside the core crate.

pub mod provider;

pub use provider::ModelProvider;
