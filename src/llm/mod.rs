//! Optional LLM narrative composition.
//!
//! The newsletter is fully deterministic without this module; when an
//! Anthropic API key is configured, [`claude::ClaudeClient`] composes the
//! narrative section and the deterministic template remains the fallback on
//! any failure.

pub mod claude;

pub use claude::{ClaudeClient, LlmError};
