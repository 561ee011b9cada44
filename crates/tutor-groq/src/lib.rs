//! Groq LLM integration for the academic tutor assistant
//!
//! This crate provides the Groq implementation of the LlmClient trait,
//! speaking the OpenAI-compatible chat completions API.

mod client;
mod config;

pub use client::GroqClient;
pub use config::GroqConfig;

// Re-export core types for convenience
pub use tutor_core::{Completion, CompletionConfig, Error, LlmClient, Result};
