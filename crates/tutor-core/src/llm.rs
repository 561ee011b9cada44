//! LLM client trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for a single completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub stop_sequences: Vec<String>,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model_id: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 1024,
            temperature: Some(0.2),
            stop_sequences: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for hosted LLM clients (e.g. Groq)
///
/// The tutor uses a single hosted model for answer generation, query
/// rewriting, and quiz generation; this trait is the seam that lets those
/// components be tested against a canned model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Authenticate / validate credentials with the provider
    async fn connect(&mut self) -> Result<()>;

    /// Complete a prompt using the client's default configuration
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Complete a prompt with an explicit configuration
    async fn complete_with_config(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<Completion>;

    /// The model ID this client generates with
    fn model_id(&self) -> &str;
}
