//! Groq configuration

use serde::{Deserialize, Serialize};
use std::env;
use tutor_core::{Error, Result};

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration for the Groq client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    pub api_key: String,
    pub api_url: String,
    pub model_id: String,
}

impl GroqConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GROQ_API_KEY").map_err(|_| {
            Error::Configuration("GROQ_API_KEY environment variable not found".to_string())
        })?;

        let api_url = env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model_id = env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            api_url,
            model_id,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model_id: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the API base URL (used by tests to point at a mock server)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the model
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}
