//! Groq chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use tutor_core::{Completion, CompletionConfig, Error, LlmClient, Result};

use crate::config::GroqConfig;

/// Client for Groq's OpenAI-compatible chat completions API
pub struct GroqClient {
    config: GroqConfig,
    client: Client,
    connected: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

impl GroqClient {
    /// Create a new Groq client from configuration
    pub fn new(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            connected: false,
        })
    }

    /// Create a new Groq client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GroqConfig::from_env()?;
        Self::new(config)
    }

    async fn perform_completion(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<Completion> {
        let request_body = ChatRequest {
            model: &config.model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stop: config.stop_sequences.clone(),
        };

        let url = format!("{}/chat/completions", self.config.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Llm(format!(
                "Groq API request failed with status {}: {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let text = chat
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Llm("Empty response from Groq API".to_string()));
        }

        Ok(Completion {
            text,
            model_id: config.model_id.clone(),
            tokens_used: chat.usage.map(|u| u.total_tokens),
        })
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn connect(&mut self) -> Result<()> {
        // Groq uses plain bearer auth, so validate the key by listing models.
        let url = format!("{}/models", self.config.api_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Configuration(format!(
                "Groq API key validation failed: {}",
                response.status()
            )));
        }

        self.connected = true;
        Ok(())
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let config = CompletionConfig {
            model_id: self.config.model_id.clone(),
            ..Default::default()
        };
        self.complete_with_config(prompt, &config).await
    }

    async fn complete_with_config(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<Completion> {
        let completion_future = self.perform_completion(prompt, config);

        match timeout(config.timeout, completion_future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("Groq request timed out".to_string())),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GroqClient {
        let config = GroqConfig::new("test-key").with_api_url(server.base_url());
        GroqClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_complete_parses_chat_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "The derivative of x^2 is 2x."}}
                ],
                "usage": {"total_tokens": 42}
            }));
        });

        let client = client_for(&server);
        let completion = client.complete("What is the derivative of x^2?").await.unwrap();

        mock.assert();
        assert_eq!(completion.text, "The derivative of x^2 is 2x.");
        assert_eq!(completion.tokens_used, Some(42));
    }

    #[tokio::test]
    async fn test_complete_maps_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        });

        let client = client_for(&server);
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_key() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/models");
            then.status(401);
        });

        let mut client = client_for(&server);
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_connect_accepts_valid_key() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/models");
            then.status(200).json_body(json!({"data": []}));
        });

        let mut client = client_for(&server);
        client.connect().await.unwrap();
    }
}
